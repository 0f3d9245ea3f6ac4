use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

/// Log every request as `METHOD path` before dispatch, then its outcome.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    tracing::info!("{} {}", method, path);

    let started = Instant::now();
    let response = next.run(req).await;
    tracing::debug!(
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "{} {} completed",
        method,
        path
    );
    response
}
