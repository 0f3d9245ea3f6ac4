use crate::{CloudProvider, InstanceHandle, ProviderResult};
use async_trait::async_trait;
use gceproxy_common::{InstanceSpec, InstanceView, ProviderError, COMPUTE_API_URL};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
// Refresh a cached token this long before the provider says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a Google service-account JSON key the proxy needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> ProviderResult<Self> {
        let key: ServiceAccountKey = serde_json::from_str(raw)
            .map_err(|e| ProviderError::Credentials(format!("malformed service account key: {}", e)))?;
        if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
            return Err(ProviderError::Credentials(
                "service account key is missing client_email or private_key".to_string(),
            ));
        }
        Ok(key)
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct Operation {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Deserialize)]
struct OperationError {
    #[serde(default)]
    errors: Vec<OperationErrorItem>,
}

#[derive(Deserialize)]
struct OperationErrorItem {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Compute Engine v1 REST backend authenticated with a service-account key.
pub struct GceProvider {
    client: Client,
    project_id: String,
    key: ServiceAccountKey,
    api_base: String,
    token: Mutex<Option<CachedToken>>,
}

impl GceProvider {
    pub fn new(project_id: String, key: ServiceAccountKey) -> ProviderResult<Self> {
        // No overall timeout by default in reqwest; a stalled API call would pin the request forever.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            project_id: project_id.trim().to_string(),
            key,
            api_base: COMPUTE_API_URL.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    pub fn from_key_file(project_id: String, path: impl AsRef<Path>) -> ProviderResult<Self> {
        Self::new(project_id, ServiceAccountKey::from_file(path)?)
    }

    /// Point the backend at another API root (emulators, regional endpoints).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn instances_url(&self, zone: &str) -> String {
        format!(
            "{}/{}/zones/{}/instances",
            self.api_base, self.project_id, zone
        )
    }

    async fn access_token(&self) -> ProviderResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.sign_assertion()?;
        let resp = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "[GCE API] token exchange rejected");
            return Err(ProviderError::Authentication(format!(
                "token exchange failed: status={} body={}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("token response: {}", e)))?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS));
        tracing::debug!(expires_in = lifetime.as_secs(), "[GCE API] access token refreshed");

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        });
        Ok(value)
    }

    fn sign_assertion(&self) -> ProviderResult<String> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ProviderError::Credentials(format!("system clock before epoch: {}", e)))?
            .as_secs();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| ProviderError::Credentials(format!("invalid private key: {}", e)))?;
        jsonwebtoken::encode(&header, &claims, &encoding_key)
            .map_err(|e| ProviderError::Credentials(format!("cannot sign assertion: {}", e)))
    }
}

/// Map a non-success Compute API response to the provider error taxonomy.
///
/// Only a lookup of an existing instance passes `instance`; a 404 on insert means
/// the project, zone, image or disk type is missing and stays an API error.
fn error_from_response(status: StatusCode, body: &str, instance: Option<&str>) -> ProviderError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| body.trim().to_string());
    match (status, instance) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
            ProviderError::Authentication(message)
        }
        (StatusCode::NOT_FOUND, Some(name)) => ProviderError::NotFound(name.to_string()),
        _ => ProviderError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// An insert can be accepted at the HTTP level yet carry an error block on its operation.
fn operation_failure(op: &Operation, status: StatusCode) -> Option<ProviderError> {
    let error = op.error.as_ref()?;
    let message = error
        .errors
        .iter()
        .map(|e| {
            format!(
                "{}: {}",
                e.code.as_deref().unwrap_or("UNKNOWN"),
                e.message.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    Some(ProviderError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CloudProvider for GceProvider {
    fn code(&self) -> &'static str {
        "gce"
    }

    async fn create_instance(&self, spec: &InstanceSpec) -> ProviderResult<InstanceHandle> {
        let url = self.instances_url(&spec.zone);
        let token = self.access_token().await?;

        tracing::info!(
            instance = %spec.name,
            zone = %spec.zone,
            machine_type = %spec.machine_type,
            "[GCE API] POST instances.insert"
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(spec)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::error!(
                instance = %spec.name,
                status = status.as_u16(),
                "[GCE API] instances.insert failed"
            );
            return Err(error_from_response(status, &text, None));
        }

        let op: Operation = resp
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("insert operation: {}", e)))?;
        if let Some(err) = operation_failure(&op, status) {
            tracing::error!(instance = %spec.name, error = %err, "[GCE API] insert operation reported an error");
            return Err(err);
        }

        tracing::info!(
            instance = %spec.name,
            operation = op.name.as_deref().unwrap_or("-"),
            "[GCE API] insert accepted"
        );
        Ok(InstanceHandle {
            name: spec.name.clone(),
            zone: spec.zone.clone(),
            operation: op.name,
        })
    }

    async fn get_instance(&self, zone: &str, name: &str) -> ProviderResult<InstanceView> {
        let url = format!("{}/{}", self.instances_url(zone), name);
        let token = self.access_token().await?;

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(error_from_response(status, &text, Some(name)));
        }

        resp.json::<InstanceView>()
            .await
            .map_err(|e| ProviderError::Decode(format!("instance {}: {}", name, e)))
    }
}
