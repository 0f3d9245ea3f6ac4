use crate::handlers::instances;
use crate::routes::public;
use gceproxy_common::{ErrorResponse, InstanceNameRequest, ProvisionRequest, PublicIp};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        public::healthcheck,
        instances::create_instance,
        instances::instance_ip
    ),
    components(
        schemas(ProvisionRequest, InstanceNameRequest, PublicIp, ErrorResponse)
    ),
    tags(
        (name = "gceproxy", description = "Compute Engine provisioning proxy")
    )
)]
pub struct ApiDoc;
