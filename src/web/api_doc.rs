use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use super::api::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::gps::ingest,
        super::api::gps::ingest_raw,
        super::api::tracker::mode,
        super::api::tracker::status,
    ),
    components(
        schemas(
            ErrorResponse,
            crate::telemetry::GpsRecord,
            crate::tracker::TrackerMode,
            crate::tracker::TrackerStatus,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "AAT Tracker API",
        description = "GPS fix ingest and antenna tracker status",
        version = "0.1.0"
    ),
    tags(
        (name = "gps", description = "Target telemetry ingest"),
        (name = "tracker", description = "Tracking state")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
