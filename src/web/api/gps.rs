use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use crate::config::Permission;
use crate::telemetry::GpsRecord;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AppState, AuthenticatedUser};

#[utoipa::path(
    post,
    path = "/api/gps",
    request_body = GpsRecord,
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 202, description = "Fix queued for the next control tick"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "gps"
)]
pub async fn ingest(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(record): Json<GpsRecord>,
) -> ApiResult<StatusCode> {
    require_permission(&user, Permission::IngestFix)?;
    state.slot.publish(record.into());
    Ok(StatusCode::ACCEPTED)
}

#[utoipa::path(
    post,
    path = "/api/gps/raw",
    request_body(
        content = Vec<u8>,
        description = "15-byte big-endian GPS payload",
        content_type = "application/octet-stream"
    ),
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 202, description = "Fix queued for the next control tick"),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "gps"
)]
pub async fn ingest_raw(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Bytes,
) -> ApiResult<StatusCode> {
    require_permission(&user, Permission::IngestFix)?;
    let record = GpsRecord::from_be_bytes(&body)?;
    state.slot.publish(record.into());
    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, TrackerConfig};
    use crate::tracker::{AatTracker, LogDisplay, Millis, NoopActuator};
    use axum::response::IntoResponse;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn state() -> AppState {
        let tracker = AatTracker::new(
            &TrackerConfig::default(),
            Box::new(NoopActuator),
            Box::new(LogDisplay),
            Millis(0),
        );
        AppState {
            config: Arc::new(Config::from_str("{}").unwrap()),
            slot: crate::tracker::FixSlot::new(),
            status: Arc::new(RwLock::new(tracker.status(Millis(0)))),
        }
    }

    fn uplink(permissions: &[Permission]) -> AuthenticatedUser {
        AuthenticatedUser {
            name: "uplink".to_string(),
            permissions: permissions.iter().copied().collect(),
        }
    }

    fn payload(satellites: u8) -> Bytes {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&473_977_420i32.to_be_bytes());
        bytes.extend_from_slice(&85_455_940i32.to_be_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(&1100u16.to_be_bytes());
        bytes.push(satellites);
        Bytes::from(bytes)
    }

    #[tokio::test]
    async fn raw_payload_is_queued() {
        let state = state();
        let status = ingest_raw(State(state.clone()), uplink(&[Permission::IngestFix]), payload(9))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);

        let fix = state.slot.take().unwrap();
        assert_eq!(fix.satellites, 9);
        assert_eq!(fix.position.altitude_m, 100);
    }

    #[tokio::test]
    async fn wrong_length_payload_is_rejected() {
        let state = state();
        let body = Bytes::from_static(&[0u8; 14]);
        let err = ingest_raw(State(state.clone()), uplink(&[Permission::IngestFix]), body)
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert!(state.slot.take().is_none());
    }

    #[tokio::test]
    async fn ingest_needs_permission() {
        let state = state();
        let err = ingest_raw(State(state.clone()), uplink(&[Permission::ReadStatus]), payload(9))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

        let record = GpsRecord::from_be_bytes(&payload(9)).unwrap();
        let err = ingest(State(state.clone()), uplink(&[]), Json(record))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
        assert!(state.slot.take().is_none());
    }
}
