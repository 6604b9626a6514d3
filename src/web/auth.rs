use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::{Config, Permission};
use crate::tracker::{FixSlot, TrackerStatus};

#[derive(Clone)]
pub struct AuthenticatedUser {
    pub name: String,
    pub permissions: HashSet<Permission>,
}

impl AuthenticatedUser {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Producer side of the fix handoff; the control loop takes from it
    pub slot: FixSlot,
    /// Refreshed by the control loop after every tick
    pub status: Arc<RwLock<TrackerStatus>>,
}

/// Why a request carried no usable API key. Always answered with 401.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingAuth,
    #[error("expected `Authorization: Bearer <key>`")]
    InvalidFormat,
    #[error("unknown API key")]
    InvalidKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("key `{key}` may not {permission:?}")]
pub struct PermissionError {
    pub key: String,
    pub permission: Permission,
}

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .ok_or(AuthError::MissingAuth)?
            .to_str()
            .map_err(|_| AuthError::InvalidFormat)?;

        let key = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidFormat)?;

        let api_key = state
            .config
            .find_api_key(key)
            .ok_or(AuthError::InvalidKey)?;

        Ok(AuthenticatedUser {
            name: api_key.name.clone(),
            permissions: api_key.permissions.clone(),
        })
    }
}

pub fn require_permission(
    user: &AuthenticatedUser,
    permission: Permission,
) -> Result<(), PermissionError> {
    if user.has_permission(permission) {
        return Ok(());
    }
    let err = PermissionError {
        key: user.name.clone(),
        permission,
    };
    log::warn!("Rejected request: {}", err);
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(permissions: &[Permission]) -> AuthenticatedUser {
        AuthenticatedUser {
            name: "ground".to_string(),
            permissions: permissions.iter().copied().collect(),
        }
    }

    #[test]
    fn permission_is_checked_per_key() {
        let uplink = user(&[Permission::IngestFix]);
        assert!(require_permission(&uplink, Permission::IngestFix).is_ok());
        assert_eq!(
            require_permission(&uplink, Permission::ReadStatus),
            Err(PermissionError {
                key: "ground".to_string(),
                permission: Permission::ReadStatus,
            })
        );
        assert!(require_permission(&user(&[]), Permission::IngestFix).is_err());
    }

    #[test]
    fn rejections_map_to_status_codes() {
        let forbidden = require_permission(&user(&[]), Permission::ReadStatus).unwrap_err();
        assert_eq!(forbidden.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::InvalidKey.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
