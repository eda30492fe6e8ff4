//! Caller identity.
//!
//! Authentication itself is an external collaborator: an upstream gateway
//! terminates sessions/tokens and forwards the authenticated account id in
//! the `x-user-id` header. This module is the seam that turns that header
//! into a typed extractor.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::errors::ServiceError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, extracted from the gateway-provided header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized("Missing authenticated user header".to_string())
            })?;

        let user_id = Uuid::parse_str(raw).map_err(|_| {
            ServiceError::Unauthorized("Malformed authenticated user header".to_string())
        })?;

        Ok(AuthenticatedUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    async fn extract(request: Request<Body>) -> Result<AuthenticatedUser, ServiceError> {
        let (mut parts, _) = request.into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_user_id_from_header() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header(USER_ID_HEADER, id.to_string())
            .body(Body::empty())
            .unwrap();

        let user = extract(request).await.unwrap();
        assert_eq!(user.user_id, id);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let request = Request::builder().body(Body::empty()).unwrap();
        let err = extract(request).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_header_is_unauthorized() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let err = extract(request).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
