//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use kasku_shared::AppError;

use crate::error::ApiError;

/// Header carrying the acting member, set by the upstream auth layer.
pub const MEMBER_HEADER: &str = "x-member-id";

/// The member performing the request, if the caller supplied one.
///
/// Recorded as the actor on activity rows. A missing header yields `None`;
/// a header that is not a UUID is rejected with 401.
///
/// ```ignore
/// async fn handler(actor: ActingMember) -> impl IntoResponse {
///     let actor_id = actor.id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActingMember(pub Option<Uuid>);

impl ActingMember {
    /// Returns the member id.
    #[must_use]
    pub const fn id(&self) -> Option<Uuid> {
        self.0
    }
}

impl<S> FromRequestParts<S> for ActingMember
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(MEMBER_HEADER) else {
            return Ok(Self(None));
        };

        value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(|id| Self(Some(id)))
            .ok_or_else(|| {
                AppError::Unauthorized(format!("{MEMBER_HEADER} must be a member UUID")).into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    async fn extract(header: Option<&str>) -> Result<ActingMember, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(MEMBER_HEADER, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        ActingMember::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        assert_eq!(extract(None).await.unwrap(), ActingMember(None));
    }

    #[tokio::test]
    async fn test_valid_header() {
        let id = Uuid::new_v4();
        let actor = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(actor.id(), Some(id));
    }

    #[tokio::test]
    async fn test_malformed_header_rejected() {
        let err = extract(Some("not-a-uuid")).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
