use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::api::rest::error::ApiError;
use crate::contract::model::Principal;
use crate::domain::accounts::AccountService;

/// Extract the acting principal from the `Authorization: Bearer <token>`
/// header. The token is resolved against live session state on every
/// request; handlers receive the principal as an explicit value.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accounts = parts
            .extensions
            .get::<Arc<AccountService>>()
            .cloned()
            .ok_or_else(ApiError::internal)?;

        let token = bearer_token(parts).ok_or_else(|| {
            ApiError::unauthorized("Authentication credentials were not provided")
        })?;

        accounts
            .principal_for_token(token)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))
    }
}

fn bearer_token(parts: &Parts) -> Option<Uuid> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/reservations");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn parses_well_formed_bearer_token() {
        let token = Uuid::new_v4();
        let parts = parts_with_auth(Some(&format!("Bearer {}", token)));
        assert_eq!(bearer_token(&parts), Some(token));
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Token abc"))), None);
        assert_eq!(
            bearer_token(&parts_with_auth(Some("Bearer not-a-uuid"))),
            None
        );
    }
}
