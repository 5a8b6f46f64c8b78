use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Authenticated caller, attached to the request by
/// [`authenticate`](super::middleware::authenticate).
///
/// `role_id` is read from the store on every request, never from the token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i32,
    pub role_id: i32,
    pub first_name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("Token missing".into()))
    }
}
