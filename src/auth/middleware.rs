//! Request authentication and the per-resource role gate.

use axum::{
    extract::{FromRef, OriginalUri, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use super::{
    extractors::Identity,
    jwt::{bearer_token, JwtKeys},
    roles::{role_name, Resource},
};
use crate::{error::AppError, state::AppState};

/// Page requests get an HTML error page, everything else JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Page,
    Api,
}

impl ResponseFormat {
    pub fn for_path(path: &str) -> Self {
        if path.ends_with(".html") {
            ResponseFormat::Page
        } else {
            ResponseFormat::Api
        }
    }

    fn for_request(req: &Request) -> Self {
        let path = req
            .extensions()
            .get::<OriginalUri>()
            .map(|u| u.0.path())
            .unwrap_or_else(|| req.uri().path());
        Self::for_path(path)
    }
}

#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("Token missing")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("User not found")]
    UnknownUser,
    #[error("Insufficient permissions. Your role: {role_name}")]
    Forbidden { role_name: &'static str },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AuthFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthFailure::MissingToken => StatusCode::UNAUTHORIZED,
            AuthFailure::InvalidToken
            | AuthFailure::UnknownUser
            | AuthFailure::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthFailure::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response_for(self, format: ResponseFormat) -> Response {
        match format {
            ResponseFormat::Api => AppError::from(self).into_response(),
            ResponseFormat::Page => {
                if let AuthFailure::Store(e) = &self {
                    error!(error = ?e, "authentication lookup failed");
                }
                (self.status(), Html(self.page())).into_response()
            }
        }
    }

    fn page(&self) -> String {
        let (title, heading, text, href, link) = match self {
            AuthFailure::MissingToken => (
                "Authorization error",
                "Token missing".to_string(),
                "You need to sign in to access this page.".to_string(),
                "/login.html",
                "Go to sign in",
            ),
            AuthFailure::InvalidToken => (
                "Authorization error",
                "Invalid token".to_string(),
                "The token is invalid or expired. Please sign in again.".to_string(),
                "/login.html",
                "Sign in",
            ),
            AuthFailure::UnknownUser => (
                "Authorization error",
                "User not found".to_string(),
                "Your account no longer exists. Please sign in again.".to_string(),
                "/login.html",
                "Sign in",
            ),
            AuthFailure::Forbidden { role_name } => (
                "Access denied",
                "Insufficient permissions".to_string(),
                format!("Your role: {role_name}"),
                "/index.html",
                "Back to home",
            ),
            AuthFailure::Store(_) => (
                "Server error",
                "Server error".to_string(),
                "Please try again later.".to_string(),
                "/index.html",
                "Back to home",
            ),
        };
        format!(
            r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>{title}</title></head>
<body style="font-family:Arial,sans-serif;padding:30px">
  <h1>{heading}</h1>
  <p>{text}</p>
  <a href="{href}">{link}</a>
</body></html>
"#
        )
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::MissingToken => AppError::Unauthenticated("Token missing".into()),
            AuthFailure::Store(e) => AppError::Internal(e),
            other => AppError::Forbidden(other.to_string()),
        }
    }
}

/// Verifies the bearer token, loads the caller's current row and attaches
/// an [`Identity`] to the request.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let format = ResponseFormat::for_request(&req);
    match identify(&state, req.headers()).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(failure) => failure.into_response_for(format),
    }
}

async fn identify(state: &AppState, headers: &HeaderMap) -> Result<Identity, AuthFailure> {
    let token = bearer_token(headers).map_err(|_| AuthFailure::MissingToken)?;

    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "rejected token");
        AuthFailure::InvalidToken
    })?;

    let user = state.users.find_by_id(claims.sub).await?.ok_or_else(|| {
        warn!(user_id = claims.sub, "token for unknown user");
        AuthFailure::UnknownUser
    })?;

    Ok(Identity {
        user_id: user.user_id,
        role_id: user.role_id,
        first_name: user.first_name,
    })
}

/// Role gate. Layer it inside [`authenticate`] with
/// `middleware::from_fn_with_state(resource, require_role)`.
pub async fn require_role(State(resource): State<Resource>, req: Request, next: Next) -> Response {
    let format = ResponseFormat::for_request(&req);
    let caller = req
        .extensions()
        .get::<Identity>()
        .map(|i| (i.user_id, i.role_id));

    let Some((user_id, role_id)) = caller else {
        return AuthFailure::MissingToken.into_response_for(format);
    };

    if !resource.allows(role_id) {
        warn!(user_id, role_id, page = resource.page(), "access denied");
        return AuthFailure::Forbidden {
            role_name: role_name(role_id),
        }
        .into_response_for(format);
    }

    next.run(req).await
}
