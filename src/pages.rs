//! HTML pages. Public ones are served as-is, the role panels sit behind
//! `authenticate` and their own `require_role` gate.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{error, warn};

use crate::{
    auth::{
        middleware::{authenticate, require_role},
        roles::Resource,
    },
    state::AppState,
};

const PUBLIC_PAGES: [(&str, &str); 4] = [
    ("/", "index.html"),
    ("/index.html", "index.html"),
    ("/login.html", "login.html"),
    ("/register.html", "register.html"),
];

pub fn router(state: &AppState) -> Router<AppState> {
    let mut public = Router::new();
    for (path, file) in PUBLIC_PAGES {
        public = public.route(path, get(move |State(state): State<AppState>| page(state, file)));
    }

    let mut gated = Router::new();
    for resource in Resource::ALL {
        let file = resource.page().trim_start_matches('/');
        gated = gated.merge(
            Router::new()
                .route(
                    resource.page(),
                    get(move |State(state): State<AppState>| page(state, file)),
                )
                .route_layer(middleware::from_fn_with_state(resource, require_role)),
        );
    }
    let gated = gated.route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    public.merge(gated)
}

async fn page(state: AppState, file: &'static str) -> Response {
    let path = state.config.paths.pages_dir.join(file);
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Html(body).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "page file missing");
            (StatusCode::NOT_FOUND, Html(not_found_page())).into_response()
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "page read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(not_found_page())).into_response()
        }
    }
}

fn not_found_page() -> &'static str {
    r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Not found</title></head>
<body style="font-family:Arial,sans-serif;padding:30px">
  <h1>Page not found</h1>
  <a href="/index.html">Back to home</a>
</body></html>
"#
}
