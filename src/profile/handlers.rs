use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{PhotoResponse, ProfileResponse, UpdateProfileRequest, UpdatedProfileResponse},
    services::{self, PHOTO_MAX_BYTES},
};
use crate::{
    auth::{extractors::Identity, middleware::authenticate},
    error::{AppError, AppResult},
    state::AppState,
};

/// Self-service routes: any authenticated role.
pub fn profile_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/user/update", put(update_me))
        .route(
            "/user/photo",
            // room for the multipart envelope around a full-size photo
            post(upload_photo).layer(DefaultBodyLimit::max(PHOTO_MAX_BYTES + 64 * 1024)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    identity: Identity,
) -> AppResult<Json<ProfileResponse>> {
    let user = services::load_profile(&state, identity.user_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<UpdatedProfileResponse>> {
    let Json(payload) = payload?;
    let user = services::update_profile(&state, identity.user_id, payload).await?;
    Ok(Json(UpdatedProfileResponse {
        success: true,
        message: "Profile updated".into(),
        user,
    }))
}

/// POST /user/photo (multipart, field `photo`)
#[instrument(skip(state, multipart))]
pub async fn upload_photo(
    State(state): State<AppState>,
    identity: Identity,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<PhotoResponse>> {
    let mut multipart =
        multipart.map_err(|e| AppError::validation(format!("Invalid upload: {}", e.body_text())))?;

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("photo") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(upload_error)?;

        let photo_path = services::save_photo(
            &state,
            identity.user_id,
            file_name.as_deref(),
            &content_type,
            data,
        )
        .await?;
        return Ok(Json(PhotoResponse {
            success: true,
            photo_path,
        }));
    }

    Err(AppError::validation("File not received"))
}

fn upload_error(e: MultipartError) -> AppError {
    AppError::validation(format!("Invalid upload: {}", e.body_text()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::auth::roles::Role;
    use crate::test_support::{read, send, TestApp};
    use crate::users::memory::MemoryUserStore;

    fn buyer_app() -> (TestApp, i32, String) {
        let store = Arc::new(MemoryUserStore::new());
        let id = store.seed("Mykola", "mykola@example.com", "secret1", Role::Buyer);
        store.seed("Other", "other@example.com", "secret1", Role::Buyer);
        let app = TestApp::with_store(store);
        let token = app.token_for(id);
        (app, id, token)
    }

    #[tokio::test]
    async fn me_returns_current_profile() {
        let (app, id, token) = buyer_app();
        let (status, body) = send(&app.router, "GET", "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["userId"], id);
        assert_eq!(body["user"]["firstName"], "Mykola");
        assert_eq!(body["user"]["roleId"], 1);
        assert!(body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn update_profile_changes_own_row_only() {
        let (app, id, token) = buyer_app();
        let (status, body) = send(
            &app.router,
            "PUT",
            "/api/user/update",
            Some(&token),
            Some(json!({
                "firstName": "Mykola", "lastName": "Lysenko",
                "email": "Composer@Example.com", "phone": "0931234567"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["user"]["email"], "composer@example.com");

        let user = app.store.get(id).unwrap();
        assert_eq!(user.last_name, "Lysenko");
        assert_eq!(user.phone.as_deref(), Some("0931234567"));
        assert_eq!(user.role_id, Role::Buyer.id());
    }

    #[tokio::test]
    async fn update_profile_rejects_taken_email() {
        let (app, _, token) = buyer_app();
        let (status, body) = send(
            &app.router,
            "PUT",
            "/api/user/update",
            Some(&token),
            Some(json!({
                "firstName": "Mykola",
                "lastName": "Lysenko",
                "email": "OTHER@example.com"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn upload_photo_multipart() {
        let (app, id, token) = buyer_app();
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"photo\"; filename=\"face.PNG\"\r\n\
             Content-Type: image/png\r\n\r\n\
             PNGDATA\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/user/photo")
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        let (status, body) = read(app.router.clone().oneshot(req).await.unwrap()).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["photoPath"], format!("/assets/uploads/user_{id}.png"));
    }

    #[tokio::test]
    async fn upload_rejects_non_image() {
        let (app, _, token) = buyer_app();
        let boundary = "B";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"photo\"; filename=\"notes.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             hello\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/user/photo")
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        let (status, body) = read(app.router.clone().oneshot(req).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Only images are allowed");
    }

    #[tokio::test]
    async fn upload_without_multipart_body_is_json_400() {
        let (app, _, token) = buyer_app();
        let req = Request::builder()
            .method("POST")
            .uri("/api/user/photo")
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = read(app.router.clone().oneshot(req).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid upload"));
    }
}
