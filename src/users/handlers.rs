use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateUserRequest, CreatedUserResponse, RolesResponse, UpdateUserRequest, UsersResponse},
    services,
};
use crate::{
    auth::{
        extractors::Identity,
        middleware::{authenticate, require_role},
        roles::Resource,
    },
    error::AppResult,
    response::MessageResponse,
    state::AppState,
};

/// Admin-only user management, gated like the admin page.
pub fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(Resource::AdminPanel, require_role))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
}

#[instrument(skip(state))]
pub async fn list_roles(State(state): State<AppState>) -> AppResult<Json<RolesResponse>> {
    let roles = services::list_roles(state.users.as_ref()).await?;
    Ok(Json(RolesResponse {
        success: true,
        roles,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UsersResponse>> {
    let users = services::list_users(state.users.as_ref()).await?;
    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}

#[instrument(skip(state, payload), fields(actor = admin.user_id))]
pub async fn create_user(
    State(state): State<AppState>,
    admin: Identity,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AppResult<Json<CreatedUserResponse>> {
    let Json(payload) = payload?;
    let user_id = services::create_user(state.users.as_ref(), payload).await?;
    Ok(Json(CreatedUserResponse {
        success: true,
        message: "User added".into(),
        user_id,
    }))
}

#[instrument(skip(state, payload), fields(actor = admin.user_id))]
pub async fn update_user(
    State(state): State<AppState>,
    admin: Identity,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = services::parse_user_id(&id)?;
    let Json(payload) = payload?;
    services::update_user(state.users.as_ref(), user_id, payload).await?;
    Ok(MessageResponse::ok("User updated"))
}

#[instrument(skip(state), fields(actor = admin.user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: Identity,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = services::parse_user_id(&id)?;
    services::delete_user(state.users.as_ref(), user_id).await?;
    Ok(MessageResponse::ok("User deleted"))
}
