use axum::extract::FromRef;
use tracing::{info, warn};

use super::{
    dto::{LoginRequest, LoginResponse, RegisterRequest, SessionUser},
    jwt::JwtKeys,
    password::{hash_password_async, verify_password},
    roles::{role_name, Role},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{
        repo_types::NewUser,
        validation::{
            check_email, check_name, check_password, check_phone, non_empty, normalize_email,
        },
    },
};

const BAD_CREDENTIALS: &str = "Invalid email or password";

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<LoginResponse> {
    let (Some(email), Some(password)) = (non_empty(payload.email.as_deref()), payload.password)
    else {
        return Err(AppError::validation("Email and password are required"));
    };
    if password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }
    let email = normalize_email(&email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthenticated(BAD_CREDENTIALS.into()));
    };

    if !verify_password(&password, &user.password) {
        warn!(user_id = user.user_id, "login invalid password");
        return Err(AppError::Unauthenticated(BAD_CREDENTIALS.into()));
    }

    let token = JwtKeys::from_ref(state).sign(user.user_id)?;

    info!(user_id = user.user_id, "user logged in");
    Ok(LoginResponse {
        success: true,
        message: "Signed in".into(),
        token,
        user: SessionUser {
            user_id: user.user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role_id: user.role_id,
            role_name: role_name(user.role_id).into(),
        },
    })
}

pub async fn register(state: &AppState, payload: RegisterRequest) -> AppResult<i32> {
    let first_name = non_empty(payload.first_name.as_deref());
    let last_name = non_empty(payload.last_name.as_deref());
    let email = non_empty(payload.email.as_deref());
    let password = payload.password.filter(|p| !p.is_empty());
    let confirm = payload.confirm_password.filter(|p| !p.is_empty());

    let (Some(first_name), Some(last_name), Some(email), Some(password), Some(confirm)) =
        (first_name, last_name, email, password, confirm)
    else {
        return Err(AppError::validation("Fill in all required fields"));
    };
    if password != confirm {
        return Err(AppError::validation("Passwords do not match"));
    }

    let email = normalize_email(&email);
    let phone = non_empty(payload.phone.as_deref());
    check_name("First name", &first_name)?;
    check_name("Last name", &last_name)?;
    check_email(&email)?;
    check_phone(phone.as_deref(), false)?;
    check_password(&password)?;

    if state.users.email_in_use(&email, None).await? {
        warn!(email = %email, "registration with taken email");
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let password_hash = hash_password_async(password).await?;
    let user_id = state
        .users
        .insert(&NewUser {
            first_name,
            last_name,
            email,
            phone,
            password_hash,
            role_id: Role::Buyer.id(),
        })
        .await?;

    info!(user_id, "user registered");
    Ok(user_id)
}
