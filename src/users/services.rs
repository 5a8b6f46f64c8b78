use tracing::{info, warn};

use super::{
    dto::{CreateUserRequest, RoleItem, UpdateUserRequest, UserItem},
    repo::UserStore,
    repo_types::{NewUser, UserChanges},
    validation::{
        check_email, check_name, check_password, check_phone, check_role_id, non_empty,
        normalize_email,
    },
};
use crate::{
    auth::password::hash_password_async,
    error::{AppError, AppResult},
};

const REQUIRED: &str = "Fill in all required fields";

pub fn parse_user_id(raw: &str) -> AppResult<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::validation("Invalid user ID"))
}

pub async fn list_users(store: &dyn UserStore) -> AppResult<Vec<UserItem>> {
    let rows = store.list_with_roles().await?;
    Ok(rows.into_iter().map(UserItem::from).collect())
}

pub async fn list_roles(store: &dyn UserStore) -> AppResult<Vec<RoleItem>> {
    let rows = store.list_roles().await?;
    Ok(rows.into_iter().map(RoleItem::from).collect())
}

pub async fn create_user(store: &dyn UserStore, req: CreateUserRequest) -> AppResult<i32> {
    let (
        Some(first_name),
        Some(last_name),
        Some(email),
        Some(phone),
        Some(password),
        Some(role_id),
    ) = (
        non_empty(req.first_name.as_deref()),
        non_empty(req.last_name.as_deref()),
        non_empty(req.email.as_deref()),
        non_empty(req.phone.as_deref()),
        req.password.filter(|p| !p.is_empty()),
        req.role_id,
    )
    else {
        return Err(AppError::validation(REQUIRED));
    };

    let email = normalize_email(&email);
    check_name("First name", &first_name)?;
    check_name("Last name", &last_name)?;
    check_email(&email)?;
    check_phone(Some(&phone), true)?;
    check_password(&password)?;
    let role = check_role_id(role_id)?;

    if store.email_in_use(&email, None).await? {
        warn!(email = %email, "create with taken email");
        return Err(AppError::Conflict(
            "A user with this email already exists".into(),
        ));
    }

    let password_hash = hash_password_async(password).await?;
    let user_id = store
        .insert(&NewUser {
            first_name,
            last_name,
            email,
            phone: Some(phone),
            password_hash,
            role_id: role.id(),
        })
        .await?;

    info!(user_id, role_id = role.id(), "user created");
    Ok(user_id)
}

/// Applies an admin edit. A supplied password replaces the hash; an absent
/// one leaves it untouched and is never validated.
pub async fn update_user(
    store: &dyn UserStore,
    user_id: i32,
    req: UpdateUserRequest,
) -> AppResult<()> {
    let (Some(first_name), Some(last_name), Some(email), Some(role_id)) = (
        non_empty(req.first_name.as_deref()),
        non_empty(req.last_name.as_deref()),
        non_empty(req.email.as_deref()),
        req.role_id,
    ) else {
        return Err(AppError::validation(REQUIRED));
    };
    let phone = non_empty(req.phone.as_deref());
    let password = req.password.filter(|p| !p.is_empty());

    let email = normalize_email(&email);
    check_name("First name", &first_name)?;
    check_name("Last name", &last_name)?;
    check_email(&email)?;
    check_phone(phone.as_deref(), false)?;
    if let Some(p) = &password {
        check_password(p)?;
    }
    let role = check_role_id(role_id)?;

    if store.find_by_id(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }
    if store.email_in_use(&email, Some(user_id)).await? {
        warn!(user_id, email = %email, "update with email of another user");
        return Err(AppError::Conflict(
            "Email is already used by another user".into(),
        ));
    }

    let password_hash = match password {
        Some(p) => Some(hash_password_async(p).await?),
        None => None,
    };

    let changes = UserChanges {
        first_name,
        last_name,
        email,
        phone,
        role_id: role.id(),
        password_hash,
    };
    if !store.update(user_id, &changes).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    info!(
        user_id,
        role_id = role.id(),
        password_changed = changes.password_hash.is_some(),
        "user updated"
    );
    Ok(())
}

// No guard against removing the caller or the last administrator.
pub async fn delete_user(store: &dyn UserStore, user_id: i32) -> AppResult<()> {
    if !store.delete(user_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(user_id, "user deleted");
    Ok(())
}
