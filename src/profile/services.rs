use std::path::Path;

use bytes::Bytes;
use tracing::{info, warn};

use super::dto::{ProfileUser, UpdateProfileRequest, UpdatedProfile};
use crate::{
    auth::roles::role_name,
    error::{AppError, AppResult},
    state::AppState,
    users::{
        repo_types::ProfileChanges,
        validation::{check_email, check_name, check_phone, non_empty, normalize_email},
    },
};

pub const PHOTO_MAX_BYTES: usize = 5 * 1024 * 1024;

pub async fn load_profile(state: &AppState, user_id: i32) -> AppResult<ProfileUser> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(ProfileUser {
        user_id: user.user_id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        phone: user.phone,
        role_id: user.role_id,
        role_name: role_name(user.role_id).into(),
    })
}

pub async fn update_profile(
    state: &AppState,
    user_id: i32,
    req: UpdateProfileRequest,
) -> AppResult<UpdatedProfile> {
    let (Some(first_name), Some(last_name), Some(email)) = (
        non_empty(req.first_name.as_deref()),
        non_empty(req.last_name.as_deref()),
        non_empty(req.email.as_deref()),
    ) else {
        return Err(AppError::validation(
            "First name, last name and email are required",
        ));
    };
    let email = normalize_email(&email);
    let phone = non_empty(req.phone.as_deref());

    check_name("First name", &first_name)?;
    check_name("Last name", &last_name)?;
    check_email(&email)?;
    check_phone(phone.as_deref(), false)?;

    if state.users.email_in_use(&email, Some(user_id)).await? {
        warn!(user_id, email = %email, "profile update with email of another user");
        return Err(AppError::Conflict(
            "This email is already used by another user".into(),
        ));
    }

    let changes = ProfileChanges {
        first_name,
        last_name,
        email,
        phone,
    };
    if !state.users.update_profile(user_id, &changes).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    info!(user_id, "profile updated");
    Ok(UpdatedProfile {
        first_name: changes.first_name,
        last_name: changes.last_name,
        email: changes.email,
        phone: changes.phone,
    })
}

/// Extension for a stored photo, taken from the uploaded file name.
pub fn photo_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string())
}

/// Stores the caller's photo as `user_<id>.<ext>`, replacing any earlier one
/// with the same extension. Returns the public path.
pub async fn save_photo(
    state: &AppState,
    user_id: i32,
    file_name: Option<&str>,
    content_type: &str,
    body: Bytes,
) -> AppResult<String> {
    if !content_type.starts_with("image/") {
        return Err(AppError::validation("Only images are allowed"));
    }
    if body.is_empty() {
        return Err(AppError::validation("File not received"));
    }
    if body.len() > PHOTO_MAX_BYTES {
        return Err(AppError::validation("File is too large (max 5 MB)"));
    }

    let key = format!("user_{}.{}", user_id, photo_extension(file_name));
    state.storage.put_object(&key, body, content_type).await?;

    info!(user_id, key = %key, "photo stored");
    Ok(state.storage.public_url(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_file_name() {
        assert_eq!(photo_extension(Some("me.PNG")), "png");
        assert_eq!(photo_extension(Some("archive.tar.gz")), "gz");
        assert_eq!(photo_extension(Some("noext")), "jpg");
        assert_eq!(photo_extension(None), "jpg");
        assert_eq!(photo_extension(Some("x.p/ng")), "jpg");
        assert_eq!(photo_extension(Some("evil.ph p")), "jpg");
    }

    #[tokio::test]
    async fn save_photo_rules() {
        let state = AppState::fake();
        let err = save_photo(&state, 1, Some("a.txt"), "text/plain", Bytes::from_static(b"hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let big = Bytes::from(vec![0u8; PHOTO_MAX_BYTES + 1]);
        let err = save_photo(&state, 1, Some("a.png"), "image/png", big).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let jpeg = Bytes::from_static(b"\xff\xd8");
        let path = save_photo(&state, 7, Some("Me.JPEG"), "image/jpeg", jpeg)
            .await
            .unwrap();
        assert_eq!(path, "/assets/uploads/user_7.jpeg");
    }
}
