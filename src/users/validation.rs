//! Field rules for user records. The browser console repeats them for
//! quick feedback; these are the ones that count.

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::roles::Role;
use crate::error::AppError;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-zА-Яа-яЁёЇїІіЄєҐґ'-]{2,}$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^(?:[0-9]{10}|\+[0-9]{12})$").unwrap();
}

pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 12;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn is_valid_password(password: &str) -> bool {
    (PASSWORD_MIN..=PASSWORD_MAX).contains(&password.chars().count())
}

pub fn check_name(label: &str, name: &str) -> Result<(), AppError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "{label} must contain only letters and be at least 2 characters"
        )))
    }
}

pub fn check_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::validation("Invalid email"))
    }
}

/// `required` controls whether an absent phone is an error.
pub fn check_phone(phone: Option<&str>, required: bool) -> Result<(), AppError> {
    match phone {
        None if required => Err(AppError::validation("Phone is required")),
        None => Ok(()),
        Some(p) if is_valid_phone(p) => Ok(()),
        Some(_) => Err(AppError::validation(
            "Phone must be 10 digits or '+' followed by 12 digits",
        )),
    }
}

pub fn check_password(password: &str) -> Result<(), AppError> {
    if is_valid_password(password) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Password must be {PASSWORD_MIN}-{PASSWORD_MAX} characters"
        )))
    }
}

pub fn check_role_id(role_id: i32) -> Result<Role, AppError> {
    Role::from_id(role_id).ok_or_else(|| AppError::validation("Select a valid role"))
}

/// Trims a free-text field, mapping empty input to `None`.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
