use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewUser, ProfileChanges, RoleRow, User, UserChanges, UserWithRole};

/// Persistence seam for users and roles.
///
/// Emails are compared lowercased. Uniqueness is a pre-check done by the
/// caller through [`UserStore::email_in_use`]; the store itself does not
/// enforce it.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: i32) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// True when some user other than `except` already owns `email`.
    async fn email_in_use(&self, email: &str, except: Option<i32>) -> anyhow::Result<bool>;
    async fn list_with_roles(&self) -> anyhow::Result<Vec<UserWithRole>>;
    async fn list_roles(&self) -> anyhow::Result<Vec<RoleRow>>;
    async fn insert(&self, user: &NewUser) -> anyhow::Result<i32>;
    /// Returns false when no row has this id.
    async fn update(&self, user_id: i32, changes: &UserChanges) -> anyhow::Result<bool>;
    async fn update_profile(&self, user_id: i32, changes: &ProfileChanges) -> anyhow::Result<bool>;
    async fn delete(&self, user_id: i32) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, user_id: i32) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, first_name, last_name, email, phone, password, role_id
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, first_name, last_name, email, phone, password, role_id
            FROM users
            WHERE LOWER(email) = LOWER($1)
            ORDER BY user_id
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn email_in_use(&self, email: &str, except: Option<i32>) -> anyhow::Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT user_id
              FROM users
             WHERE LOWER(email) = LOWER($1)
               AND ($2::INT IS NULL OR user_id <> $2)
             LIMIT 1
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_optional(&self.db)
        .await
        .context("check email in use")?;
        Ok(row.is_some())
    }

    async fn list_with_roles(&self) -> anyhow::Result<Vec<UserWithRole>> {
        let rows = sqlx::query_as::<_, UserWithRole>(
            r#"
            SELECT u.user_id, u.first_name, u.last_name, u.email, u.phone, u.role_id, r.role_name
              FROM users u
              JOIN roles r ON u.role_id = r.role_id
             ORDER BY u.user_id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }

    async fn list_roles(&self) -> anyhow::Result<Vec<RoleRow>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"SELECT role_id, role_name FROM roles ORDER BY role_id"#,
        )
        .fetch_all(&self.db)
        .await
        .context("list roles")?;
        Ok(rows)
    }

    async fn insert(&self, user: &NewUser) -> anyhow::Result<i32> {
        let (user_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO users (first_name, last_name, email, phone, role_id, password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role_id)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(user_id)
    }

    async fn update(&self, user_id: i32, changes: &UserChanges) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET first_name = $1, last_name = $2, email = $3, phone = $4, role_id = $5,
                   password = COALESCE($6, password)
             WHERE user_id = $7
            "#,
        )
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(changes.role_id)
        .bind(&changes.password_hash)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("update user")?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_profile(&self, user_id: i32, changes: &ProfileChanges) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET first_name = $1, last_name = $2, email = $3, phone = $4
             WHERE user_id = $5
            "#,
        )
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("update profile")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: i32) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM users WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected() > 0)
    }
}
