//! In-process [`UserStore`] used by the test suite.

use std::sync::Mutex;

use async_trait::async_trait;

use super::repo::UserStore;
use super::repo_types::{NewUser, ProfileChanges, RoleRow, User, UserChanges, UserWithRole};
use crate::auth::roles::{role_name, Role};

#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    next_id: i32,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user with a real hash of `password`, returning its id.
    pub fn seed(&self, first: &str, email: &str, password: &str, role: Role) -> i32 {
        let hash = crate::auth::password::hash_password(password).unwrap();
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let user_id = inner.next_id;
        inner.users.push(User {
            user_id,
            first_name: first.into(),
            last_name: "Tester".into(),
            email: email.to_lowercase(),
            phone: Some("0501234567".into()),
            password: hash,
            role_id: role.id(),
        });
        user_id
    }

    pub fn set_role(&self, user_id: i32, role: Role) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(u) = inner.users.iter_mut().find(|u| u.user_id == user_id) {
            u.role_id = role.id();
        }
    }

    pub fn get(&self, user_id: i32) -> Option<User> {
        let inner = self.inner.lock().unwrap();
        inner.users.iter().find(|u| u.user_id == user_id).cloned()
    }

    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, user_id: i32) -> anyhow::Result<Option<User>> {
        Ok(self.get(user_id))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let email = email.to_lowercase();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn email_in_use(&self, email: &str, except: Option<i32>) -> anyhow::Result<bool> {
        let email = email.to_lowercase();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .any(|u| u.email.to_lowercase() == email && Some(u.user_id) != except))
    }

    async fn list_with_roles(&self) -> anyhow::Result<Vec<UserWithRole>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<UserWithRole> = inner
            .users
            .iter()
            .map(|u| UserWithRole {
                user_id: u.user_id,
                first_name: u.first_name.clone(),
                last_name: u.last_name.clone(),
                email: u.email.clone(),
                phone: u.phone.clone(),
                role_id: u.role_id,
                role_name: role_name(u.role_id).to_string(),
            })
            .collect();
        rows.sort_by_key(|r| r.user_id);
        Ok(rows)
    }

    async fn list_roles(&self) -> anyhow::Result<Vec<RoleRow>> {
        Ok(Role::ALL
            .iter()
            .map(|r| RoleRow {
                role_id: r.id(),
                role_name: r.name().to_string(),
            })
            .collect())
    }

    async fn insert(&self, user: &NewUser) -> anyhow::Result<i32> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let user_id = inner.next_id;
        inner.users.push(User {
            user_id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            password: user.password_hash.clone(),
            role_id: user.role_id,
        });
        Ok(user_id)
    }

    async fn update(&self, user_id: i32, changes: &UserChanges) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some(u) = inner.users.iter_mut().find(|u| u.user_id == user_id) else {
            return Ok(false);
        };
        u.first_name = changes.first_name.clone();
        u.last_name = changes.last_name.clone();
        u.email = changes.email.clone();
        u.phone = changes.phone.clone();
        u.role_id = changes.role_id;
        if let Some(hash) = &changes.password_hash {
            u.password = hash.clone();
        }
        Ok(true)
    }

    async fn update_profile(&self, user_id: i32, changes: &ProfileChanges) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some(u) = inner.users.iter_mut().find(|u| u.user_id == user_id) else {
            return Ok(false);
        };
        u.first_name = changes.first_name.clone();
        u.last_name = changes.last_name.clone();
        u.email = changes.email.clone();
        u.phone = changes.phone.clone();
        Ok(true)
    }

    async fn delete(&self, user_id: i32) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner.users.retain(|u| u.user_id != user_id);
        Ok(inner.users.len() != before)
    }
}
