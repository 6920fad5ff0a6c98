use std::sync::Arc;

use uuid::Uuid;

use crate::domain::User;
use crate::errors::{CoreError, Result};
use crate::storage::UserRepository;

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Stores a user. Roles are free text; unknown roles are only refused
    /// when the user tries to decide on an expense.
    pub fn register_user(&self, name: &str, role: &str) -> Result<User> {
        let (name, role) = (name.trim(), role.trim());
        if name.is_empty() {
            return Err(CoreError::Validation("user name must not be empty".into()));
        }
        if role.is_empty() {
            return Err(CoreError::Validation("user role must not be empty".into()));
        }
        let user = self.users.insert_user(User::new(name, role))?;
        tracing::info!(user_id = %user.id, role = %user.role, "registered user");
        Ok(user)
    }

    pub fn user(&self, id: Uuid) -> Result<User> {
        self.users
            .user(id)?
            .ok_or_else(|| CoreError::not_found("User", id))
    }

    pub fn users(&self) -> Result<Vec<User>> {
        self.users.users()
    }
}
