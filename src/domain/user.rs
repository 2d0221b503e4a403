use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.username.trim().is_empty() {
            return Err(DomainError::InvalidInput("username is required".into()));
        }
        if self.email.trim().is_empty() {
            return Err(DomainError::InvalidInput("email is required".into()));
        }
        if !self.email.contains('@') {
            return Err(DomainError::InvalidInput(format!(
                "'{}' is not an email address",
                self.email
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
