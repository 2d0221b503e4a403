use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{NewUser, User};

pub struct UserService<R> {
    users: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(users: R) -> Self {
        Self { users }
    }

    /// Usernames and emails are unique. The lookups give a readable error;
    /// the storage constraint still catches a registration race.
    pub fn register_user(&self, user: NewUser) -> Result<User, DomainError> {
        let user = normalize(user);
        user.validate()?;
        self.check_unique(&user, None)?;

        let user = self.users.insert_user(user)?;
        log::info!("User {} registered as '{}'", user.id, user.username);
        Ok(user)
    }

    /// Replaces username, email and full name. The same uniqueness rules
    /// apply as on registration, ignoring the user's own record.
    pub fn update_user(&self, id: Uuid, data: NewUser) -> Result<User, DomainError> {
        let data = normalize(data);
        data.validate()?;
        let mut user = self.get_user(id)?;
        self.check_unique(&data, Some(id))?;

        user.username = data.username;
        user.email = data.email;
        user.full_name = data.full_name;
        let user = self.users.save_user(&user)?;
        log::info!("User {} updated", user.id);
        Ok(user)
    }

    /// A user that does not exist is already deleted. Users that still own
    /// orders or reviews are kept and reported as a conflict.
    pub fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        if self.users.delete_user(id)? {
            log::info!("User {} deleted", id);
        }
        Ok(())
    }

    pub fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_user(id)?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    pub fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.users.list_users()
    }

    fn check_unique(&self, user: &NewUser, owner: Option<Uuid>) -> Result<(), DomainError> {
        let someone_else = |found: Option<User>| found.is_some_and(|u| Some(u.id) != owner);
        if someone_else(self.users.find_user_by_username(&user.username)?) {
            return Err(DomainError::Conflict(format!(
                "username '{}' is taken",
                user.username
            )));
        }
        if someone_else(self.users.find_user_by_email(&user.email)?) {
            return Err(DomainError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        Ok(())
    }
}

fn normalize(user: NewUser) -> NewUser {
    NewUser {
        username: user.username.trim().to_string(),
        email: user.email.trim().to_string(),
        full_name: user.full_name,
    }
}
