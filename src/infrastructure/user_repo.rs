use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{NewUser, User};
use crate::schema::users;

use super::models::{NewUserRow, UserRow};
use super::DieselStore;

impl UserRepository for DieselStore {
    fn insert_user(&self, user: NewUser) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                username: user.username,
                email: user.email,
                full_name: user.full_name,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(User::from))
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(User::from))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(User::from))
    }

    fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = users::table
            .select(UserRow::as_select())
            .order((users::created_at.asc(), users::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    fn save_user(&self, user: &User) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(users::table.find(user.id))
            .set((
                users::username.eq(&user.username),
                users::email.eq(&user.email),
                users::full_name.eq(user.full_name.as_deref()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(|| DomainError::not_found("User", user.id))?;
        Ok(row.into())
    }

    fn delete_user(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        match diesel::delete(users::table.find(id)).execute(&mut conn) {
            Ok(deleted) => Ok(deleted > 0),
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                Err(DomainError::Conflict(format!(
                    "user {} still has orders or reviews",
                    id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}
