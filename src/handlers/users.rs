use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::AppState;
use crate::domain::ports::Store;
use crate::domain::user::{NewUser, User};
use crate::errors::AppError;

/// Also the body of a profile update, which replaces all three fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl From<RegisterUserRequest> for NewUser {
    fn from(body: RegisterUserRequest) -> Self {
        NewUser {
            username: body.username,
            email: body.email,
            full_name: body.full_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Missing username or email"),
        (status = 409, description = "Username or email already registered"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn register_user<S: Store>(
    state: web::Data<AppState<S>>,
    body: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    let new_user = NewUser::from(body.into_inner());
    let user = web::block(move || state.users.register_user(new_user)).await??;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn get_user<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let user = web::block(move || state.users.get_user(user_id)).await??;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Every registered user", body = [UserResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn list_users<S: Store>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let users = web::block(move || state.users.list_users()).await??;
    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /api/users/{id}
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID"),
    ),
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Missing username or email"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email taken by another user"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn update_user<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let data = NewUser::from(body.into_inner());
    let user = web::block(move || state.users.update_user(user_id, data)).await??;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /api/users/{id}
///
/// A user who still has orders or reviews is kept and the call answers 409.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 204, description = "User deleted, or never existed"),
        (status = 409, description = "User still has orders or reviews"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn delete_user<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    web::block(move || state.users.delete_user(user_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}
