use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::AppState;
use crate::domain::category::{Category, NewCategory};
use crate::domain::ports::Store;
use crate::errors::AppError;

fn default_active() -> bool {
    true
}

/// Body for both create and update; an update replaces every field.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
    /// Leave out for a root category
    pub parent_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl From<CategoryRequest> for NewCategory {
    fn from(body: CategoryRequest) -> Self {
        NewCategory {
            name: body.name,
            description: body.description,
            parent_id: body.parent_id,
            active: body.active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchParams {
    pub keyword: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        CategoryResponse {
            id: c.id,
            name: c.name,
            description: c.description,
            parent_id: c.parent_id,
            active: c.active,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

fn to_responses(categories: Vec<Category>) -> Vec<CategoryResponse> {
    categories.into_iter().map(CategoryResponse::from).collect()
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Missing name"),
        (status = 404, description = "Unknown parent"),
        (status = 409, description = "Name already taken"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn create_category<S: Store>(
    state: web::Data<AppState<S>>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let new_category = NewCategory::from(body.into_inner());
    let category = web::block(move || state.categories.create_category(new_category)).await??;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Every category by name", body = [CategoryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn list_categories<S: Store>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let categories = web::block(move || state.categories.list_categories()).await??;
    Ok(HttpResponse::Ok().json(to_responses(categories)))
}

#[utoipa::path(
    get,
    path = "/api/categories/active",
    responses(
        (status = 200, description = "Active categories", body = [CategoryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn active_categories<S: Store>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let categories = web::block(move || state.categories.active_categories()).await??;
    Ok(HttpResponse::Ok().json(to_responses(categories)))
}

#[utoipa::path(
    get,
    path = "/api/categories/root",
    responses(
        (status = 200, description = "Categories without a parent", body = [CategoryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn root_categories<S: Store>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let categories = web::block(move || state.categories.root_categories()).await??;
    Ok(HttpResponse::Ok().json(to_responses(categories)))
}

/// GET /api/categories/search?keyword=book
///
/// Case-insensitive match on name or description.
#[utoipa::path(
    get,
    path = "/api/categories/search",
    params(
        ("keyword" = String, Query, description = "Text to look for"),
    ),
    responses(
        (status = 200, description = "Matching categories", body = [CategoryResponse]),
        (status = 400, description = "Blank keyword"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn search_categories<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let keyword = query.into_inner().keyword;
    let categories =
        web::block(move || state.categories.search_categories(&keyword)).await??;
    Ok(HttpResponse::Ok().json(to_responses(categories)))
}

#[utoipa::path(
    get,
    path = "/api/categories/name/{name}",
    params(
        ("name" = String, Path, description = "Exact category name"),
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn get_category_by_name<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();
    let category = web::block(move || state.categories.get_category_by_name(&name)).await??;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

#[utoipa::path(
    get,
    path = "/api/categories/check-name/{name}",
    params(
        ("name" = String, Path, description = "Exact category name"),
    ),
    responses(
        (status = 200, description = "Whether the name is taken", body = bool),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn category_name_exists<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();
    let exists = web::block(move || state.categories.name_exists(&name)).await??;
    Ok(HttpResponse::Ok().json(exists))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category UUID"),
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn get_category<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    let category = web::block(move || state.categories.get_category(category_id)).await??;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// PUT /api/categories/{id}
///
/// Moving a category below one of its own descendants answers 400.
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category UUID"),
    ),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Missing name or parent loop"),
        (status = 404, description = "Category or parent not found"),
        (status = 409, description = "Name taken by another category"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn update_category<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    let data = NewCategory::from(body.into_inner());
    let category =
        web::block(move || state.categories.update_category(category_id, data)).await??;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// DELETE /api/categories/{id}
///
/// Children become roots and products lose the category.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category UUID"),
    ),
    responses(
        (status = 204, description = "Category deleted, or never existed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn delete_category<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    web::block(move || state.categories.delete_category(category_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/subcategories",
    params(
        ("id" = Uuid, Path, description = "Parent category UUID"),
    ),
    responses(
        (status = 200, description = "Direct children of the category", body = [CategoryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn subcategories<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let parent_id = path.into_inner();
    let categories = web::block(move || state.categories.subcategories(parent_id)).await??;
    Ok(HttpResponse::Ok().json(to_responses(categories)))
}
