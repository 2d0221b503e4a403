use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::AppState;
use crate::domain::ports::Store;
use crate::domain::product::{NewProduct, Product, ProductChanges, ProductStatus};
use crate::errors::AppError;

use super::parse_decimal;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    /// Decimal price as a string, e.g. "9.99"
    pub price: String,
    pub stock_quantity: i32,
    pub category_id: Option<Uuid>,
}

/// Fields left out of the body keep their current value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Decimal price as a string, e.g. "9.99"
    pub price: Option<String>,
    /// New absolute stock level
    pub stock_quantity: Option<i32>,
    pub category_id: Option<Uuid>,
    /// AVAILABLE, OUT_OF_STOCK or DISCONTINUED. Out of stock is forced
    /// whenever stock is at or below zero.
    pub status: Option<String>,
}

impl UpdateProductRequest {
    fn into_changes(self) -> Result<ProductChanges, AppError> {
        Ok(ProductChanges {
            price: self
                .price
                .as_deref()
                .map(|raw| parse_decimal("price", raw))
                .transpose()?,
            status: self
                .status
                .as_deref()
                .map(str::parse::<ProductStatus>)
                .transpose()?,
            name: self.name,
            description: self.description,
            stock_quantity: self.stock_quantity,
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock_quantity: i32,
    pub status: String,
    pub category_id: Option<Uuid>,
    pub rating: f64,
    pub review_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            stock_quantity: p.stock_quantity,
            status: p.status.to_string(),
            category_id: p.category_id,
            rating: p.rating,
            review_count: p.review_count,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

fn to_responses(products: Vec<Product>) -> Vec<ProductResponse> {
    products.into_iter().map(ProductResponse::from).collect()
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product"),
        (status = 404, description = "Unknown category"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product<S: Store>(
    state: web::Data<AppState<S>>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let new_product = NewProduct {
        price: parse_decimal("price", &body.price)?,
        name: body.name,
        description: body.description,
        stock_quantity: body.stock_quantity,
        category_id: body.category_id,
    };
    let product = web::block(move || state.products.create_product(new_product)).await??;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products<S: Store>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let products = web::block(move || state.products.list_products()).await??;
    Ok(HttpResponse::Ok().json(to_responses(products)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let product = web::block(move || state.products.get_product(product_id)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /api/products/{id}
///
/// Edits run under the product's row lock, like stock decrements and rating
/// recomputes, so none of them overwrite each other.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid change"),
        (status = 404, description = "Product or category not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn update_product<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let changes = body.into_inner().into_changes()?;
    let product =
        web::block(move || state.products.update_product(product_id, changes)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

#[utoipa::path(
    get,
    path = "/api/products/in-stock",
    responses(
        (status = 200, description = "Available products with stock left", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn in_stock_products<S: Store>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let products = web::block(move || state.products.in_stock_products()).await??;
    Ok(HttpResponse::Ok().json(to_responses(products)))
}

#[utoipa::path(
    get,
    path = "/api/products/top-rated",
    responses(
        (status = 200, description = "The ten best rated products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn top_rated_products<S: Store>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let products = web::block(move || state.products.top_rated_products()).await??;
    Ok(HttpResponse::Ok().json(to_responses(products)))
}

#[utoipa::path(
    get,
    path = "/api/products/category/{category_id}",
    params(
        ("category_id" = Uuid, Path, description = "Category UUID"),
    ),
    responses(
        (status = 200, description = "Products filed under the category", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn products_by_category<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    let products =
        web::block(move || state.products.products_by_category(category_id)).await??;
    Ok(HttpResponse::Ok().json(to_responses(products)))
}
