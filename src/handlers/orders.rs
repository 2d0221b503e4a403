use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::AppState;
use crate::domain::order::{Order, OrderInput, OrderItemInput, OrderStatus};
use crate::domain::ports::Store;
use crate::errors::AppError;

use super::parse_decimal;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    /// Decimal unit price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

impl PlaceOrderRequest {
    fn into_input(self) -> Result<OrderInput, AppError> {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                Ok(OrderItemInput {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item
                        .price
                        .as_deref()
                        .map(|raw| parse_decimal("price", raw))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        Ok(OrderInput {
            user_id: self.user_id,
            items,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusParams {
    /// One of PENDING, CONFIRMED, SHIPPED, DELIVERED, CANCELLED
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub price: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total_price: String,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            status: order.status.to_string(),
            total_price: order.total_price.to_string(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price: i.price.map(|p| p.to_string()),
                })
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Places an order: the total is computed server-side from the items that
/// carry both a price and a quantity, and each item's quantity is taken out
/// of its product's stock.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Malformed item or rejected by storage"),
        (status = 404, description = "Unknown buyer or product"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn place_order<S: Store>(
    state: web::Data<AppState<S>>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().into_input()?;
    let order = web::block(move || state.orders.place_order(input)).await??;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /api/orders/{id}
///
/// Returns the order together with its items.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = web::block(move || state.orders.get_order(order_id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Every order, newest first", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders<S: Store>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || state.orders.list_orders()).await??;
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/users/{id}/orders
#[utoipa::path(
    get,
    path = "/api/users/{id}/orders",
    params(
        ("id" = Uuid, Path, description = "Buyer UUID"),
    ),
    responses(
        (status = 200, description = "Orders placed by the user, newest first", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn orders_for_user<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let orders = web::block(move || state.orders.orders_for_user(user_id)).await??;
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /api/orders/{id}/status?status=SHIPPED
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("status" = String, Query, description = "New order status"),
    ),
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    query: web::Query<UpdateStatusParams>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status: OrderStatus = query.into_inner().status.parse()?;
    let order = web::block(move || state.orders.update_status(order_id, status)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /api/orders/{id}
///
/// Removes the order and its items. Stock is not restored.
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    web::block(move || state.orders.delete_order(order_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}
