use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::AppOrderService;
use crate::domain::order::{CancelOutcome, OrderStatus, OrderView};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────
//
// Caller identity is an explicit `user_id`: authentication happens upstream
// and this service trusts the id it is handed.

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    /// Whether payment already succeeded (simulated externally). Defaults to
    /// false.
    #[serde(default)]
    pub is_paid: bool,
    /// Shipping address to use. When omitted, the user's first saved address
    /// is used.
    pub address_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub user_id: Uuid,
    /// Target status: "outForDelivery" or "delivered".
    pub status: String,
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Decimal total as a string to avoid floating-point issues, e.g. "18.00"
    pub total_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_id: Uuid,
    pub status: String,
    pub is_paid: bool,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            address_id: order.address_id,
            status: order.status.as_str().to_string(),
            is_paid: order.is_paid,
            created_at: order.created_at.to_rfc3339(),
            lines: order
                .lines
                .into_iter()
                .map(|l| OrderLineResponse {
                    id: l.id,
                    product_id: l.product_id,
                    product_name: l.product_name,
                    quantity: l.quantity,
                    total_price: l.total_price.to_string(),
                })
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order from the user's cart: stock is decremented per line, the
/// cart is drained and the order lines freeze price-at-purchase, all inside
/// one transaction. A confirmation notification is sent after commit.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Empty cart, insufficient stock, or bad address"),
        (status = 404, description = "Unknown user"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<AppOrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let order = web::block(move || {
        service.create_order(body.user_id, body.is_paid, body.address_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("user_id" = Uuid, Query, description = "Owner of the order"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found (or owned by someone else)"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let user_id = query.into_inner().user_id;

    let order = web::block(move || service.get_order(order_id, user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("user_id" = Uuid, Query, description = "Owner of the orders"),
    ),
    responses(
        (status = 200, description = "The user's orders, newest first", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<AppOrderService>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = query.into_inner().user_id;

    let orders = web::block(move || service.list_orders(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let responses: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

/// PUT /orders/{id}
///
/// Status transitions are validated against the persisted state:
/// `processed` → `outForDelivery` → `delivered`, the last step only once the
/// order is paid. `is_paid` can be set but never unset.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Illegal status transition"),
        (status = 404, description = "Order not found (or owned by someone else)"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();

    let status = OrderStatus::parse(&body.status).ok_or_else(|| {
        AppError::BadRequest(format!("unknown order status '{}'", body.status))
    })?;

    let order = web::block(move || {
        service.update_order(order_id, body.user_id, status, body.is_paid)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /orders/{id}
///
/// Cancels an order. Only permitted while the order is still `processed`;
/// anything later is a 400, not a fault.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("user_id" = Uuid, Query, description = "Owner of the order"),
    ),
    responses(
        (status = 204, description = "Order cancelled"),
        (status = 400, description = "Order is not cancellable"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let user_id = query.into_inner().user_id;

    let outcome = web::block(move || service.cancel_order(order_id, user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match outcome {
        CancelOutcome::Cancelled => Ok(HttpResponse::NoContent().finish()),
        CancelOutcome::NotCancellable => Err(AppError::BadRequest(
            "an order can only be cancelled by its owner while it is still processed"
                .to_string(),
        )),
    }
}
