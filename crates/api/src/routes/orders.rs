//! Order route handlers.

use axum::{Json, extract::State, http::StatusCode};

use ecom_core::{OrderId, OrderPayload, OrderView, ProductId, ProductView, UserId};

use crate::db::{self, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::{ApiJson, ApiPath};
use crate::state::AppState;

/// `GET /orders/user/{user_id}` - orders of one user, with their products.
pub async fn by_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<OrderView>>> {
    let mut tx = db::begin(state.pool()).await?;
    let orders = OrderRepository::new(&mut tx).list_by_user(user_id).await?;
    db::commit(tx).await?;

    Ok(Json(orders.iter().map(OrderView::from).collect()))
}

/// `GET /orders/{order_id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(order_id): ApiPath<OrderId>,
) -> Result<Json<OrderView>> {
    let mut tx = db::begin(state.pool()).await?;
    let order = OrderRepository::new(&mut tx)
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
    db::commit(tx).await?;

    Ok(Json(OrderView::from(&order)))
}

/// `POST /orders`
///
/// Returns `400 Bad Request` if the referenced user does not exist.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<OrderPayload>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let new_order = payload.validate()?;

    let mut tx = db::begin(state.pool()).await?;
    let order = OrderRepository::new(&mut tx).create(&new_order).await?;
    db::commit(tx).await?;

    tracing::info!(order_id = %order.order.id, user_id = %new_order.user_id, "Order created");
    Ok((StatusCode::CREATED, Json(OrderView::from(&order))))
}

/// `PUT /orders/{order_id}/add_product/{product_id}`
pub async fn add_product(
    State(state): State<AppState>,
    ApiPath((order_id, product_id)): ApiPath<(OrderId, ProductId)>,
) -> Result<Json<OrderView>> {
    let mut tx = db::begin(state.pool()).await?;
    let order = OrderRepository::new(&mut tx)
        .attach_product(order_id, product_id)
        .await?;
    db::commit(tx).await?;

    Ok(Json(OrderView::from(&order)))
}

/// `DELETE /orders/{order_id}/remove_product/{product_id}`
pub async fn remove_product(
    State(state): State<AppState>,
    ApiPath((order_id, product_id)): ApiPath<(OrderId, ProductId)>,
) -> Result<Json<OrderView>> {
    let mut tx = db::begin(state.pool()).await?;
    let order = OrderRepository::new(&mut tx)
        .detach_product(order_id, product_id)
        .await?;
    db::commit(tx).await?;

    Ok(Json(OrderView::from(&order)))
}

/// `GET /orders/{order_id}/products`
pub async fn products(
    State(state): State<AppState>,
    ApiPath(order_id): ApiPath<OrderId>,
) -> Result<Json<Vec<ProductView>>> {
    let mut tx = db::begin(state.pool()).await?;
    let products = OrderRepository::new(&mut tx).products(order_id).await?;
    db::commit(tx).await?;

    Ok(Json(products.iter().map(ProductView::from).collect()))
}
