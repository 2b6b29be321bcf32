//! Product route handlers.

use axum::{Json, extract::State, http::StatusCode};

use ecom_core::{MessageView, ProductId, ProductPayload, ProductView, ProductWithOrders};

use crate::db::{self, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::{ApiJson, ApiPath};
use crate::state::AppState;

/// `GET /products` - list every product with the orders it appears in.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let mut tx = db::begin(state.pool()).await?;
    let products = ProductRepository::new(&mut tx).list().await?;
    db::commit(tx).await?;

    Ok(Json(products.iter().map(ProductView::from).collect()))
}

/// `GET /products/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductView>> {
    let mut tx = db::begin(state.pool()).await?;
    let product = ProductRepository::new(&mut tx)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    db::commit(tx).await?;

    Ok(Json(ProductView::from(&product)))
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<(StatusCode, Json<ProductView>)> {
    let fields = payload.validate()?;

    let mut tx = db::begin(state.pool()).await?;
    let product = ProductRepository::new(&mut tx).create(&fields).await?;
    db::commit(tx).await?;

    tracing::info!(product_id = %product.id, "Product created");

    let graph = ProductWithOrders {
        product,
        orders: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(ProductView::from(&graph))))
}

/// `PUT /products/{id}` - overwrite every field of a product.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<Json<ProductView>> {
    let fields = payload.validate()?;

    let mut tx = db::begin(state.pool()).await?;
    let product = ProductRepository::new(&mut tx).update(id, &fields).await?;
    db::commit(tx).await?;

    Ok(Json(ProductView::from(&product)))
}

/// `DELETE /products/{id}`
///
/// Removes the product from every order it was attached to.
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<MessageView>> {
    let mut tx = db::begin(state.pool()).await?;
    ProductRepository::new(&mut tx).delete(id).await?;
    db::commit(tx).await?;

    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(MessageView::new("Product deleted.")))
}
