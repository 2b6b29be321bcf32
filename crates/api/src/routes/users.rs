//! User route handlers.

use axum::{Json, extract::State, http::StatusCode};

use ecom_core::{MessageView, UserId, UserPayload, UserView, UserWithOrders};

use crate::db::{self, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{ApiJson, ApiPath};
use crate::state::AppState;

/// `GET /users` - list every user with their orders.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<UserView>>> {
    let mut tx = db::begin(state.pool()).await?;
    let users = UserRepository::new(&mut tx).list().await?;
    db::commit(tx).await?;

    Ok(Json(users.iter().map(UserView::from).collect()))
}

/// `GET /users/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<UserView>> {
    let mut tx = db::begin(state.pool()).await?;
    let user = UserRepository::new(&mut tx)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
    db::commit(tx).await?;

    Ok(Json(UserView::from(&user)))
}

/// `POST /users`
///
/// Returns `409 Conflict` if the email is already taken.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<(StatusCode, Json<UserView>)> {
    let fields = payload.validate()?;

    let mut tx = db::begin(state.pool()).await?;
    let user = UserRepository::new(&mut tx).create(&fields).await?;
    db::commit(tx).await?;

    tracing::info!(user_id = %user.id, "User created");

    let graph = UserWithOrders {
        user,
        orders: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(UserView::from(&graph))))
}

/// `PUT /users/{id}` - overwrite every field of a user.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<Json<UserView>> {
    let fields = payload.validate()?;

    let mut tx = db::begin(state.pool()).await?;
    let user = UserRepository::new(&mut tx).update(id, &fields).await?;
    db::commit(tx).await?;

    Ok(Json(UserView::from(&user)))
}

/// `DELETE /users/{id}`
///
/// Returns `409 Conflict` while the user still has orders.
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<MessageView>> {
    let mut tx = db::begin(state.pool()).await?;
    UserRepository::new(&mut tx).delete(id).await?;
    db::commit(tx).await?;

    tracing::info!(user_id = %id, "User deleted");
    Ok(Json(MessageView::new("User deleted.")))
}
