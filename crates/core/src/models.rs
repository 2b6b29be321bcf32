//! Entity records and the relation graphs loaded around them.
//!
//! Records mirror the four tables one-to-one. The `*With*` aggregates carry
//! the relations a handler renders; they are assembled by the repositories
//! and projected to JSON by [`crate::view`].

use chrono::{DateTime, Utc};

use crate::types::{OrderId, ProductId, UserId};

/// A customer account.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    /// Generated primary key.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Free-form postal address.
    pub address: Option<String>,
    /// Email address, unique across all users.
    pub email: String,
}

/// An order placed by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
    /// Generated primary key.
    pub id: OrderId,
    /// When the order was placed (defaults to insertion time).
    pub order_date: DateTime<Utc>,
    /// Owning user.
    pub user_id: UserId,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    /// Generated primary key.
    pub id: ProductId,
    /// Product name.
    pub product_name: String,
    /// Unit price. No currency or precision guarantee.
    pub price: f64,
}

/// Association row between an order and a product.
///
/// At most one row exists per `(order_id, product_id)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct OrderProduct {
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Units of the product in the order.
    pub quantity: i32,
}

impl OrderProduct {
    /// Quantity recorded when a product is first attached to an order.
    pub const DEFAULT_QUANTITY: i32 = 1;
}

/// An order together with the products attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderWithProducts {
    pub order: Order,
    pub products: Vec<Product>,
}

/// A product together with the orders it appears in.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductWithOrders {
    pub product: Product,
    pub orders: Vec<Order>,
}

/// A user together with their orders, each carrying its products.
#[derive(Debug, Clone, PartialEq)]
pub struct UserWithOrders {
    pub user: User,
    pub orders: Vec<OrderWithProducts>,
}
