//! JSON projections of entities and their relations.
//!
//! Users, orders and products reference each other in a cycle
//! (user -> orders -> products -> orders ...). Each view renders one entity
//! plus its nested relations, and every nested entity is projected without
//! the back-reference to its parent:
//!
//! ```text
//! UserView     { id, name, address, email, orders: [OrderView { products: [ProductView] }] }
//! OrderView    { id, order_date, user_id, products: [ProductView] }
//! ProductView  { id, product_name, price, orders: [OrderView] }
//! ```
//!
//! Products nested in an order never carry `orders`, and orders nested in a
//! product never carry `products`. The omitted relation is left out of the
//! JSON entirely rather than rendered as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderWithProducts, Product, ProductWithOrders, UserWithOrders};
use crate::types::{OrderId, ProductId, UserId};

/// JSON shape of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: ProductId,
    pub product_name: String,
    pub price: f64,
    /// Orders containing the product; absent when nested under an order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<OrderView>>,
}

/// JSON shape of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    pub user_id: UserId,
    /// Products in the order; absent when nested under a product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductView>>,
}

/// JSON shape of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub address: Option<String>,
    pub email: String,
    pub orders: Vec<OrderView>,
}

/// Confirmation body returned by deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub message: String,
}

impl ProductView {
    /// Project a product without its orders.
    #[must_use]
    pub fn summary(product: &Product) -> Self {
        Self {
            id: product.id,
            product_name: product.product_name.clone(),
            price: product.price,
            orders: None,
        }
    }
}

impl OrderView {
    /// Project an order without its products.
    #[must_use]
    pub const fn summary(order: &Order) -> Self {
        Self {
            id: order.id,
            order_date: order.order_date,
            user_id: order.user_id,
            products: None,
        }
    }
}

impl From<&OrderWithProducts> for OrderView {
    fn from(graph: &OrderWithProducts) -> Self {
        Self {
            products: Some(graph.products.iter().map(ProductView::summary).collect()),
            ..Self::summary(&graph.order)
        }
    }
}

impl From<&ProductWithOrders> for ProductView {
    fn from(graph: &ProductWithOrders) -> Self {
        Self {
            orders: Some(graph.orders.iter().map(OrderView::summary).collect()),
            ..Self::summary(&graph.product)
        }
    }
}

impl From<&UserWithOrders> for UserView {
    fn from(graph: &UserWithOrders) -> Self {
        Self {
            id: graph.user.id,
            name: graph.user.name.clone(),
            address: graph.user.address.clone(),
            email: graph.user.email.clone(),
            orders: graph.orders.iter().map(OrderView::from).collect(),
        }
    }
}

impl MessageView {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
