//! Order repository and order/product association management.
//!
//! Attaching and detaching products are idempotent: attaching a product that
//! is already on the order leaves the existing association row (and its
//! quantity) untouched, and detaching a product that is not on the order
//! changes nothing.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::{debug, instrument};

use ecom_core::{
    NewOrder, Order, OrderId, OrderProduct, OrderWithProducts, Product, ProductId,
    ProductWithOrders, UserId,
};

use super::RepositoryError;
use super::products::orders_by_product;
use super::users::UserRepository;

/// Repository for order database operations.
pub struct OrderRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> OrderRepository<'c> {
    /// Create a new order repository on a request connection.
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// List the orders of a user, each with its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_by_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithProducts>, RepositoryError> {
        if !UserRepository::new(&mut *self.conn).exists(user_id).await? {
            return Err(RepositoryError::NotFound(format!("user {user_id}")));
        }

        let mut orders = orders_by_user(&mut *self.conn, &[user_id]).await?;
        Ok(orders.remove(&user_id).unwrap_or_default())
    }

    /// Get an order by its ID, with its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&mut self, id: OrderId) -> Result<Option<OrderWithProducts>, RepositoryError> {
        let Some(order) = self.find(id).await? else {
            return Ok(None);
        };

        let mut products = products_by_order(&mut *self.conn, &[id]).await?;
        Ok(Some(OrderWithProducts {
            products: products.remove(&id).unwrap_or_default(),
            order,
        }))
    }

    /// Create a new order for an existing user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, new_order), fields(user_id = %new_order.user_id))]
    pub async fn create(&mut self, new_order: &NewOrder) -> Result<OrderWithProducts, RepositoryError> {
        let order: Order = sqlx::query_as(
            r#"
            INSERT INTO "order" (user_id, order_date)
            VALUES ($1, COALESCE($2, now()))
            RETURNING id, order_date, user_id
            "#,
        )
        .bind(new_order.user_id)
        .bind(new_order.order_date)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            RepositoryError::from_write(
                e,
                "order already exists",
                &format!("user {} does not exist", new_order.user_id),
            )
        })?;

        debug!(order_id = %order.id, "Created order");
        Ok(OrderWithProducts {
            order,
            products: Vec::new(),
        })
    }

    /// Attach a product to an order with the default quantity.
    ///
    /// Does nothing if the product is already attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order or product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(order_id = %order_id, product_id = %product_id))]
    pub async fn attach_product(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<OrderWithProducts, RepositoryError> {
        self.ensure_order_and_product(order_id, product_id).await?;

        let result = sqlx::query(
            r"
            INSERT INTO order_product (order_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id, product_id) DO NOTHING
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(OrderProduct::DEFAULT_QUANTITY)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, "product already attached", "order or product removed")
        })?;

        debug!(inserted = result.rows_affected(), "Attached product");
        self.reload(order_id).await
    }

    /// Detach a product from an order.
    ///
    /// Does nothing if the product is not attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order or product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(order_id = %order_id, product_id = %product_id))]
    pub async fn detach_product(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<OrderWithProducts, RepositoryError> {
        self.ensure_order_and_product(order_id, product_id).await?;

        let result = sqlx::query(
            r"
            DELETE FROM order_product
            WHERE order_id = $1 AND product_id = $2
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .execute(&mut *self.conn)
        .await?;

        debug!(removed = result.rows_affected(), "Detached product");
        self.reload(order_id).await
    }

    /// Get the association rows of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn associations(
        &mut self,
        order_id: OrderId,
    ) -> Result<Vec<OrderProduct>, RepositoryError> {
        let rows = sqlx::query_as(
            r"
            SELECT order_id, product_id, quantity
            FROM order_product
            WHERE order_id = $1
            ORDER BY product_id
            ",
        )
        .bind(order_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// List the products of an order, each with the orders it appears in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn products(
        &mut self,
        order_id: OrderId,
    ) -> Result<Vec<ProductWithOrders>, RepositoryError> {
        let order = self.reload(order_id).await?;

        let ids: Vec<ProductId> = order.products.iter().map(|p| p.id).collect();
        let mut orders = orders_by_product(&mut *self.conn, &ids).await?;

        Ok(order
            .products
            .into_iter()
            .map(|product| ProductWithOrders {
                orders: orders.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }

    async fn find(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as(
            r#"
            SELECT id, order_date, user_id
            FROM "order"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(order)
    }

    async fn reload(&mut self, id: OrderId) -> Result<OrderWithProducts, RepositoryError> {
        self.get(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("order {id}")))
    }

    async fn ensure_order_and_product(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let (order_exists, product_exists): (bool, bool) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM "order" WHERE id = $1),
                   EXISTS(SELECT 1 FROM product WHERE id = $2)
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .fetch_one(&mut *self.conn)
        .await?;

        if !order_exists {
            return Err(RepositoryError::NotFound(format!("order {order_id}")));
        }
        if !product_exists {
            return Err(RepositoryError::NotFound(format!("product {product_id}")));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct OrderProductRow {
    order_id: OrderId,
    #[sqlx(flatten)]
    product: Product,
}

/// Load the products attached to each of the given orders.
///
/// Orders without products are absent from the map.
pub(super) async fn products_by_order(
    conn: &mut PgConnection,
    order_ids: &[OrderId],
) -> Result<HashMap<OrderId, Vec<Product>>, RepositoryError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let ids: Vec<i32> = order_ids.iter().map(OrderId::as_i32).collect();
    let rows: Vec<OrderProductRow> = sqlx::query_as(
        r"
        SELECT op.order_id, p.id, p.product_name, p.price
        FROM order_product op
        JOIN product p ON p.id = op.product_id
        WHERE op.order_id = ANY($1)
        ORDER BY op.order_id, p.id
        ",
    )
    .bind(&ids)
    .fetch_all(conn)
    .await?;

    let mut grouped: HashMap<OrderId, Vec<Product>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row.product);
    }
    Ok(grouped)
}

/// Load the orders of each of the given users, each with its products.
///
/// Users without orders are absent from the map.
pub(super) async fn orders_by_user(
    conn: &mut PgConnection,
    user_ids: &[UserId],
) -> Result<HashMap<UserId, Vec<OrderWithProducts>>, RepositoryError> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let ids: Vec<i32> = user_ids.iter().map(UserId::as_i32).collect();
    let orders: Vec<Order> = sqlx::query_as(
        r#"
        SELECT id, order_date, user_id
        FROM "order"
        WHERE user_id = ANY($1)
        ORDER BY id
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let order_ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
    let mut products = products_by_order(conn, &order_ids).await?;

    let mut grouped: HashMap<UserId, Vec<OrderWithProducts>> = HashMap::new();
    for order in orders {
        grouped
            .entry(order.user_id)
            .or_default()
            .push(OrderWithProducts {
                products: products.remove(&order.id).unwrap_or_default(),
                order,
            });
    }
    Ok(grouped)
}
