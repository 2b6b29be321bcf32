//! Product repository for database operations.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::{debug, instrument};

use ecom_core::{Order, Product, ProductFields, ProductId, ProductWithOrders};

use super::RepositoryError;

/// Repository for product database operations.
pub struct ProductRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ProductRepository<'c> {
    /// Create a new product repository on a request connection.
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// List every product with the orders it appears in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&mut self) -> Result<Vec<ProductWithOrders>, RepositoryError> {
        let products: Vec<Product> = sqlx::query_as(
            r"
            SELECT id, product_name, price
            FROM product
            ORDER BY id
            ",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        debug!(count = products.len(), "Loaded products");
        self.with_orders(products).await
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&mut self, id: ProductId) -> Result<Option<ProductWithOrders>, RepositoryError> {
        let product: Option<Product> = sqlx::query_as(
            r"
            SELECT id, product_name, price
            FROM product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        let Some(product) = product else {
            return Ok(None);
        };

        Ok(self.with_orders(vec![product]).await?.pop())
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, fields))]
    pub async fn create(&mut self, fields: &ProductFields) -> Result<Product, RepositoryError> {
        let product: Product = sqlx::query_as(
            r"
            INSERT INTO product (product_name, price)
            VALUES ($1, $2)
            RETURNING id, product_name, price
            ",
        )
        .bind(&fields.product_name)
        .bind(fields.price)
        .fetch_one(&mut *self.conn)
        .await?;

        debug!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Overwrite every column of an existing product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, fields), fields(product_id = %id))]
    pub async fn update(
        &mut self,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<ProductWithOrders, RepositoryError> {
        let product: Option<Product> = sqlx::query_as(
            r"
            UPDATE product
            SET product_name = $2, price = $3
            WHERE id = $1
            RETURNING id, product_name, price
            ",
        )
        .bind(id)
        .bind(&fields.product_name)
        .bind(fields.price)
        .fetch_optional(&mut *self.conn)
        .await?;

        let product = product.ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))?;

        self.with_orders(vec![product])
            .await?
            .pop()
            .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))
    }

    /// Delete a product.
    ///
    /// Its association rows go with it (`ON DELETE CASCADE`); the orders stay.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&mut self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        }

        debug!("Deleted product");
        Ok(())
    }

    async fn with_orders(
        &mut self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductWithOrders>, RepositoryError> {
        let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
        let mut orders = orders_by_product(&mut *self.conn, &ids).await?;

        Ok(products
            .into_iter()
            .map(|product| ProductWithOrders {
                orders: orders.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct ProductOrderRow {
    product_id: ProductId,
    #[sqlx(flatten)]
    order: Order,
}

/// Load the orders containing each of the given products.
///
/// Products that appear in no order are absent from the map.
pub(super) async fn orders_by_product(
    conn: &mut PgConnection,
    product_ids: &[ProductId],
) -> Result<HashMap<ProductId, Vec<Order>>, RepositoryError> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let ids: Vec<i32> = product_ids.iter().map(ProductId::as_i32).collect();
    let rows: Vec<ProductOrderRow> = sqlx::query_as(
        r#"
        SELECT op.product_id, o.id, o.order_date, o.user_id
        FROM order_product op
        JOIN "order" o ON o.id = op.order_id
        WHERE op.product_id = ANY($1)
        ORDER BY op.product_id, o.id
        "#,
    )
    .bind(&ids)
    .fetch_all(conn)
    .await?;

    let mut grouped: HashMap<ProductId, Vec<Order>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(row.order);
    }
    Ok(grouped)
}
