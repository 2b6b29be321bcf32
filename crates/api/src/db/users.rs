//! User repository for database operations.
//!
//! Users are always returned together with their orders (and each order's
//! products), which is the shape every user endpoint renders.

use sqlx::PgConnection;
use tracing::{debug, instrument};

use ecom_core::{User, UserFields, UserId, UserWithOrders};

use super::RepositoryError;
use super::orders::orders_by_user;

const EMAIL_TAKEN: &str = "email already exists";

/// Repository for user database operations.
pub struct UserRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> UserRepository<'c> {
    /// Create a new user repository on a request connection.
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// List every user with their orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&mut self) -> Result<Vec<UserWithOrders>, RepositoryError> {
        let users: Vec<User> = sqlx::query_as(
            r#"
            SELECT id, name, address, email
            FROM "user"
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        debug!(count = users.len(), "Loaded users");
        self.with_orders(users).await
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&mut self, id: UserId) -> Result<Option<UserWithOrders>, RepositoryError> {
        let Some(user) = self.find(id).await? else {
            return Ok(None);
        };

        Ok(self.with_orders(vec![user]).await?.pop())
    }

    /// Whether a user with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&mut self, id: UserId) -> Result<bool, RepositoryError> {
        let row: (bool,) = sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM "user" WHERE id = $1)"#)
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(row.0)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, fields))]
    pub async fn create(&mut self, fields: &UserFields) -> Result<User, RepositoryError> {
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO "user" (name, address, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, email
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.address)
        .bind(&fields.email)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::from_write(e, EMAIL_TAKEN, "invalid reference"))?;

        debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Overwrite every column of an existing user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email belongs to another user.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, fields), fields(user_id = %id))]
    pub async fn update(
        &mut self,
        id: UserId,
        fields: &UserFields,
    ) -> Result<UserWithOrders, RepositoryError> {
        let user: Option<User> = sqlx::query_as(
            r#"
            UPDATE "user"
            SET name = $2, address = $3, email = $4
            WHERE id = $1
            RETURNING id, name, address, email
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.address)
        .bind(&fields.email)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::from_write(e, EMAIL_TAKEN, "invalid reference"))?;

        let user = user.ok_or_else(|| RepositoryError::NotFound(format!("user {id}")))?;

        self.with_orders(vec![user])
            .await?
            .pop()
            .ok_or_else(|| RepositoryError::NotFound(format!("user {id}")))
    }

    /// Delete a user.
    ///
    /// Users that still own orders are not deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the user has orders.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&mut self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    RepositoryError::Conflict("user has existing orders".to_owned())
                }
                e => RepositoryError::Database(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("user {id}")));
        }

        debug!("Deleted user");
        Ok(())
    }

    async fn find(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as(
            r#"
            SELECT id, name, address, email
            FROM "user"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(user)
    }

    async fn with_orders(
        &mut self,
        users: Vec<User>,
    ) -> Result<Vec<UserWithOrders>, RepositoryError> {
        let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
        let mut orders = orders_by_user(&mut *self.conn, &ids).await?;

        Ok(users
            .into_iter()
            .map(|user| UserWithOrders {
                orders: orders.remove(&user.id).unwrap_or_default(),
                user,
            })
            .collect())
    }
}
