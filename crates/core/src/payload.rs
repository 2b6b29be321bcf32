//! Request bodies and their validation.
//!
//! Payloads declare the only fields a client may send; anything else is
//! rejected during deserialization. [`UserPayload::validate`] and friends
//! check that required fields are present and fit their columns, producing
//! the field sets the repositories write.
//!
//! Creation and update share one payload per entity: updates overwrite the
//! whole record, so an omitted optional field is stored as `NULL`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::UserId;

/// Errors that can occur when validating a request payload.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// A required field is absent, `null`, or blank.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// A string field exceeds its column width.
    #[error("field `{field}` must be at most {max} characters")]
    TooLong {
        /// Offending field name.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
}

/// Maximum length of `user.name`.
pub const USER_NAME_MAX: usize = 50;
/// Maximum length of `user.address`.
pub const USER_ADDRESS_MAX: usize = 200;
/// Maximum length of `user.email`.
pub const USER_EMAIL_MAX: usize = 100;
/// Maximum length of `product.product_name`.
pub const PRODUCT_NAME_MAX: usize = 100;

/// Body of `POST /users` and `PUT /users/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPayload {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

/// Validated user columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub name: String,
    pub address: Option<String>,
    pub email: String,
}

impl UserPayload {
    /// Check required fields and column widths.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::MissingField` if `name` or `email` is absent or
    /// blank, and `PayloadError::TooLong` if any field exceeds its column.
    pub fn validate(self) -> Result<UserFields, PayloadError> {
        let name = required("name", self.name, USER_NAME_MAX)?;
        let email = required("email", self.email, USER_EMAIL_MAX)?;
        let address = optional("address", self.address, USER_ADDRESS_MAX)?;

        Ok(UserFields {
            name,
            address,
            email,
        })
    }
}

/// Body of `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPayload {
    pub product_name: Option<String>,
    pub price: Option<f64>,
}

/// Validated product columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub product_name: String,
    pub price: f64,
}

impl ProductPayload {
    /// Check required fields and column widths.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::MissingField` if `product_name` or `price` is
    /// absent, and `PayloadError::TooLong` if the name exceeds its column.
    pub fn validate(self) -> Result<ProductFields, PayloadError> {
        let product_name = required("product_name", self.product_name, PRODUCT_NAME_MAX)?;
        let price = self.price.ok_or(PayloadError::MissingField("price"))?;

        Ok(ProductFields {
            product_name,
            price,
        })
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderPayload {
    pub user_id: Option<UserId>,
    /// Explicit order date; the database default applies when omitted.
    pub order_date: Option<DateTime<Utc>>,
}

/// Validated order columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub order_date: Option<DateTime<Utc>>,
}

impl OrderPayload {
    /// Check that the owning user is given.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::MissingField` if `user_id` is absent.
    pub fn validate(self) -> Result<NewOrder, PayloadError> {
        let user_id = self.user_id.ok_or(PayloadError::MissingField("user_id"))?;

        Ok(NewOrder {
            user_id,
            order_date: self.order_date,
        })
    }
}

fn required(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<String, PayloadError> {
    match value {
        Some(v) if !v.trim().is_empty() => check_length(field, v, max),
        _ => Err(PayloadError::MissingField(field)),
    }
}

fn optional(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, PayloadError> {
    value.map(|v| check_length(field, v, max)).transpose()
}

fn check_length(field: &'static str, value: String, max: usize) -> Result<String, PayloadError> {
    if value.chars().count() > max {
        return Err(PayloadError::TooLong { field, max });
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_payload_valid() {
        let payload: UserPayload =
            serde_json::from_str(r#"{"name": "A", "email": "a@x.com"}"#).unwrap();
        let fields = payload.validate().unwrap();

        assert_eq!(fields.name, "A");
        assert_eq!(fields.email, "a@x.com");
        assert_eq!(fields.address, None);
    }

    #[test]
    fn test_user_payload_missing_email() {
        let payload: UserPayload = serde_json::from_str(r#"{"name": "A"}"#).unwrap();
        assert_eq!(
            payload.validate(),
            Err(PayloadError::MissingField("email"))
        );
    }

    #[test]
    fn test_user_payload_blank_name() {
        let payload: UserPayload =
            serde_json::from_str(r#"{"name": "  ", "email": "a@x.com"}"#).unwrap();
        assert_eq!(payload.validate(), Err(PayloadError::MissingField("name")));
    }

    #[test]
    fn test_user_payload_null_is_missing() {
        let payload: UserPayload =
            serde_json::from_str(r#"{"name": null, "email": "a@x.com"}"#).unwrap();
        assert_eq!(payload.validate(), Err(PayloadError::MissingField("name")));
    }

    #[test]
    fn test_user_payload_name_too_long() {
        let payload = UserPayload {
            name: Some("n".repeat(USER_NAME_MAX + 1)),
            address: None,
            email: Some("a@x.com".to_owned()),
        };
        assert_eq!(
            payload.validate(),
            Err(PayloadError::TooLong {
                field: "name",
                max: USER_NAME_MAX
            })
        );
    }

    #[test]
    fn test_user_payload_address_too_long() {
        let payload = UserPayload {
            name: Some("A".to_owned()),
            address: Some("x".repeat(USER_ADDRESS_MAX + 1)),
            email: Some("a@x.com".to_owned()),
        };
        assert!(matches!(
            payload.validate(),
            Err(PayloadError::TooLong {
                field: "address",
                ..
            })
        ));
    }

    #[test]
    fn test_user_payload_rejects_unknown_fields() {
        let result =
            serde_json::from_str::<UserPayload>(r#"{"name": "A", "email": "a@x.com", "admin": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_product_payload_valid() {
        let payload: ProductPayload =
            serde_json::from_str(r#"{"product_name": "Widget", "price": 4.25}"#).unwrap();
        let fields = payload.validate().unwrap();

        assert_eq!(fields.product_name, "Widget");
        assert!((fields.price - 4.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_product_payload_missing_price() {
        let payload: ProductPayload =
            serde_json::from_str(r#"{"product_name": "Widget"}"#).unwrap();
        assert_eq!(payload.validate(), Err(PayloadError::MissingField("price")));
    }

    #[test]
    fn test_order_payload_defaults_date() {
        let payload: OrderPayload = serde_json::from_str(r#"{"user_id": 1}"#).unwrap();
        let order = payload.validate().unwrap();

        assert_eq!(order.user_id, UserId::new(1));
        assert!(order.order_date.is_none());
    }

    #[test]
    fn test_order_payload_explicit_date() {
        let payload: OrderPayload =
            serde_json::from_str(r#"{"user_id": 2, "order_date": "2026-01-02T03:04:05Z"}"#)
                .unwrap();
        let order = payload.validate().unwrap();

        assert_eq!(
            order.order_date.unwrap().to_rfc3339(),
            "2026-01-02T03:04:05+00:00"
        );
    }

    #[test]
    fn test_order_payload_missing_user() {
        let payload: OrderPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(
            payload.validate(),
            Err(PayloadError::MissingField("user_id"))
        );
    }

    #[test]
    fn test_payload_error_display() {
        assert_eq!(
            PayloadError::MissingField("email").to_string(),
            "missing required field `email`"
        );
        assert_eq!(
            PayloadError::TooLong {
                field: "name",
                max: 50
            }
            .to_string(),
            "field `name` must be at most 50 characters"
        );
    }
}
