//! Product record types for the wire protocol and the REST surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// A single inventory record as the server reports it
///
/// Wire representation uses camelCase field names; `createdAt` is an
/// RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier, unique within the collection
    pub id: i64,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a product over REST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Client-side validation, applied before the request leaves the process
    pub fn validate(&self) -> SyncResult<()> {
        validate_fields(Some(&self.name), Some(self.price))
    }
}

/// Partial payload for updating a product over REST
///
/// Absent fields are omitted from the JSON body and left untouched by the
/// server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl ProductPatch {
    /// Validate whichever fields are present
    pub fn validate(&self) -> SyncResult<()> {
        validate_fields(self.name.as_deref(), self.price)
    }
}

fn validate_fields(name: Option<&str>, price: Option<f64>) -> SyncResult<()> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(SyncError::Invalid("name must not be blank".to_string()));
        }
    }
    if let Some(price) = price {
        if price <= 0.0 {
            return Err(SyncError::Invalid("price must be positive".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_serde_camel_case() {
        let json = r#"{"id":5,"name":"Widget","quantity":3,"price":9.99,"createdAt":"2024-01-01T00:00:00Z"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 5);
        assert_eq!(product.name, "Widget");
        assert_eq!(product.quantity, 3);

        let back = serde_json::to_string(&product).unwrap();
        assert!(back.contains("createdAt"));
        assert!(!back.contains("created_at"));
    }

    #[test]
    fn test_new_product_rejects_blank_name() {
        let product = NewProduct::new("   ", 1, 2.0);
        assert!(matches!(product.validate(), Err(SyncError::Invalid(_))));
    }

    #[test]
    fn test_new_product_rejects_non_positive_price() {
        assert!(NewProduct::new("Widget", 1, 0.0).validate().is_err());
        assert!(NewProduct::new("Widget", 1, -3.5).validate().is_err());
        assert!(NewProduct::new("Widget", 0, 0.01).validate().is_ok());
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = ProductPatch {
            quantity: Some(7),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"quantity":7}"#);
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_patch_validates_present_fields() {
        let patch = ProductPatch {
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
