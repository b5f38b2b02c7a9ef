use crate::{
    errors::ApiError,
    http::ApiResponder,
    user::models::{validate_address, validate_email},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Store {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub owner_id: Option<Uuid>,
}

impl ApiResponder for Store {
    fn unit() -> &'static str {
        "store"
    }
    fn article() -> &'static str {
        "A"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreCreateData {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub owner_id: Option<Uuid>,
}

impl StoreCreateData {
    pub fn validate(&self) -> Result<(), ApiError> {
        let name_len = self.name.chars().count();
        if !(1..=60).contains(&name_len) {
            return Err(ApiError::InvalidStoreName);
        }

        validate_email(&self.email)?;
        validate_address(self.address.as_deref())?;

        Ok(())
    }
}

/// Store as reported by the admin listing and the owner dashboard: the
/// persisted record plus the read-time mean. `average_rating` is `None`
/// when the store has no ratings yet, which is not the same as zero.
#[derive(Debug, Clone, Serialize)]
pub struct StoreWithAverage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub average_rating: Option<String>,
}

impl StoreWithAverage {
    pub fn new(store: Store, average_rating: Option<String>) -> Self {
        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            image_url: store.image_url,
            average_rating,
        }
    }
}

impl ApiResponder for StoreWithAverage {
    fn unit() -> &'static str {
        "store"
    }
    fn article() -> &'static str {
        "A"
    }
}

/// Public listing entry: adds the caller's own rating for the store, again
/// with an explicit absence when the caller has not rated it.
#[derive(Debug, Clone, Serialize)]
pub struct StoreListEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub average_rating: Option<String>,
    pub your_rating: Option<i16>,
}

impl ApiResponder for StoreListEntry {
    fn unit() -> &'static str {
        "store"
    }
    fn article() -> &'static str {
        "A"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_data() -> StoreCreateData {
        StoreCreateData {
            name: "Baker Street Groceries".into(),
            email: "store@example.com".into(),
            address: Some("221B Baker Street".into()),
            image_url: None,
            owner_id: None,
        }
    }

    #[test]
    fn test_store_name_boundaries() {
        let mut data = create_data();

        data.name = String::new();
        assert!(matches!(data.validate(), Err(ApiError::InvalidStoreName)));

        data.name = "a".into();
        data.validate().unwrap();

        data.name = "a".repeat(60);
        data.validate().unwrap();

        data.name = "a".repeat(61);
        assert!(matches!(data.validate(), Err(ApiError::InvalidStoreName)));
    }

    #[test]
    fn test_store_email_shape() {
        let mut data = create_data();
        data.email = "not-an-email".into();

        assert!(matches!(data.validate(), Err(ApiError::InvalidEmail)));
    }
}
