use crate::{errors::ApiError, http::ApiResponder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Rating {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub rating: i16,
}

impl ApiResponder for Rating {
    fn unit() -> &'static str {
        "rating"
    }
    fn article() -> &'static str {
        "A"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatingCreateData {
    pub store_id: Uuid,
    pub rating: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatingUpdateData {
    pub rating: i16,
}

pub fn validate_rating(value: i16) -> Result<(), ApiError> {
    if !(1..=5).contains(&value) {
        return Err(ApiError::InvalidRating);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_boundaries() {
        validate_rating(0).unwrap_err();
        validate_rating(6).unwrap_err();
        validate_rating(-3).unwrap_err();
        validate_rating(1).unwrap();
        validate_rating(5).unwrap();
    }
}
