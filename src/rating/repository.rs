use super::models::Rating;
use crate::errors::ApiError;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence of the one-row-per-(user, store) ledger. Implementations
/// MUST enforce the pair uniqueness atomically at the storage layer, not by
/// check-then-insert, so concurrent submits for the same pair cannot both
/// succeed.
#[async_trait]
pub trait RatingRepository: Sync + Send {
    async fn get_by_user_store(
        &self,
        user_id: Uuid,
        store_id: Uuid,
    ) -> Result<Option<Rating>, ApiError>;

    /// Fails with `AlreadyRated` when a row for the pair exists.
    async fn create(&self, user_id: Uuid, store_id: Uuid, rating: i16)
        -> Result<Rating, ApiError>;

    /// Overwrites the value in place, `created_at` untouched. Fails with
    /// `RatingNotFound` when the pair has no row.
    async fn update(&self, user_id: Uuid, store_id: Uuid, rating: i16)
        -> Result<Rating, ApiError>;

    async fn list_for_store(&self, store_id: Uuid) -> Result<Vec<Rating>, ApiError>;
    async fn list_for_stores(&self, store_ids: Vec<Uuid>) -> Result<Vec<Rating>, ApiError>;
    async fn count(&self) -> Result<u64, ApiError>;
}
