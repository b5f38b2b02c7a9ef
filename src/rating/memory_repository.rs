use super::{models::Rating, repository::RatingRepository};
use crate::errors::ApiError;
use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Keyed by the `(user_id, store_id)` pair; holding the single mutex across
/// the occupancy check and the insert is what makes the uniqueness
/// invariant atomic here.
#[derive(Clone, Default)]
pub struct InMemoryRatingRepository {
    map: Arc<Mutex<HashMap<(Uuid, Uuid), Rating>>>,
}

impl InMemoryRatingRepository {
    #[inline]
    pub fn new() -> Self {
        Self {
            map: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn get_by_user_store(
        &self,
        user_id: Uuid,
        store_id: Uuid,
    ) -> Result<Option<Rating>, ApiError> {
        let lock = self.map.lock().await;

        Ok(lock.get(&(user_id, store_id)).cloned())
    }

    async fn create(
        &self,
        user_id: Uuid,
        store_id: Uuid,
        rating: i16,
    ) -> Result<Rating, ApiError> {
        let mut lock = self.map.lock().await;

        if lock.contains_key(&(user_id, store_id)) {
            return Err(ApiError::AlreadyRated);
        }

        let rating = Rating {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            user_id,
            store_id,
            rating,
        };

        lock.insert((user_id, store_id), rating.clone());
        drop(lock);

        Ok(rating)
    }

    async fn update(
        &self,
        user_id: Uuid,
        store_id: Uuid,
        rating: i16,
    ) -> Result<Rating, ApiError> {
        let mut lock = self.map.lock().await;

        let row = lock
            .get_mut(&(user_id, store_id))
            .ok_or(ApiError::RatingNotFound)?;
        row.rating = rating;

        Ok(row.clone())
    }

    async fn list_for_store(&self, store_id: Uuid) -> Result<Vec<Rating>, ApiError> {
        let lock = self.map.lock().await;

        let mut ratings: Vec<Rating> = lock
            .values()
            .filter(|r| r.store_id == store_id)
            .cloned()
            .collect();
        drop(lock);

        ratings.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(ratings)
    }

    async fn list_for_stores(&self, store_ids: Vec<Uuid>) -> Result<Vec<Rating>, ApiError> {
        let lock = self.map.lock().await;

        Ok(lock
            .values()
            .filter(|r| store_ids.contains(&r.store_id))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, ApiError> {
        let lock = self.map.lock().await;

        Ok(lock.len() as u64)
    }
}
