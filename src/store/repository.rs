use super::models::{Store, StoreCreateData};
use crate::{errors::ApiError, query::StoreFilter};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait StoreRepository: Sync + Send {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Store>, ApiError>;
    async fn get_by_email(&self, email: String) -> Result<Option<Store>, ApiError>;
    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Vec<Store>, ApiError>;
    async fn create(&self, data: StoreCreateData) -> Result<Store, ApiError>;

    /// Free-text listing: a term matches name OR address, case-insensitive;
    /// no term returns everything.
    async fn search(&self, term: Option<String>) -> Result<Vec<Store>, ApiError>;

    async fn list(&self, filter: StoreFilter) -> Result<Vec<Store>, ApiError>;
    async fn count(&self) -> Result<u64, ApiError>;
}
