use super::models::{User, UserCreateData};
use crate::{errors::ApiError, query::UserFilter};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Sync + Send {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn get_by_email(&self, email: String) -> Result<Option<User>, ApiError>;
    async fn create(&self, data: UserCreateData) -> Result<User, ApiError>;
    async fn update_password(&self, id: Uuid, password: String) -> Result<(), ApiError>;
    async fn list(&self, filter: UserFilter) -> Result<Vec<User>, ApiError>;
    async fn count(&self) -> Result<u64, ApiError>;
}
