use super::models::UserAuthPayload;
use crate::{errors::ApiError, user::models::User};
use async_trait::async_trait;

#[async_trait]
pub trait AuthRepository: Sync + Send {
    /// Maps a bearer credential to its verified payload or rejects it.
    async fn auth_user(&self, token: String) -> Result<UserAuthPayload, ApiError>;

    /// Verifies the password against the user's stored digest and issues a
    /// fresh token on success.
    async fn login_user(&self, user: &User, password: String) -> Result<String, ApiError>;

    async fn generate_token(&self, user: &User) -> Result<String, ApiError>;

    async fn verify_password(
        &self,
        password_hash: String,
        password: String,
    ) -> Result<bool, ApiError>;
}
