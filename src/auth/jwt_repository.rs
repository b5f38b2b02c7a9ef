use super::{models::UserAuthPayload, repository::AuthRepository};
use crate::{errors::ApiError, user::models::User};
use async_trait::async_trait;
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tokio::task::spawn_blocking;

#[derive(Clone)]
pub struct JwtAuthRepository {
    enc_key: EncodingKey,
    dec_key: DecodingKey,
    validation: Validation,
    algo: Algorithm,

    token_duration: u64,
}

impl JwtAuthRepository {
    pub fn new(
        algo: Algorithm,
        enc_key: EncodingKey,
        dec_key: DecodingKey,
        token_duration: u64,
    ) -> Self {
        let validation = Validation::new(algo);

        Self {
            enc_key,
            dec_key,
            validation,
            algo,
            token_duration,
        }
    }
}

#[async_trait]
impl AuthRepository for JwtAuthRepository {
    async fn auth_user(&self, token: String) -> Result<UserAuthPayload, ApiError> {
        let token = jsonwebtoken::decode(&token, &self.dec_key, &self.validation).map_err(|e| {
            match e.into_kind() {
                ErrorKind::ExpiredSignature => ApiError::AuthTokenExpired,
                _ => ApiError::AuthTokenInvalid,
            }
        })?;

        Ok(token.claims)
    }

    async fn login_user(&self, user: &User, password: String) -> Result<String, ApiError> {
        let matches = self
            .verify_password(user.password.clone(), password)
            .await?;

        if !matches {
            return Err(ApiError::AuthFailed);
        }

        self.generate_token(user).await
    }

    async fn generate_token(&self, user: &User) -> Result<String, ApiError> {
        let claims = UserAuthPayload::from_user(user, self.token_duration);

        jsonwebtoken::encode(&Header::new(self.algo), &claims, &self.enc_key)
            .or(Err(ApiError::AuthTokenGenerationFailed))
    }

    async fn verify_password(
        &self,
        password_hash: String,
        password: String,
    ) -> Result<bool, ApiError> {
        spawn_blocking(move || bcrypt::verify(password, &password_hash))
            .await
            .map_err(|e| {
                tracing::error!(error = e.to_string(), "Failed to spawn blocking");
                ApiError::AuthBcryptHashFailed
            })?
            .map_err(|e| {
                tracing::error!(error = e.to_string(), "Failed to verify a password digest");
                ApiError::AuthBcryptHashFailed
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::models::UserRole;
    use chrono::Utc;
    use uuid::Uuid;

    const RANDOM_BASE64_STRING: &str =
        "YYX3sUuIw9wbAQOL3XOUkOwWE5JCx32VLae5t0mo7Zpqx17PT9UFl58Yj3QQetBn";

    fn repository(key: &str) -> JwtAuthRepository {
        JwtAuthRepository::new(
            Algorithm::HS512,
            EncodingKey::from_base64_secret(key).unwrap(),
            DecodingKey::from_base64_secret(key).unwrap(),
            3600,
        )
    }

    fn user(password_hash: String) -> User {
        let now = Utc::now();

        User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: "A name long enough to register".into(),
            email: "account@example.com".into(),
            address: None,
            role: UserRole::Owner,
            password: password_hash,
        }
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let repo = repository(RANDOM_BASE64_STRING);
        let user = user(String::new());

        let token = repo.generate_token(&user).await.unwrap();
        let payload = repo.auth_user(token).await.unwrap();

        assert_eq!(payload.sub, user.id);
        assert_eq!(payload.email, user.email);
        assert_eq!(payload.role, UserRole::Owner);
        assert!(payload.exp > payload.iat);
    }

    #[tokio::test]
    async fn test_token_from_another_key_is_rejected() {
        const OTHER_BASE64_STRING: &str =
            "qqW9zT1vY3jP5mR8cL2nK4xB7dF6hG0sA1eU9iO3pV5wQ8rT2yM6bN4kJ7lH0gXc";

        let repo = repository(RANDOM_BASE64_STRING);
        let other = repository(OTHER_BASE64_STRING);

        let token = other.generate_token(&user(String::new())).await.unwrap();

        assert!(matches!(
            repo.auth_user(token).await,
            Err(ApiError::AuthTokenInvalid)
        ));
    }

    #[tokio::test]
    async fn test_login_verifies_the_stored_digest() {
        let repo = repository(RANDOM_BASE64_STRING);
        let hash = bcrypt::hash("Sup3rS3cret!", 4).unwrap();
        let user = user(hash);

        repo.login_user(&user, "Sup3rS3cret!".into()).await.unwrap();

        assert!(matches!(
            repo.login_user(&user, "WrongP4ssword!".into()).await,
            Err(ApiError::AuthFailed)
        ));
    }
}
