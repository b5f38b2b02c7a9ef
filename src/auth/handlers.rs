use super::{models::UserAuthPayload, repository::AuthRepository};
use crate::{
    errors::ApiError,
    http::{ApiResponder, DataResponse},
    user::{
        models::{validate_password, User, UserCreateData},
        repository::UserRepository,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignInRequestBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponseBody {
    pub token: String,
    pub user: User,
}

impl ApiResponder for SignInResponseBody {
    fn unit() -> &'static str {
        "sign in response payload"
    }
    fn article() -> &'static str {
        "A"
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequestBody {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordResponseBody {
    pub updated: bool,
}

impl ApiResponder for ChangePasswordResponseBody {
    fn unit() -> &'static str {
        "password change confirmation"
    }
    fn article() -> &'static str {
        "A"
    }
}

pub struct AuthHandlers<A: AuthRepository, U: UserRepository> {
    auth_repo: A,
    user_repo: U,
}

impl<A: AuthRepository, U: UserRepository> AuthHandlers<A, U> {
    pub fn new(auth_repo: A, user_repo: U) -> Self {
        Self {
            auth_repo,
            user_repo,
        }
    }

    pub async fn handle_signup(
        &self,
        body: UserCreateData,
    ) -> Result<DataResponse<User>, ApiError> {
        body.validate()?;

        if self.user_repo.get_by_email(body.email.clone()).await?.is_some() {
            return Err(ApiError::EmailTaken);
        }

        let user = self.user_repo.create(body).await?;

        Ok(DataResponse::created(user))
    }

    pub async fn handle_signin(
        &self,
        body: SignInRequestBody,
    ) -> Result<DataResponse<SignInResponseBody>, ApiError> {
        let user = self
            .user_repo
            .get_by_email(body.email)
            .await?
            .ok_or(ApiError::AuthFailed)?;

        let token = self.auth_repo.login_user(&user, body.password).await?;

        Ok(SignInResponseBody { token, user }.into())
    }

    pub async fn handle_change_password(
        &self,
        auth: UserAuthPayload,
        body: ChangePasswordRequestBody,
    ) -> Result<DataResponse<ChangePasswordResponseBody>, ApiError> {
        validate_password(&body.new_password)?;

        let user = self
            .user_repo
            .get_by_id(auth.sub)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let matches = self
            .auth_repo
            .verify_password(user.password, body.old_password)
            .await?;

        if !matches {
            return Err(ApiError::OldPasswordIncorrect);
        }

        self.user_repo
            .update_password(auth.sub, body.new_password)
            .await?;

        Ok(ChangePasswordResponseBody { updated: true }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::jwt_repository::JwtAuthRepository,
        user::{memory_repository::InMemoryUserRepository, models::UserRole},
    };
    use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

    const RANDOM_BASE64_STRING: &str =
        "YYX3sUuIw9wbAQOL3XOUkOwWE5JCx32VLae5t0mo7Zpqx17PT9UFl58Yj3QQetBn";

    fn handlers() -> AuthHandlers<JwtAuthRepository, InMemoryUserRepository> {
        let auth_repo = JwtAuthRepository::new(
            Algorithm::HS512,
            EncodingKey::from_base64_secret(RANDOM_BASE64_STRING).unwrap(),
            DecodingKey::from_base64_secret(RANDOM_BASE64_STRING).unwrap(),
            3600,
        );

        AuthHandlers::new(auth_repo, InMemoryUserRepository::new(4))
    }

    fn signup_body(name: &str, email: &str) -> UserCreateData {
        UserCreateData {
            name: name.into(),
            email: email.into(),
            password: "Sup3rS3cret!".into(),
            address: None,
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_signup_name_boundaries() {
        let handlers = handlers();

        let err = handlers
            .handle_signup(signup_body(&"a".repeat(19), "short@example.com"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::InvalidName));

        handlers
            .handle_signup(signup_body(&"a".repeat(20), "exact@example.com"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let handlers = handlers();
        let name = "A name long enough to register";

        handlers
            .handle_signup(signup_body(name, "taken@example.com"))
            .await
            .unwrap();

        let err = handlers
            .handle_signup(signup_body(name, "taken@example.com"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::EmailTaken));
    }

    #[tokio::test]
    async fn test_signin_and_change_password() {
        let handlers = handlers();
        let name = "A name long enough to register";

        let created = handlers
            .handle_signup(signup_body(name, "account@example.com"))
            .await
            .unwrap();

        let signin = handlers
            .handle_signin(SignInRequestBody {
                email: "account@example.com".into(),
                password: "Sup3rS3cret!".into(),
            })
            .await
            .unwrap();
        assert!(!signin.data.token.is_empty());

        let auth = UserAuthPayload::from_user(&created.data, 3600);

        let err = handlers
            .handle_change_password(
                auth.clone(),
                ChangePasswordRequestBody {
                    old_password: "WrongP4ssword!".into(),
                    new_password: "An0therS3cret!".into(),
                },
            )
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::OldPasswordIncorrect));

        handlers
            .handle_change_password(
                auth,
                ChangePasswordRequestBody {
                    old_password: "Sup3rS3cret!".into(),
                    new_password: "An0therS3cret!".into(),
                },
            )
            .await
            .unwrap();

        // the old credential stops working, the new one signs in
        handlers
            .handle_signin(SignInRequestBody {
                email: "account@example.com".into(),
                password: "Sup3rS3cret!".into(),
            })
            .await
            .err()
            .unwrap();

        handlers
            .handle_signin(SignInRequestBody {
                email: "account@example.com".into(),
                password: "An0therS3cret!".into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_signin_with_unknown_email_fails_closed() {
        let handlers = handlers();

        let err = handlers
            .handle_signin(SignInRequestBody {
                email: "ghost@example.com".into(),
                password: "Sup3rS3cret!".into(),
            })
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::AuthFailed));
    }
}
