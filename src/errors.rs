use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::ENCODING_FAILED_BODY;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error_code: u32,
}

impl ErrorBody {
    #[inline]
    pub fn new(message: String, error_code: u32) -> Self {
        Self {
            message,
            error_code,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("The authorization header was not provided")]
    AuthHeaderMissing,
    #[error("The provided authorization header is invalid")]
    AuthHeaderInvalid,
    #[error("The provided auth token is expired")]
    AuthTokenExpired,
    #[error("The provided auth token is invalid")]
    AuthTokenInvalid,
    #[error("Old password is incorrect")]
    OldPasswordIncorrect,

    #[error("Invalid credentials")]
    AuthFailed,
    #[error("Name must be 20-60 characters")]
    InvalidName,
    #[error("Address max length is 400")]
    InvalidAddress,
    #[error("Password must be 8-16 characters, include 1 uppercase and 1 special character")]
    InvalidPassword,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Store name must be 1-60 characters")]
    InvalidStoreName,
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("Store owner must be an existing user with the owner role")]
    InvalidStoreOwner,

    #[error("Access denied for this role")]
    RoleForbidden,
    #[error("Access denied to this store")]
    StoreAccessDenied,

    #[error("User not found")]
    UserNotFound,
    #[error("Store not found")]
    StoreNotFound,
    #[error("You haven't rated this store yet")]
    RatingNotFound,

    #[error("Email already registered")]
    EmailTaken,
    #[error("Store email already exists")]
    StoreEmailTaken,
    #[error("You have already rated this store")]
    AlreadyRated,

    #[error("Server service panicked: {0:?}")]
    ServicePanicked(Option<String>),
    #[error("Something went wrong while accessing the data storage")]
    SqlxError,
    #[error("Something went wrong while processing the password")]
    AuthBcryptHashFailed,
    #[error("Something went wrong while generating the auth token")]
    AuthTokenGenerationFailed,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AuthHeaderMissing
            | ApiError::AuthHeaderInvalid
            | ApiError::AuthTokenExpired
            | ApiError::AuthTokenInvalid
            | ApiError::OldPasswordIncorrect => StatusCode::UNAUTHORIZED,

            ApiError::AuthFailed
            | ApiError::InvalidName
            | ApiError::InvalidAddress
            | ApiError::InvalidPassword
            | ApiError::InvalidEmail
            | ApiError::InvalidStoreName
            | ApiError::InvalidRating
            | ApiError::InvalidStoreOwner => StatusCode::BAD_REQUEST,

            ApiError::RoleForbidden | ApiError::StoreAccessDenied => StatusCode::FORBIDDEN,

            ApiError::UserNotFound | ApiError::StoreNotFound | ApiError::RatingNotFound => {
                StatusCode::NOT_FOUND
            }

            ApiError::EmailTaken | ApiError::StoreEmailTaken | ApiError::AlreadyRated => {
                StatusCode::CONFLICT
            }

            ApiError::ServicePanicked(_)
            | ApiError::SqlxError
            | ApiError::AuthBcryptHashFailed
            | ApiError::AuthTokenGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> u32 {
        match self {
            ApiError::AuthFailed => 40001,
            ApiError::InvalidName => 40002,
            ApiError::InvalidAddress => 40003,
            ApiError::InvalidPassword => 40004,
            ApiError::InvalidEmail => 40005,
            ApiError::InvalidStoreName => 40006,
            ApiError::InvalidRating => 40007,
            ApiError::InvalidStoreOwner => 40008,

            ApiError::AuthHeaderMissing => 40101,
            ApiError::AuthHeaderInvalid => 40102,
            ApiError::AuthTokenExpired => 40103,
            ApiError::AuthTokenInvalid => 40104,
            ApiError::OldPasswordIncorrect => 40105,

            ApiError::RoleForbidden => 40301,
            ApiError::StoreAccessDenied => 40302,

            ApiError::UserNotFound => 40401,
            ApiError::StoreNotFound => 40402,
            ApiError::RatingNotFound => 40403,

            ApiError::EmailTaken => 40901,
            ApiError::StoreEmailTaken => 40902,
            ApiError::AlreadyRated => 40903,

            ApiError::ServicePanicked(_) => 50001,
            ApiError::SqlxError => 50002,
            ApiError::AuthBcryptHashFailed => 50003,
            ApiError::AuthTokenGenerationFailed => 50004,
        }
    }
}

#[derive(Debug)]
pub struct ErrorResponse {
    pub status_code: StatusCode,
    pub error_code: u32,
    pub message: String,
}

impl From<ApiError> for ErrorResponse {
    fn from(value: ApiError) -> Self {
        Self {
            status_code: value.status_code(),
            error_code: value.error_code(),
            message: value.to_string(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let err_body = ErrorBody::new(self.message, self.error_code);

        let tuple = match serde_json::to_vec(&err_body) {
            Ok(buf) => (
                self.status_code,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(mime::APPLICATION_JSON.as_ref()),
                )],
                buf,
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(mime::APPLICATION_JSON.as_ref()),
                )],
                ENCODING_FAILED_BODY.to_vec(),
            ),
        };

        tuple.into_response()
    }
}

impl IntoResponse for ApiError {
    #[inline]
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_grouping() {
        assert_eq!(
            ApiError::AuthHeaderMissing.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::RoleForbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::AlreadyRated.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::InvalidRating.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::RatingNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_errors_keep_messages_generic() {
        assert!(!ApiError::SqlxError.to_string().to_lowercase().contains("sql"));
        assert!(!ApiError::AuthBcryptHashFailed
            .to_string()
            .to_lowercase()
            .contains("bcrypt"));
    }
}
