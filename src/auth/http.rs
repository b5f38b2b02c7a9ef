use super::{models::UserAuthPayload, repository::AuthRepository};
use crate::{
    errors::{ApiError, ErrorResponse},
    user::models::UserRole,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::{any::type_name, marker::PhantomData};

/// Coarse role gate. Policies name the role set an operation accepts;
/// resource-scoped checks (store ownership, rating authorship) stay in the
/// operations themselves.
pub trait RolePolicy: Sync + Send {
    const ALLOWED: &'static [UserRole];

    #[inline]
    fn allows(role: &UserRole) -> bool {
        Self::ALLOWED.contains(role)
    }
}

pub struct AdminOnly;

impl RolePolicy for AdminOnly {
    const ALLOWED: &'static [UserRole] = &[UserRole::Admin];
}

pub struct OwnerOnly;

impl RolePolicy for OwnerOnly {
    const ALLOWED: &'static [UserRole] = &[UserRole::Owner];
}

pub struct UserOnly;

impl RolePolicy for UserOnly {
    const ALLOWED: &'static [UserRole] = &[UserRole::User];
}

pub struct AuthExtractor<T: AuthRepository>(pub UserAuthPayload, pub PhantomData<T>);

#[async_trait]
impl<T: AuthRepository + 'static, S: Send + Sync> FromRequestParts<S> for AuthExtractor<T> {
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = match parts.headers.get_mut(header::AUTHORIZATION) {
            Some(v) => {
                v.set_sensitive(true);
                v.to_str().or(Err(ApiError::AuthHeaderInvalid))?
            }
            None => return Err(ApiError::AuthHeaderMissing.into()),
        };

        if !auth_header.starts_with("Bearer ") || 10 > auth_header.len() {
            return Err(ApiError::AuthHeaderInvalid.into());
        }
        let (_, token) = auth_header.split_at(7);

        let repo = parts.extensions.get::<T>().ok_or_else(|| {
            let t_name = type_name::<T>();

            tracing::error!(
                type_name = t_name,
                "Failed to get AuthRepository impl request extension"
            );

            ApiError::ServicePanicked(Some(format!("Failed to get '{t_name}' request extension")))
        })?;

        let payload = repo.auth_user(token.to_string()).await?;

        Ok(Self(payload, PhantomData))
    }
}

pub struct RoleExtractor<P: RolePolicy, T: AuthRepository>(
    pub UserAuthPayload,
    pub PhantomData<(P, T)>,
);

#[async_trait]
impl<P, T, S> FromRequestParts<S> for RoleExtractor<P, T>
where
    P: RolePolicy + 'static,
    T: AuthRepository + 'static,
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthExtractor(payload, _) = AuthExtractor::<T>::from_request_parts(parts, state).await?;

        if !P::allows(&payload.role) {
            return Err(ApiError::RoleForbidden.into());
        }

        Ok(Self(payload, PhantomData))
    }
}
