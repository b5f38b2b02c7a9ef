use crate::user::models::{User, UserRole};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verified principal carried by every authenticated request. Derived from
/// the signed token; never trusted from request bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAuthPayload {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: u64,
    pub iat: u64,
}

impl UserAuthPayload {
    #[inline]
    pub fn from_user(user: &User, duration: u64) -> Self {
        Self::new(user.id, user.email.clone(), user.role.clone(), duration)
    }

    pub fn new(user_id: Uuid, email: String, role: UserRole, duration: u64) -> Self {
        let now: u64 = Utc::now()
            .timestamp()
            .try_into()
            .expect("Failed to convert an unix timestamp integer type");

        Self {
            sub: user_id,
            email,
            role,
            exp: now + duration,
            iat: now,
        }
    }
}
