use super::{
    models::{User, UserCreateData},
    repository::UserRepository,
};
use crate::{
    errors::ApiError,
    query::{contains_ci, SortOrder, UserFilter, UserSortField},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::{sync::Mutex, task::spawn_blocking};
use uuid::Uuid;

#[derive(Clone)]
pub struct InMemoryUserRepository {
    map: Arc<Mutex<HashMap<Uuid, User>>>,
    bcrypt_cost: u32,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self {
            map: Default::default(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl InMemoryUserRepository {
    #[inline]
    pub fn new(bcrypt_cost: u32) -> Self {
        Self {
            map: Arc::new(Mutex::new(HashMap::new())),
            bcrypt_cost,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let lock = self.map.lock().await;

        Ok(lock.get(&id).cloned())
    }

    async fn get_by_email(&self, email: String) -> Result<Option<User>, ApiError> {
        let lock = self.map.lock().await;

        for (_, u) in lock.iter() {
            if u.email == email {
                return Ok(Some(u.clone()));
            }
        }
        drop(lock);

        Ok(None)
    }

    async fn create(&self, data: UserCreateData) -> Result<User, ApiError> {
        if self.get_by_email(data.email.clone()).await?.is_some() {
            return Err(ApiError::EmailTaken);
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let bcrypt_cost = self.bcrypt_cost;

        let password = spawn_blocking(move || bcrypt::hash(data.password, bcrypt_cost))
            .await
            .map_err(|e| {
                tracing::error!(error = e.to_string(), "Failed to spawn blocking");
                ApiError::AuthBcryptHashFailed
            })?
            .map_err(|e| {
                tracing::error!(
                    user_id = id.to_string(),
                    error = e.to_string(),
                    "Failed to hash password while creating user"
                );
                ApiError::AuthBcryptHashFailed
            })?;

        let user = User {
            id,
            created_at: now,
            updated_at: now,
            name: data.name,
            email: data.email,
            address: data.address,
            role: data.role,
            password,
        };

        let mut lock = self.map.lock().await;
        lock.insert(id, user.clone());
        drop(lock);

        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password: String) -> Result<(), ApiError> {
        let bcrypt_cost = self.bcrypt_cost;

        let password = spawn_blocking(move || bcrypt::hash(password, bcrypt_cost))
            .await
            .map_err(|e| {
                tracing::error!(error = e.to_string(), "Failed to spawn blocking");
                ApiError::AuthBcryptHashFailed
            })?
            .map_err(|e| {
                tracing::error!(
                    user_id = id.to_string(),
                    error = e.to_string(),
                    "Failed to hash password while updating user"
                );
                ApiError::AuthBcryptHashFailed
            })?;

        let mut lock = self.map.lock().await;

        let user = lock.get_mut(&id).ok_or(ApiError::UserNotFound)?;
        user.password = password;
        user.updated_at = Utc::now();
        drop(lock);

        Ok(())
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>, ApiError> {
        let lock = self.map.lock().await;

        let mut users: Vec<User> = lock
            .values()
            .filter(|u| {
                filter
                    .name
                    .as_deref()
                    .map_or(true, |t| contains_ci(&u.name, t))
                    && filter
                        .email
                        .as_deref()
                        .map_or(true, |t| contains_ci(&u.email, t))
                    && filter.address.as_deref().map_or(true, |t| {
                        u.address.as_deref().is_some_and(|a| contains_ci(a, t))
                    })
                    && filter.role.as_ref().map_or(true, |r| u.role == *r)
            })
            .cloned()
            .collect();
        drop(lock);

        users.sort_by(|a, b| {
            let ord = match filter.sort_by {
                UserSortField::Name => a.name.cmp(&b.name),
                UserSortField::Email => a.email.cmp(&b.email),
                UserSortField::Role => a.role.as_str().cmp(b.role.as_str()),
                UserSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };

            match filter.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        Ok(users)
    }

    async fn count(&self) -> Result<u64, ApiError> {
        let lock = self.map.lock().await;

        Ok(lock.len() as u64)
    }
}
