use super::{
    models::{Store, StoreCreateData},
    repository::StoreRepository,
};
use crate::{
    errors::ApiError,
    query::{contains_ci, SortOrder, StoreFilter, StoreSortField},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryStoreRepository {
    map: Arc<Mutex<HashMap<Uuid, Store>>>,
}

impl InMemoryStoreRepository {
    #[inline]
    pub fn new() -> Self {
        Self {
            map: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl StoreRepository for InMemoryStoreRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Store>, ApiError> {
        let lock = self.map.lock().await;

        Ok(lock.get(&id).cloned())
    }

    async fn get_by_email(&self, email: String) -> Result<Option<Store>, ApiError> {
        let lock = self.map.lock().await;

        for (_, s) in lock.iter() {
            if s.email == email {
                return Ok(Some(s.clone()));
            }
        }
        drop(lock);

        Ok(None)
    }

    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Vec<Store>, ApiError> {
        let lock = self.map.lock().await;

        let mut stores: Vec<Store> = lock
            .values()
            .filter(|s| s.owner_id == Some(owner_id))
            .cloned()
            .collect();
        drop(lock);

        stores.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(stores)
    }

    async fn create(&self, data: StoreCreateData) -> Result<Store, ApiError> {
        if self.get_by_email(data.email.clone()).await?.is_some() {
            return Err(ApiError::StoreEmailTaken);
        }

        let now = Utc::now();

        let store = Store {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: data.name,
            email: data.email,
            address: data.address,
            image_url: data.image_url,
            owner_id: data.owner_id,
        };

        let mut lock = self.map.lock().await;
        lock.insert(store.id, store.clone());
        drop(lock);

        Ok(store)
    }

    async fn search(&self, term: Option<String>) -> Result<Vec<Store>, ApiError> {
        let lock = self.map.lock().await;

        let mut stores: Vec<Store> = lock
            .values()
            .filter(|s| {
                term.as_deref().map_or(true, |t| {
                    contains_ci(&s.name, t)
                        || s.address.as_deref().is_some_and(|a| contains_ci(a, t))
                })
            })
            .cloned()
            .collect();
        drop(lock);

        stores.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(stores)
    }

    async fn list(&self, filter: StoreFilter) -> Result<Vec<Store>, ApiError> {
        let lock = self.map.lock().await;

        let mut stores: Vec<Store> = lock
            .values()
            .filter(|s| {
                filter
                    .name
                    .as_deref()
                    .map_or(true, |t| contains_ci(&s.name, t))
                    && filter
                        .email
                        .as_deref()
                        .map_or(true, |t| contains_ci(&s.email, t))
                    && filter.address.as_deref().map_or(true, |t| {
                        s.address.as_deref().is_some_and(|a| contains_ci(a, t))
                    })
            })
            .cloned()
            .collect();
        drop(lock);

        stores.sort_by(|a, b| {
            let ord = match filter.sort_by {
                StoreSortField::Name => a.name.cmp(&b.name),
                StoreSortField::Email => a.email.cmp(&b.email),
                StoreSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };

            match filter.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        Ok(stores)
    }

    async fn count(&self) -> Result<u64, ApiError> {
        let lock = self.map.lock().await;

        Ok(lock.len() as u64)
    }
}
