use crate::{
    errors::ApiError,
    http::{ApiResponder, DataResponse},
    query::{StoreFilter, UserFilter},
    rating::{aggregate, repository::RatingRepository},
    store::{handlers::group_by_store, models::StoreWithAverage, repository::StoreRepository},
    user::{
        models::{User, UserCreateData, UserRole},
        repository::UserRepository,
    },
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct StatsResponseBody {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
}

impl ApiResponder for StatsResponseBody {
    fn unit() -> &'static str {
        "platform stats payload"
    }
    fn article() -> &'static str {
        "A"
    }
}

#[derive(Debug, Serialize)]
pub struct OwnedStoreSummary {
    pub id: Uuid,
    pub name: String,
    pub average_rating: Option<String>,
}

/// User as listed for administrators. `stores` is attached for owner-role
/// users only: every store they own with its read-time average.
#[derive(Debug, Serialize)]
pub struct AdminUserEntry {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stores: Option<Vec<OwnedStoreSummary>>,
}

impl ApiResponder for AdminUserEntry {
    fn unit() -> &'static str {
        "user"
    }
    fn article() -> &'static str {
        "A"
    }
}

pub struct AdminHandlers<U, S, R>
where
    U: UserRepository,
    S: StoreRepository,
    R: RatingRepository,
{
    user_repo: U,
    store_repo: S,
    rating_repo: R,
}

impl<U, S, R> AdminHandlers<U, S, R>
where
    U: UserRepository,
    S: StoreRepository,
    R: RatingRepository,
{
    pub fn new(user_repo: U, store_repo: S, rating_repo: R) -> Self {
        Self {
            user_repo,
            store_repo,
            rating_repo,
        }
    }

    pub async fn handle_stats(&self) -> Result<DataResponse<StatsResponseBody>, ApiError> {
        let total_users = self.user_repo.count().await?;
        let total_stores = self.store_repo.count().await?;
        let total_ratings = self.rating_repo.count().await?;

        Ok(StatsResponseBody {
            total_users,
            total_stores,
            total_ratings,
        }
        .into())
    }

    pub async fn handle_list_users(
        &self,
        filter: UserFilter,
    ) -> Result<DataResponse<Vec<AdminUserEntry>>, ApiError> {
        let users = self.user_repo.list(filter).await?;

        let mut entries = Vec::with_capacity(users.len());
        for user in users {
            let stores = if user.role == UserRole::Owner {
                Some(self.owned_store_summaries(user.id).await?)
            } else {
                None
            };

            entries.push(AdminUserEntry { user, stores });
        }

        Ok(entries.into())
    }

    pub async fn handle_list_stores(
        &self,
        filter: StoreFilter,
    ) -> Result<DataResponse<Vec<StoreWithAverage>>, ApiError> {
        let stores = self.store_repo.list(filter).await?;

        let ids = stores.iter().map(|s| s.id).collect();
        let mut by_store = group_by_store(self.rating_repo.list_for_stores(ids).await?);

        let entries = stores
            .into_iter()
            .map(|store| {
                let values: Vec<i16> = by_store
                    .remove(&store.id)
                    .unwrap_or_default()
                    .iter()
                    .map(|r| r.rating)
                    .collect();

                StoreWithAverage::new(store, aggregate::average(&values))
            })
            .collect::<Vec<_>>();

        Ok(entries.into())
    }

    pub async fn handle_create_user(
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

    async fn owned_store_summaries(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<OwnedStoreSummary>, ApiError> {
        let stores = self.store_repo.get_by_owner(owner_id).await?;

        let ids = stores.iter().map(|s| s.id).collect();
        let mut by_store = group_by_store(self.rating_repo.list_for_stores(ids).await?);

        Ok(stores
            .into_iter()
            .map(|store| {
                let values: Vec<i16> = by_store
                    .remove(&store.id)
                    .unwrap_or_default()
                    .iter()
                    .map(|r| r.rating)
                    .collect();

                OwnedStoreSummary {
                    id: store.id,
                    name: store.name,
                    average_rating: aggregate::average(&values),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        query::{SortOrder, StoreSortField, UserSortField},
        rating::memory_repository::InMemoryRatingRepository,
        store::{memory_repository::InMemoryStoreRepository, models::StoreCreateData},
        user::memory_repository::InMemoryUserRepository,
    };

    type TestHandlers =
        AdminHandlers<InMemoryUserRepository, InMemoryStoreRepository, InMemoryRatingRepository>;

    fn handlers() -> TestHandlers {
        AdminHandlers::new(
            InMemoryUserRepository::new(4),
            InMemoryStoreRepository::new(),
            InMemoryRatingRepository::new(),
        )
    }

    fn user_body(name: &str, email: &str, role: UserRole) -> UserCreateData {
        UserCreateData {
            name: name.into(),
            email: email.into(),
            password: "Sup3rS3cret!".into(),
            address: Some("221B Baker Street".into()),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_user_applies_signup_validation() {
        let handlers = handlers();

        let err = handlers
            .handle_create_user(user_body(&"a".repeat(19), "short@example.com", UserRole::User))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::InvalidName));

        let created = handlers
            .handle_create_user(user_body(
                &"a".repeat(20),
                "exact@example.com",
                UserRole::User,
            ))
            .await
            .unwrap();
        assert_eq!(created.data.name.len(), 20);
    }

    #[tokio::test]
    async fn test_stats_report_cardinalities() {
        let handlers = handlers();

        let user = handlers
            .handle_create_user(user_body(
                "A name long enough to register",
                "rater@example.com",
                UserRole::User,
            ))
            .await
            .unwrap()
            .data;

        let store = handlers
            .store_repo
            .create(StoreCreateData {
                name: "Baker Street Groceries".into(),
                email: "store@example.com".into(),
                address: None,
                image_url: None,
                owner_id: None,
            })
            .await
            .unwrap();

        handlers
            .rating_repo
            .create(user.id, store.id, 5)
            .await
            .unwrap();

        let stats = handlers.handle_stats().await.unwrap().data;
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_stores, 1);
        assert_eq!(stats.total_ratings, 1);
    }

    #[tokio::test]
    async fn test_list_users_filters_and_enriches_owners() {
        let handlers = handlers();

        let owner = handlers
            .handle_create_user(user_body(
                "Propriétaire with a long name",
                "owner@example.com",
                UserRole::Owner,
            ))
            .await
            .unwrap()
            .data;
        let rater = handlers
            .handle_create_user(user_body(
                "A name long enough to register",
                "rater@example.com",
                UserRole::User,
            ))
            .await
            .unwrap()
            .data;

        let store = handlers
            .store_repo
            .create(StoreCreateData {
                name: "Baker Street Groceries".into(),
                email: "store@example.com".into(),
                address: None,
                image_url: None,
                owner_id: Some(owner.id),
            })
            .await
            .unwrap();
        handlers
            .rating_repo
            .create(rater.id, store.id, 3)
            .await
            .unwrap();

        // role filter narrows to the owner, enriched with the store average
        let owners = handlers
            .handle_list_users(UserFilter {
                role: Some(UserRole::Owner),
                ..Default::default()
            })
            .await
            .unwrap()
            .data;
        assert_eq!(owners.len(), 1);

        let stores = owners[0].stores.as_ref().unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].average_rating.as_deref(), Some("3.00"));

        // non-owners carry no store enrichment
        let all = handlers
            .handle_list_users(UserFilter::default())
            .await
            .unwrap()
            .data;
        let rater_entry = all.iter().find(|e| e.user.id == rater.id).unwrap();
        assert!(rater_entry.stores.is_none());

        // case-insensitive name filter
        let filtered = handlers
            .handle_list_users(UserFilter {
                name: Some("PROPRIÉTAIRE".into()),
                ..Default::default()
            })
            .await
            .unwrap()
            .data;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].user.id, owner.id);
    }

    #[tokio::test]
    async fn test_list_users_sorts_by_allow_listed_fields() {
        let handlers = handlers();

        handlers
            .handle_create_user(user_body(
                "Zebra-named account for sorting",
                "zebra@example.com",
                UserRole::User,
            ))
            .await
            .unwrap();
        handlers
            .handle_create_user(user_body(
                "Aardvark-named account sorting",
                "aardvark@example.com",
                UserRole::User,
            ))
            .await
            .unwrap();

        let users = handlers
            .handle_list_users(UserFilter {
                sort_by: UserSortField::Name,
                order: SortOrder::Desc,
                ..Default::default()
            })
            .await
            .unwrap()
            .data;

        assert!(users[0].user.name.starts_with("Zebra"));
        assert!(users[1].user.name.starts_with("Aardvark"));
    }

    #[tokio::test]
    async fn test_list_stores_reports_averages() {
        let handlers = handlers();

        let rated = handlers
            .store_repo
            .create(StoreCreateData {
                name: "Baker Street Groceries".into(),
                email: "store@example.com".into(),
                address: None,
                image_url: None,
                owner_id: None,
            })
            .await
            .unwrap();
        handlers
            .store_repo
            .create(StoreCreateData {
                name: "Empty Shelves".into(),
                email: "empty@example.com".into(),
                address: None,
                image_url: None,
                owner_id: None,
            })
            .await
            .unwrap();

        handlers
            .rating_repo
            .create(Uuid::new_v4(), rated.id, 3)
            .await
            .unwrap();
        handlers
            .rating_repo
            .create(Uuid::new_v4(), rated.id, 5)
            .await
            .unwrap();

        let stores = handlers
            .handle_list_stores(StoreFilter {
                sort_by: StoreSortField::Name,
                ..Default::default()
            })
            .await
            .unwrap()
            .data;

        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].average_rating.as_deref(), Some("4.00"));
        assert_eq!(stores[1].average_rating, None);

        let filtered = handlers
            .handle_list_stores(StoreFilter {
                email: Some("EMPTY@".into()),
                ..Default::default()
            })
            .await
            .unwrap()
            .data;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Empty Shelves");
    }
}
