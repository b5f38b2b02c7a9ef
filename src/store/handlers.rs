use super::{
    models::{Store, StoreCreateData, StoreListEntry, StoreWithAverage},
    repository::StoreRepository,
};
use crate::{
    auth::models::UserAuthPayload,
    errors::ApiError,
    http::{ApiResponder, DataResponse},
    query::StoreSearch,
    rating::{aggregate, models::Rating, repository::RatingRepository},
    user::{models::UserRole, repository::UserRepository},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreIdPathParams {
    pub store_id: Uuid,
}

/// One rating row on the owner dashboard, with the author's display data.
#[derive(Debug, Serialize)]
pub struct StoreRatingEntry {
    pub id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StoreRatingsReport {
    pub store: StoreWithAverage,
    pub ratings: Vec<StoreRatingEntry>,
}

impl ApiResponder for StoreRatingsReport {
    fn unit() -> &'static str {
        "store ratings report"
    }
    fn article() -> &'static str {
        "A"
    }
}

pub struct StoreHandlers<S, R, U>
where
    S: StoreRepository,
    R: RatingRepository,
    U: UserRepository,
{
    store_repo: S,
    rating_repo: R,
    user_repo: U,
}

impl<S, R, U> StoreHandlers<S, R, U>
where
    S: StoreRepository,
    R: RatingRepository,
    U: UserRepository,
{
    pub fn new(store_repo: S, rating_repo: R, user_repo: U) -> Self {
        Self {
            store_repo,
            rating_repo,
            user_repo,
        }
    }

    pub async fn handle_create(
        &self,
        body: StoreCreateData,
    ) -> Result<DataResponse<Store>, ApiError> {
        body.validate()?;

        if self
            .store_repo
            .get_by_email(body.email.clone())
            .await?
            .is_some()
        {
            return Err(ApiError::StoreEmailTaken);
        }

        if let Some(owner_id) = body.owner_id {
            let owner = self
                .user_repo
                .get_by_id(owner_id)
                .await?
                .ok_or(ApiError::InvalidStoreOwner)?;

            if owner.role != UserRole::Owner {
                return Err(ApiError::InvalidStoreOwner);
            }
        }

        let store = self.store_repo.create(body).await?;

        Ok(DataResponse::created(store))
    }

    pub async fn handle_get_stores(
        &self,
        auth: UserAuthPayload,
        query: StoreSearch,
    ) -> Result<DataResponse<Vec<StoreListEntry>>, ApiError> {
        let stores = self.store_repo.search(query.search).await?;

        let ids = stores.iter().map(|s| s.id).collect();
        let mut by_store = group_by_store(self.rating_repo.list_for_stores(ids).await?);

        let entries = stores
            .into_iter()
            .map(|store| {
                let ratings = by_store.remove(&store.id).unwrap_or_default();
                let values: Vec<i16> = ratings.iter().map(|r| r.rating).collect();
                let your_rating = ratings
                    .iter()
                    .find(|r| r.user_id == auth.sub)
                    .map(|r| r.rating);

                StoreListEntry {
                    id: store.id,
                    name: store.name,
                    email: store.email,
                    address: store.address,
                    image_url: store.image_url,
                    average_rating: aggregate::average(&values),
                    your_rating,
                }
            })
            .collect::<Vec<_>>();

        Ok(entries.into())
    }

    /// Owner dashboard. The coarse role gate has already passed; the
    /// ownership check against the resolved store happens here.
    pub async fn handle_store_ratings(
        &self,
        auth: UserAuthPayload,
        path: StoreIdPathParams,
    ) -> Result<DataResponse<StoreRatingsReport>, ApiError> {
        let store = self
            .store_repo
            .get_by_id(path.store_id)
            .await?
            .ok_or(ApiError::StoreNotFound)?;

        if store.owner_id != Some(auth.sub) {
            return Err(ApiError::StoreAccessDenied);
        }

        let ratings = self.rating_repo.list_for_store(store.id).await?;
        let values: Vec<i16> = ratings.iter().map(|r| r.rating).collect();

        let mut entries = Vec::with_capacity(ratings.len());
        for rating in ratings {
            let user = match self.user_repo.get_by_id(rating.user_id).await? {
                Some(v) => v,
                None => {
                    tracing::warn!(
                        rating_id = rating.id.to_string(),
                        user_id = rating.user_id.to_string(),
                        "Rating references a missing user, skipping the entry"
                    );
                    continue;
                }
            };

            entries.push(StoreRatingEntry {
                id: rating.id,
                user_name: user.name,
                user_email: user.email,
                rating: rating.rating,
                created_at: rating.created_at,
            });
        }

        Ok(StoreRatingsReport {
            store: StoreWithAverage::new(store, aggregate::average(&values)),
            ratings: entries,
        }
        .into())
    }
}

pub(crate) fn group_by_store(ratings: Vec<Rating>) -> HashMap<Uuid, Vec<Rating>> {
    let mut by_store: HashMap<Uuid, Vec<Rating>> = HashMap::new();

    for rating in ratings {
        by_store.entry(rating.store_id).or_default().push(rating);
    }

    by_store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rating::memory_repository::InMemoryRatingRepository,
        store::memory_repository::InMemoryStoreRepository,
        user::{
            memory_repository::InMemoryUserRepository,
            models::{User, UserCreateData},
        },
    };

    type TestHandlers =
        StoreHandlers<InMemoryStoreRepository, InMemoryRatingRepository, InMemoryUserRepository>;

    fn handlers() -> TestHandlers {
        StoreHandlers::new(
            InMemoryStoreRepository::new(),
            InMemoryRatingRepository::new(),
            InMemoryUserRepository::new(4),
        )
    }

    fn store_body(name: &str, email: &str, owner_id: Option<Uuid>) -> StoreCreateData {
        StoreCreateData {
            name: name.into(),
            email: email.into(),
            address: Some("221B Baker Street".into()),
            image_url: None,
            owner_id,
        }
    }

    async fn seed_user(handlers: &TestHandlers, role: UserRole, email: &str) -> User {
        handlers
            .user_repo
            .create(UserCreateData {
                name: "A name long enough to register".into(),
                email: email.into(),
                password: "Sup3rS3cret!".into(),
                address: None,
                role,
            })
            .await
            .unwrap()
    }

    fn principal_of(user: &User) -> UserAuthPayload {
        UserAuthPayload::from_user(user, 3600)
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email_and_bad_owner() {
        let handlers = handlers();

        handlers
            .handle_create(store_body("Baker Street Groceries", "store@example.com", None))
            .await
            .unwrap();

        let err = handlers
            .handle_create(store_body("Another Grocer", "store@example.com", None))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::StoreEmailTaken));

        // unknown owner id
        let err = handlers
            .handle_create(store_body(
                "Owned Grocer",
                "owned@example.com",
                Some(Uuid::new_v4()),
            ))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::InvalidStoreOwner));

        // existing user, but not an owner
        let plain = seed_user(&handlers, UserRole::User, "plain@example.com").await;
        let err = handlers
            .handle_create(store_body(
                "Owned Grocer",
                "owned@example.com",
                Some(plain.id),
            ))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::InvalidStoreOwner));

        let owner = seed_user(&handlers, UserRole::Owner, "owner@example.com").await;
        handlers
            .handle_create(store_body(
                "Owned Grocer",
                "owned@example.com",
                Some(owner.id),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_listing_reports_average_and_own_rating() {
        let handlers = handlers();

        let rated = handlers
            .handle_create(store_body("Baker Street Groceries", "store@example.com", None))
            .await
            .unwrap()
            .data;
        let unrated = handlers
            .handle_create(store_body("Empty Shelves", "empty@example.com", None))
            .await
            .unwrap()
            .data;

        let caller = seed_user(&handlers, UserRole::User, "caller@example.com").await;
        let other = seed_user(&handlers, UserRole::User, "other@example.com").await;

        handlers
            .rating_repo
            .create(caller.id, rated.id, 3)
            .await
            .unwrap();
        handlers
            .rating_repo
            .create(other.id, rated.id, 5)
            .await
            .unwrap();

        let listing = handlers
            .handle_get_stores(principal_of(&caller), StoreSearch { search: None })
            .await
            .unwrap()
            .data;
        assert_eq!(listing.len(), 2);

        let rated_entry = listing.iter().find(|e| e.id == rated.id).unwrap();
        assert_eq!(rated_entry.average_rating.as_deref(), Some("4.00"));
        assert_eq!(rated_entry.your_rating, Some(3));

        let unrated_entry = listing.iter().find(|e| e.id == unrated.id).unwrap();
        assert_eq!(unrated_entry.average_rating, None);
        assert_eq!(unrated_entry.your_rating, None);
    }

    #[tokio::test]
    async fn test_search_matches_name_or_address_case_insensitively() {
        let handlers = handlers();
        let caller = seed_user(&handlers, UserRole::User, "caller@example.com").await;

        handlers
            .handle_create(store_body("Baker Street Groceries", "store@example.com", None))
            .await
            .unwrap();
        handlers
            .handle_create(StoreCreateData {
                name: "Corner Cafe".into(),
                email: "cafe@example.com".into(),
                address: Some("12 Hilltop Road".into()),
                image_url: None,
                owner_id: None,
            })
            .await
            .unwrap();

        let by_name = handlers
            .handle_get_stores(
                principal_of(&caller),
                StoreSearch {
                    search: Some("BAKER".into()),
                },
            )
            .await
            .unwrap()
            .data;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Baker Street Groceries");

        let by_address = handlers
            .handle_get_stores(
                principal_of(&caller),
                StoreSearch {
                    search: Some("hilltop".into()),
                },
            )
            .await
            .unwrap()
            .data;
        assert_eq!(by_address.len(), 1);
        assert_eq!(by_address[0].name, "Corner Cafe");
    }

    #[tokio::test]
    async fn test_dashboard_is_scoped_to_the_owning_principal() {
        let handlers = handlers();

        let owner = seed_user(&handlers, UserRole::Owner, "owner@example.com").await;
        let intruder = seed_user(&handlers, UserRole::Owner, "intruder@example.com").await;

        let store = handlers
            .handle_create(store_body(
                "Baker Street Groceries",
                "store@example.com",
                Some(owner.id),
            ))
            .await
            .unwrap()
            .data;

        let rater = seed_user(&handlers, UserRole::User, "rater@example.com").await;
        handlers
            .rating_repo
            .create(rater.id, store.id, 3)
            .await
            .unwrap();
        let other_rater = seed_user(&handlers, UserRole::User, "other@example.com").await;
        handlers
            .rating_repo
            .create(other_rater.id, store.id, 5)
            .await
            .unwrap();

        // right role, wrong owner
        let err = handlers
            .handle_store_ratings(
                principal_of(&intruder),
                StoreIdPathParams { store_id: store.id },
            )
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::StoreAccessDenied));

        let err = handlers
            .handle_store_ratings(
                principal_of(&owner),
                StoreIdPathParams {
                    store_id: Uuid::new_v4(),
                },
            )
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::StoreNotFound));

        let report = handlers
            .handle_store_ratings(
                principal_of(&owner),
                StoreIdPathParams { store_id: store.id },
            )
            .await
            .unwrap()
            .data;

        assert_eq!(report.store.average_rating.as_deref(), Some("4.00"));
        assert_eq!(report.ratings.len(), 2);
        assert!(report
            .ratings
            .iter()
            .any(|r| r.user_email == "rater@example.com" && r.rating == 3));
    }
}
