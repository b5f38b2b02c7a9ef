use super::{
    models::{validate_rating, Rating, RatingCreateData, RatingUpdateData},
    repository::RatingRepository,
};
use crate::{
    auth::models::UserAuthPayload, errors::ApiError, http::DataResponse,
    store::repository::StoreRepository,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreIdPathParams {
    pub store_id: Uuid,
}

pub struct RatingHandlers<R: RatingRepository, S: StoreRepository> {
    rating_repo: R,
    store_repo: S,
}

impl<R: RatingRepository, S: StoreRepository> RatingHandlers<R, S> {
    pub fn new(rating_repo: R, store_repo: S) -> Self {
        Self {
            rating_repo,
            store_repo,
        }
    }

    /// First rating for a store. Correcting a rating goes through
    /// `handle_update`; a second submit for the same pair is a conflict.
    pub async fn handle_submit(
        &self,
        auth: UserAuthPayload,
        body: RatingCreateData,
    ) -> Result<DataResponse<Rating>, ApiError> {
        validate_rating(body.rating)?;

        self.store_repo
            .get_by_id(body.store_id)
            .await?
            .ok_or(ApiError::StoreNotFound)?;

        let existing = self
            .rating_repo
            .get_by_user_store(auth.sub, body.store_id)
            .await?;
        if existing.is_some() {
            return Err(ApiError::AlreadyRated);
        }

        let rating = self
            .rating_repo
            .create(auth.sub, body.store_id, body.rating)
            .await?;

        Ok(DataResponse::created(rating))
    }

    /// Keyed on the authenticated principal, so a caller can only ever
    /// touch their own row.
    pub async fn handle_update(
        &self,
        auth: UserAuthPayload,
        path: StoreIdPathParams,
        body: RatingUpdateData,
    ) -> Result<DataResponse<Rating>, ApiError> {
        validate_rating(body.rating)?;

        let rating = self
            .rating_repo
            .update(auth.sub, path.store_id, body.rating)
            .await?;

        Ok(rating.into())
    }
}
