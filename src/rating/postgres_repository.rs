use super::{models::Rating, repository::RatingRepository};
use crate::errors::ApiError;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// The `(user_id, store_id)` unique constraint in the schema backs the
/// ledger invariant; a concurrent duplicate insert surfaces as a unique
/// violation and is re-mapped, never leaked raw.
#[derive(Clone)]
pub struct PostgresRatingRepository {
    pool: Pool<Postgres>,
}

impl PostgresRatingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for PostgresRatingRepository {
    async fn get_by_user_store(
        &self,
        user_id: Uuid,
        store_id: Uuid,
    ) -> Result<Option<Rating>, ApiError> {
        let res = sqlx::query_as(
            r#"SELECT * FROM "ratings" WHERE "user_id" = $1 AND "store_id" = $2"#,
        )
        .bind(user_id)
        .bind(store_id)
        .fetch_one(&self.pool)
        .await;

        match res {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                if matches!(e, sqlx::Error::RowNotFound) {
                    Ok(None)
                } else {
                    tracing::error!(
                        error = e.to_string(),
                        method = "get_by_user_store",
                        "PostgresRatingRepository sqlx error"
                    );

                    Err(ApiError::SqlxError)
                }
            }
        }
    }

    async fn create(
        &self,
        user_id: Uuid,
        store_id: Uuid,
        rating: i16,
    ) -> Result<Rating, ApiError> {
        let id = Uuid::new_v4();

        sqlx::query_as(
            r#"INSERT INTO "ratings"
            ("id", "user_id", "store_id", "rating")
            VALUES ($1, $2, $3, $4)
            RETURNING *"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(store_id)
        .bind(rating)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => ApiError::AlreadyRated,
            Some(db_err) if db_err.is_foreign_key_violation() => ApiError::StoreNotFound,
            _ => {
                tracing::error!(
                    error = e.to_string(),
                    method = "create",
                    "PostgresRatingRepository sqlx error"
                );

                ApiError::SqlxError
            }
        })
    }

    async fn update(
        &self,
        user_id: Uuid,
        store_id: Uuid,
        rating: i16,
    ) -> Result<Rating, ApiError> {
        sqlx::query_as(
            r#"UPDATE "ratings" SET "rating" = $3
            WHERE "user_id" = $1 AND "store_id" = $2
            RETURNING *"#,
        )
        .bind(user_id)
        .bind(store_id)
        .bind(rating)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if matches!(e, sqlx::Error::RowNotFound) {
                ApiError::RatingNotFound
            } else {
                tracing::error!(
                    error = e.to_string(),
                    method = "update",
                    "PostgresRatingRepository sqlx error"
                );

                ApiError::SqlxError
            }
        })
    }

    async fn list_for_store(&self, store_id: Uuid) -> Result<Vec<Rating>, ApiError> {
        sqlx::query_as(
            r#"SELECT * FROM "ratings" WHERE "store_id" = $1 ORDER BY "created_at" ASC"#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                error = e.to_string(),
                method = "list_for_store",
                "PostgresRatingRepository sqlx error"
            );

            ApiError::SqlxError
        })
    }

    async fn list_for_stores(&self, store_ids: Vec<Uuid>) -> Result<Vec<Rating>, ApiError> {
        sqlx::query_as(r#"SELECT * FROM "ratings" WHERE "store_id" = ANY($1)"#)
            .bind(store_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    method = "list_for_stores",
                    "PostgresRatingRepository sqlx error"
                );

                ApiError::SqlxError
            })
    }

    async fn count(&self) -> Result<u64, ApiError> {
        sqlx::query_scalar::<Postgres, i64>(r#"SELECT COUNT(*) FROM "ratings""#)
            .fetch_one(&self.pool)
            .await
            .map(|v| v as u64)
            .map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    method = "count",
                    "PostgresRatingRepository sqlx error"
                );

                ApiError::SqlxError
            })
    }
}
