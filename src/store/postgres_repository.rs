use super::{
    models::{Store, StoreCreateData},
    repository::StoreRepository,
};
use crate::{errors::ApiError, query::StoreFilter};
use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresStoreRepository {
    pool: Pool<Postgres>,
}

impl PostgresStoreRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PostgresStoreRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Store>, ApiError> {
        let res = sqlx::query_as(r#"SELECT * FROM "stores" WHERE "id" = $1"#)
            .bind(id)
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
                        method = "get_by_id",
                        "PostgresStoreRepository sqlx error"
                    );

                    Err(ApiError::SqlxError)
                }
            }
        }
    }

    async fn get_by_email(&self, email: String) -> Result<Option<Store>, ApiError> {
        let res = sqlx::query_as(r#"SELECT * FROM "stores" WHERE "email" = $1"#)
            .bind(email)
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
                        method = "get_by_email",
                        "PostgresStoreRepository sqlx error"
                    );

                    Err(ApiError::SqlxError)
                }
            }
        }
    }

    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Vec<Store>, ApiError> {
        sqlx::query_as(
            r#"SELECT * FROM "stores" WHERE "owner_id" = $1 ORDER BY "created_at" ASC"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                error = e.to_string(),
                method = "get_by_owner",
                "PostgresStoreRepository sqlx error"
            );

            ApiError::SqlxError
        })
    }

    async fn create(&self, data: StoreCreateData) -> Result<Store, ApiError> {
        let id = Uuid::new_v4();

        sqlx::query_as(
            r#"INSERT INTO "stores"
            ("id", "name", "email", "address", "image_url", "owner_id")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *"#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.address)
        .bind(data.image_url)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => ApiError::StoreEmailTaken,
            _ => {
                tracing::error!(
                    error = e.to_string(),
                    method = "create",
                    "PostgresStoreRepository sqlx error"
                );

                ApiError::SqlxError
            }
        })
    }

    async fn search(&self, term: Option<String>) -> Result<Vec<Store>, ApiError> {
        let res = match term.filter(|t| !t.is_empty()) {
            Some(term) => {
                sqlx::query_as(
                    r#"SELECT * FROM "stores"
                    WHERE "name" ILIKE $1 OR "address" ILIKE $1
                    ORDER BY "name" ASC"#,
                )
                .bind(format!("%{term}%"))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(r#"SELECT * FROM "stores" ORDER BY "name" ASC"#)
                    .fetch_all(&self.pool)
                    .await
            }
        };

        res.map_err(|e| {
            tracing::error!(
                error = e.to_string(),
                method = "search",
                "PostgresStoreRepository sqlx error"
            );

            ApiError::SqlxError
        })
    }

    async fn list(&self, filter: StoreFilter) -> Result<Vec<Store>, ApiError> {
        let mut qb = QueryBuilder::<Postgres>::new(r#"SELECT * FROM "stores" WHERE TRUE"#);

        if let Some(name) = filter.name {
            qb.push(r#" AND "name" ILIKE "#);
            qb.push_bind(format!("%{name}%"));
        }
        if let Some(email) = filter.email {
            qb.push(r#" AND "email" ILIKE "#);
            qb.push_bind(format!("%{email}%"));
        }
        if let Some(address) = filter.address {
            qb.push(r#" AND "address" ILIKE "#);
            qb.push_bind(format!("%{address}%"));
        }

        // sort_by deserialized from a closed set, column() is a fixed literal
        qb.push(format!(
            r#" ORDER BY "{}" {}"#,
            filter.sort_by.column(),
            filter.order.sql()
        ));

        qb.build_query_as().fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!(
                error = e.to_string(),
                method = "list",
                "PostgresStoreRepository sqlx error"
            );

            ApiError::SqlxError
        })
    }

    async fn count(&self) -> Result<u64, ApiError> {
        sqlx::query_scalar::<Postgres, i64>(r#"SELECT COUNT(*) FROM "stores""#)
            .fetch_one(&self.pool)
            .await
            .map(|v| v as u64)
            .map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    method = "count",
                    "PostgresStoreRepository sqlx error"
                );

                ApiError::SqlxError
            })
    }
}
