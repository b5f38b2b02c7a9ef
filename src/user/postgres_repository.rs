use super::{
    models::{User, UserCreateData},
    repository::UserRepository,
};
use crate::{errors::ApiError, query::UserFilter};
use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use tokio::task::spawn_blocking;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: Pool<Postgres>,
    bcrypt_cost: u32,
}

impl PostgresUserRepository {
    pub fn new(pool: Pool<Postgres>, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let res = sqlx::query_as(r#"SELECT * FROM "users" WHERE "id" = $1"#)
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
                        "PostgresUserRepository sqlx error"
                    );

                    Err(ApiError::SqlxError)
                }
            }
        }
    }

    async fn get_by_email(&self, email: String) -> Result<Option<User>, ApiError> {
        let res = sqlx::query_as(r#"SELECT * FROM "users" WHERE "email" = $1"#)
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
                        "PostgresUserRepository sqlx error"
                    );

                    Err(ApiError::SqlxError)
                }
            }
        }
    }

    async fn create(&self, data: UserCreateData) -> Result<User, ApiError> {
        let id = Uuid::new_v4();

        let cost = self.bcrypt_cost;
        let password = data.password;
        let password = spawn_blocking(move || {
            bcrypt::hash(password, cost).map_err(|e| {
                tracing::error!(
                    user_id = id.to_string(),
                    error = e.to_string(),
                    "Failed to hash password while creating user"
                );
                ApiError::AuthBcryptHashFailed
            })
        })
        .await
        .map_err(|e| {
            tracing::error!(error = e.to_string(), "Failed to spawn blocking");
            ApiError::AuthBcryptHashFailed
        })??;

        sqlx::query_as(
            r#"INSERT INTO "users"
            ("id", "name", "email", "address", "role", "password")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *"#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.address)
        .bind(data.role)
        .bind(password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => ApiError::EmailTaken,
            _ => {
                tracing::error!(
                    error = e.to_string(),
                    method = "create",
                    "PostgresUserRepository sqlx error"
                );

                ApiError::SqlxError
            }
        })
    }

    async fn update_password(&self, id: Uuid, password: String) -> Result<(), ApiError> {
        let cost = self.bcrypt_cost;
        let password = spawn_blocking(move || {
            bcrypt::hash(password, cost).map_err(|e| {
                tracing::error!(
                    user_id = id.to_string(),
                    error = e.to_string(),
                    "Failed to hash password while updating user"
                );
                ApiError::AuthBcryptHashFailed
            })
        })
        .await
        .map_err(|e| {
            tracing::error!(error = e.to_string(), "Failed to spawn blocking");
            ApiError::AuthBcryptHashFailed
        })??;

        let res = sqlx::query(
            r#"UPDATE "users" SET "password" = $2, "updated_at" = now() WHERE "id" = $1"#,
        )
        .bind(id)
        .bind(password)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                error = e.to_string(),
                method = "update_password",
                "PostgresUserRepository sqlx error"
            );

            ApiError::SqlxError
        })?;

        if res.rows_affected() == 0 {
            Err(ApiError::UserNotFound)
        } else {
            Ok(())
        }
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>, ApiError> {
        let mut qb = QueryBuilder::<Postgres>::new(r#"SELECT * FROM "users" WHERE TRUE"#);

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
        if let Some(role) = filter.role {
            qb.push(r#" AND "role" = "#);
            qb.push_bind(role);
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
                "PostgresUserRepository sqlx error"
            );

            ApiError::SqlxError
        })
    }

    async fn count(&self) -> Result<u64, ApiError> {
        sqlx::query_scalar::<Postgres, i64>(r#"SELECT COUNT(*) FROM "users""#)
            .fetch_one(&self.pool)
            .await
            .map(|v| v as u64)
            .map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    method = "count",
                    "PostgresUserRepository sqlx error"
                );

                ApiError::SqlxError
            })
    }
}
