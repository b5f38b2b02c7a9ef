mod admin;
mod auth;
mod errors;
mod handlers;
mod http;
mod query;
mod rating;
mod setup;
mod store;
mod user;

use crate::{
    admin::handlers::AdminHandlers,
    auth::{handlers::AuthHandlers, jwt_repository::JwtAuthRepository},
    http::AppData,
    impls::*,
    rating::handlers::RatingHandlers,
    setup::{env_param, JsonPanicHandler},
    store::handlers::StoreHandlers,
};
use axum::{routing, Extension, Router};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use std::{error::Error, net::SocketAddr};
use tower_http::{catch_panic::CatchPanicLayer, normalize_path::NormalizePathLayer};
use tracing_subscriber::EnvFilter;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

pub type BoxedError = Box<dyn Error + Send + Sync>;

pub const ENCODING_FAILED_BODY: &[u8] =
    br#"{"message":"Failed to encode the response body","error_code":50000}"#;

#[cfg(feature = "postgres")]
mod impls {
    pub type UserRepo = crate::user::postgres_repository::PostgresUserRepository;
    pub type StoreRepo = crate::store::postgres_repository::PostgresStoreRepository;
    pub type RatingRepo = crate::rating::postgres_repository::PostgresRatingRepository;
    pub type AuthRepo = crate::auth::jwt_repository::JwtAuthRepository;
}

#[cfg(not(feature = "postgres"))]
mod impls {
    pub type UserRepo = crate::user::memory_repository::InMemoryUserRepository;
    pub type StoreRepo = crate::store::memory_repository::InMemoryStoreRepository;
    pub type RatingRepo = crate::rating::memory_repository::InMemoryRatingRepository;
    pub type AuthRepo = crate::auth::jwt_repository::JwtAuthRepository;
}

async fn body() -> Result<(), BoxedError> {
    #[cfg(feature = "dotenv")]
    dotenvy::dotenv().map_err(|_| crate::setup::VarError::DotenvFileNotFound)?;

    #[cfg(feature = "json-log")]
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()?;

    #[cfg(not(feature = "json-log"))]
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()?;

    let port = env_param("APP_PORT").unwrap_or(8080_u16);

    let jwt_token_duration = env_param("APP_JWT_DURATION").unwrap_or(3600_u64);
    let jwt_key = env_param::<String>("APP_JWT_KEY")?;
    let bcrypt_cost = env_param("APP_BCRYPT_COST").unwrap_or(bcrypt::DEFAULT_COST);

    let auth_repo = JwtAuthRepository::new(
        Algorithm::HS512,
        EncodingKey::from_base64_secret(&jwt_key)?,
        DecodingKey::from_base64_secret(&jwt_key)?,
        jwt_token_duration,
    );

    #[cfg(feature = "postgres")]
    let pool = {
        let database_url = env_param::<String>("DATABASE_URL")?;
        let pool_size = env_param("APP_DB_POOL_SIZE").unwrap_or(10_u32);

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(pool_size)
            .connect(&database_url)
            .await?;

        sqlx::migrate!().run(&pool).await?;

        pool
    };

    #[cfg(feature = "postgres")]
    let (user_repo, store_repo, rating_repo) = (
        crate::user::postgres_repository::PostgresUserRepository::new(pool.clone(), bcrypt_cost),
        crate::store::postgres_repository::PostgresStoreRepository::new(pool.clone()),
        crate::rating::postgres_repository::PostgresRatingRepository::new(pool.clone()),
    );

    #[cfg(not(feature = "postgres"))]
    let (user_repo, store_repo, rating_repo) = (
        crate::user::memory_repository::InMemoryUserRepository::new(bcrypt_cost),
        crate::store::memory_repository::InMemoryStoreRepository::new(),
        crate::rating::memory_repository::InMemoryRatingRepository::new(),
    );

    let auth_handlers = AuthHandlers::new(auth_repo.clone(), user_repo.clone());
    let rating_handlers = RatingHandlers::new(rating_repo.clone(), store_repo.clone());
    let store_handlers =
        StoreHandlers::new(store_repo.clone(), rating_repo.clone(), user_repo.clone());
    let admin_handlers = AdminHandlers::new(user_repo, store_repo, rating_repo);

    let mut app = Router::new();

    app = app
        .route(
            "/auth/signup",
            routing::post(handlers::post_auth_signup::<AuthRepo, UserRepo>),
        )
        .route(
            "/auth/login",
            routing::post(handlers::post_auth_login::<AuthRepo, UserRepo>),
        )
        .route(
            "/user/password",
            routing::put(handlers::put_user_password::<AuthRepo, UserRepo>),
        )
        .route(
            "/rating",
            routing::post(handlers::post_rating::<RatingRepo, StoreRepo, AuthRepo>),
        )
        .route(
            "/rating/:store_id",
            routing::put(handlers::put_rating_store_id::<RatingRepo, StoreRepo, AuthRepo>),
        )
        .route(
            "/store",
            routing::get(handlers::get_stores::<StoreRepo, RatingRepo, UserRepo, AuthRepo>).post(
                handlers::post_store::<StoreRepo, RatingRepo, UserRepo, AuthRepo>,
            ),
        )
        .route(
            "/store/:store_id/ratings",
            routing::get(
                handlers::get_store_id_ratings::<StoreRepo, RatingRepo, UserRepo, AuthRepo>,
            ),
        )
        .route(
            "/admin/stats",
            routing::get(handlers::get_admin_stats::<UserRepo, StoreRepo, RatingRepo, AuthRepo>),
        )
        .route(
            "/admin/users",
            routing::get(handlers::get_admin_users::<UserRepo, StoreRepo, RatingRepo, AuthRepo>)
                .post(handlers::post_admin_user::<UserRepo, StoreRepo, RatingRepo, AuthRepo>),
        )
        .route(
            "/admin/stores",
            routing::get(handlers::get_admin_stores::<UserRepo, StoreRepo, RatingRepo, AuthRepo>),
        );

    app = app
        .layer(AppData::extension(auth_handlers))
        .layer(AppData::extension(rating_handlers))
        .layer(AppData::extension(store_handlers))
        .layer(AppData::extension(admin_handlers))
        .layer(Extension(auth_repo))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(CatchPanicLayer::custom(JsonPanicHandler));

    #[cfg(feature = "http-trace")]
    {
        app = app.layer(tower_http::trace::TraceLayer::new_for_http());
    }
    #[cfg(feature = "http-cors")]
    {
        app = setup::setup_app_cors(app);
    }

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    tracing::info!(port, "Server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(setup::shutdown_signal())
        .await?;

    #[cfg(feature = "postgres")]
    pool.close().await;

    Ok(())
}

fn main() -> Result<(), BoxedError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed building the Runtime")
        .block_on(body())
}
