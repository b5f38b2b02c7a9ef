use crate::{
    admin::handlers::{AdminHandlers, AdminUserEntry, StatsResponseBody},
    auth::{
        handlers::{
            AuthHandlers, ChangePasswordRequestBody, ChangePasswordResponseBody,
            SignInRequestBody, SignInResponseBody,
        },
        http::{AdminOnly, AuthExtractor, OwnerOnly, RoleExtractor, UserOnly},
        repository::AuthRepository,
    },
    errors::ApiError,
    http::{AppData, DataResponse, Json, Query},
    query::{StoreFilter, StoreSearch, UserFilter},
    rating::{
        handlers::{RatingHandlers, StoreIdPathParams as RatingStoreIdPathParams},
        models::{Rating, RatingCreateData, RatingUpdateData},
        repository::RatingRepository,
    },
    store::{
        handlers::{StoreHandlers, StoreIdPathParams, StoreRatingsReport},
        models::{Store, StoreCreateData, StoreListEntry, StoreWithAverage},
        repository::StoreRepository,
    },
    user::{
        models::{User, UserCreateData},
        repository::UserRepository,
    },
};
use axum::extract::Path;

pub async fn post_auth_signup<A, U>(
    AppData(data): AppData<AuthHandlers<A, U>>,
    Json(body): Json<UserCreateData>,
) -> Result<DataResponse<User>, ApiError>
where
    A: AuthRepository + 'static,
    U: UserRepository + 'static,
{
    data.handle_signup(body).await
}

pub async fn post_auth_login<A, U>(
    AppData(data): AppData<AuthHandlers<A, U>>,
    Json(body): Json<SignInRequestBody>,
) -> Result<DataResponse<SignInResponseBody>, ApiError>
where
    A: AuthRepository + 'static,
    U: UserRepository + 'static,
{
    data.handle_signin(body).await
}

pub async fn put_user_password<A, U>(
    AuthExtractor(auth, _): AuthExtractor<A>,
    AppData(data): AppData<AuthHandlers<A, U>>,
    Json(body): Json<ChangePasswordRequestBody>,
) -> Result<DataResponse<ChangePasswordResponseBody>, ApiError>
where
    A: AuthRepository + 'static,
    U: UserRepository + 'static,
{
    data.handle_change_password(auth, body).await
}

pub async fn post_rating<R, S, A>(
    RoleExtractor(auth, _): RoleExtractor<UserOnly, A>,
    AppData(data): AppData<RatingHandlers<R, S>>,
    Json(body): Json<RatingCreateData>,
) -> Result<DataResponse<Rating>, ApiError>
where
    R: RatingRepository + 'static,
    S: StoreRepository + 'static,
    A: AuthRepository + 'static,
{
    data.handle_submit(auth, body).await
}

pub async fn put_rating_store_id<R, S, A>(
    AuthExtractor(auth, _): AuthExtractor<A>,
    AppData(data): AppData<RatingHandlers<R, S>>,
    Path(path): Path<RatingStoreIdPathParams>,
    Json(body): Json<RatingUpdateData>,
) -> Result<DataResponse<Rating>, ApiError>
where
    R: RatingRepository + 'static,
    S: StoreRepository + 'static,
    A: AuthRepository + 'static,
{
    data.handle_update(auth, path, body).await
}

pub async fn get_stores<S, R, U, A>(
    AuthExtractor(auth, _): AuthExtractor<A>,
    AppData(data): AppData<StoreHandlers<S, R, U>>,
    Query(query): Query<StoreSearch>,
) -> Result<DataResponse<Vec<StoreListEntry>>, ApiError>
where
    S: StoreRepository + 'static,
    R: RatingRepository + 'static,
    U: UserRepository + 'static,
    A: AuthRepository + 'static,
{
    data.handle_get_stores(auth, query).await
}

pub async fn post_store<S, R, U, A>(
    RoleExtractor(_, _): RoleExtractor<AdminOnly, A>,
    AppData(data): AppData<StoreHandlers<S, R, U>>,
    Json(body): Json<StoreCreateData>,
) -> Result<DataResponse<Store>, ApiError>
where
    S: StoreRepository + 'static,
    R: RatingRepository + 'static,
    U: UserRepository + 'static,
    A: AuthRepository + 'static,
{
    data.handle_create(body).await
}

pub async fn get_store_id_ratings<S, R, U, A>(
    RoleExtractor(auth, _): RoleExtractor<OwnerOnly, A>,
    AppData(data): AppData<StoreHandlers<S, R, U>>,
    Path(path): Path<StoreIdPathParams>,
) -> Result<DataResponse<StoreRatingsReport>, ApiError>
where
    S: StoreRepository + 'static,
    R: RatingRepository + 'static,
    U: UserRepository + 'static,
    A: AuthRepository + 'static,
{
    data.handle_store_ratings(auth, path).await
}

pub async fn get_admin_stats<U, S, R, A>(
    RoleExtractor(_, _): RoleExtractor<AdminOnly, A>,
    AppData(data): AppData<AdminHandlers<U, S, R>>,
) -> Result<DataResponse<StatsResponseBody>, ApiError>
where
    U: UserRepository + 'static,
    S: StoreRepository + 'static,
    R: RatingRepository + 'static,
    A: AuthRepository + 'static,
{
    data.handle_stats().await
}

pub async fn get_admin_users<U, S, R, A>(
    RoleExtractor(_, _): RoleExtractor<AdminOnly, A>,
    AppData(data): AppData<AdminHandlers<U, S, R>>,
    Query(filter): Query<UserFilter>,
) -> Result<DataResponse<Vec<AdminUserEntry>>, ApiError>
where
    U: UserRepository + 'static,
    S: StoreRepository + 'static,
    R: RatingRepository + 'static,
    A: AuthRepository + 'static,
{
    data.handle_list_users(filter).await
}

pub async fn get_admin_stores<U, S, R, A>(
    RoleExtractor(_, _): RoleExtractor<AdminOnly, A>,
    AppData(data): AppData<AdminHandlers<U, S, R>>,
    Query(filter): Query<StoreFilter>,
) -> Result<DataResponse<Vec<StoreWithAverage>>, ApiError>
where
    U: UserRepository + 'static,
    S: StoreRepository + 'static,
    R: RatingRepository + 'static,
    A: AuthRepository + 'static,
{
    data.handle_list_stores(filter).await
}

pub async fn post_admin_user<U, S, R, A>(
    RoleExtractor(_, _): RoleExtractor<AdminOnly, A>,
    AppData(data): AppData<AdminHandlers<U, S, R>>,
    Json(body): Json<UserCreateData>,
) -> Result<DataResponse<User>, ApiError>
where
    U: UserRepository + 'static,
    S: StoreRepository + 'static,
    R: RatingRepository + 'static,
    A: AuthRepository + 'static,
{
    data.handle_create_user(body).await
}
