use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};

use crate::domain::profile::{NewProfile, UpdateProfile};
use crate::domain::request::PageQuery;
use crate::domain::session::{EndSession, NewSession};
use crate::domain::user::{NewUser, UpdateUser, UpdateUserPassword};
use crate::error::{ApiError, Titled};
use crate::extensions::{AuthenticatedUser, JsonBody, QueryParams};
use crate::routes::Api;

/// Every route, nested under `/<version>`.
pub fn router(api: Api, version: &str) -> Router {
    let routes = Router::new()
        .route("/users", post(create_user))
        .route(
            "/users/{public_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/password/{public_id}", post(update_password))
        .route("/sessions/login", post(login))
        .route("/sessions/logout", delete(logout))
        .route("/profiles", post(create_profile))
        .route(
            "/profiles/{public_id}",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route("/profiles/users/{user_id}", get(get_profile_by_user))
        .route("/admin/users", get(admin_users))
        .route("/admin/users/{public_id}", get(admin_user))
        .route("/admin/sessions", get(admin_sessions))
        .route("/admin/sessions/{user_id}", get(admin_session))
        .route("/admin/profiles", get(admin_profiles));

    Router::new()
        .nest(&format!("/{}", version), routes)
        .layer(Extension(api))
}

async fn create_user(
    Extension(api): Extension<Api>,
    JsonBody(payload): JsonBody<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = api
        .create_user(payload)
        .await
        .titled("Failed to save new user")?;
    Ok((StatusCode::CREATED, Json(user.safe_fields())))
}

async fn get_user(
    Extension(api): Extension<Api>,
    Path(public_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = api
        .get_user(public_id)
        .await
        .titled("Failed to retrieve user")?;
    Ok(Json(user.safe_fields()))
}

async fn update_user(
    Extension(api): Extension<Api>,
    Path(public_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateUser>,
) -> Result<impl IntoResponse, ApiError> {
    api.update_user(public_id, payload)
        .await
        .titled("Failed to update user")?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_password(
    Extension(api): Extension<Api>,
    Path(public_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateUserPassword>,
) -> Result<impl IntoResponse, ApiError> {
    api.update_password(public_id, payload)
        .await
        .titled("Failed to update user password")?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(
    Extension(api): Extension<Api>,
    Path(public_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    api.delete_user(public_id)
        .await
        .titled("Failed to delete user")?;
    Ok(StatusCode::NO_CONTENT)
}

async fn login(
    Extension(api): Extension<Api>,
    JsonBody(payload): JsonBody<NewSession>,
) -> Result<impl IntoResponse, ApiError> {
    let session = api
        .login(payload)
        .await
        .titled("Failed to create user session")?;
    Ok((StatusCode::CREATED, Json(session.session_fields())))
}

async fn logout(
    Extension(api): Extension<Api>,
    JsonBody(payload): JsonBody<EndSession>,
) -> Result<impl IntoResponse, ApiError> {
    api.logout(payload)
        .await
        .titled("Failed to end user session")?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_profile(
    Extension(api): Extension<Api>,
    AuthenticatedUser(user): AuthenticatedUser,
    JsonBody(payload): JsonBody<NewProfile>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = api
        .create_profile(&user, payload)
        .await
        .titled("Failed to create profile")?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn get_profile(
    Extension(api): Extension<Api>,
    AuthenticatedUser(_): AuthenticatedUser,
    Path(public_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = api
        .get_profile(public_id)
        .await
        .titled("Failed to retrieve profile")?;
    Ok(Json(profile))
}

async fn get_profile_by_user(
    Extension(api): Extension<Api>,
    AuthenticatedUser(_): AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = api
        .get_profile_by_user(user_id)
        .await
        .titled("Failed to retrieve user's profile")?;
    Ok(Json(profile))
}

async fn update_profile(
    Extension(api): Extension<Api>,
    AuthenticatedUser(_): AuthenticatedUser,
    Path(public_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateProfile>,
) -> Result<impl IntoResponse, ApiError> {
    api.update_profile(public_id, payload)
        .await
        .titled("Failed to update profile")?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_profile(
    Extension(api): Extension<Api>,
    AuthenticatedUser(_): AuthenticatedUser,
    Path(public_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    api.delete_profile(public_id)
        .await
        .titled("Failed to delete profile")?;
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_users(
    Extension(api): Extension<Api>,
    AuthenticatedUser(_): AuthenticatedUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = api
        .get_users(query)
        .await
        .titled("Failed to retrieve users")?;
    Ok(Json(page))
}

async fn admin_user(
    Extension(api): Extension<Api>,
    AuthenticatedUser(_): AuthenticatedUser,
    Path(public_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = api
        .get_user_with_profile(public_id)
        .await
        .titled("Failed to retrieve user")?;
    Ok(Json(user))
}

async fn admin_sessions(
    Extension(api): Extension<Api>,
    AuthenticatedUser(_): AuthenticatedUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = api
        .get_sessions(query)
        .await
        .titled("Failed to retrieve sessions")?;
    Ok(Json(page))
}

async fn admin_session(
    Extension(api): Extension<Api>,
    AuthenticatedUser(_): AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = api
        .get_session(user_id)
        .await
        .titled("Failed to retrieve user's session")?;
    Ok(Json(session))
}

async fn admin_profiles(
    Extension(api): Extension<Api>,
    AuthenticatedUser(_): AuthenticatedUser,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = api
        .get_profiles(query)
        .await
        .titled("Failed to retrieve profiles")?;
    Ok(Json(page))
}
