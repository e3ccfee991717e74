use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::{Extension, Json};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use log::{error, info};
use serde::de::DeserializeOwned;
use tap::TapFallible;

use crate::domain::user::User;
use crate::error::{ApiError, Error, Titled};
use crate::routes::Api;

const AUTH_FAILED: &str = "Invalid Auth: Failed to validate authorization";

/// JSON request body whose rejection renders like every other failure.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .tap_err(|e| error!("Failed to decode body: {}", e))
            .map_err(|e| ApiError::new("Failed to read body", e))?;
        Ok(JsonBody(value))
    }
}

/// Query string parameters, rejected the same way as [`JsonBody`].
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(req, state)
            .await
            .tap_err(|e| error!("Failed to decode query: {}", e))
            .map_err(|e| ApiError::new("Failed to read query parameters", e))?;
        Ok(QueryParams(value))
    }
}

/// The user behind a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        info!("Authenticating request to {}", req.uri.path());
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(req, state)
                .await
                .tap_err(|e| error!("Failed to extract Authorization header: {}", e))
                .map_err(|e| {
                    if e.is_missing() {
                        ApiError::new(AUTH_FAILED, Error::MissingAuthorization)
                    } else {
                        ApiError::new(AUTH_FAILED, Error::UnsupportedAuthorization)
                    }
                })?;

        let Extension(api) = Extension::<Api>::from_request_parts(req, state)
            .await
            .tap_err(|e| error!("Failed to extract API: {}", e))
            .map_err(|e| ApiError::new(AUTH_FAILED, e))?;

        let user = api
            .check_authorization(bearer.token())
            .await
            .titled(AUTH_FAILED)?;
        Ok(AuthenticatedUser(user))
    }
}
