use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Index key not found in fields")]
    IndexKeyNotFound,
    #[error("Expected '{0}' key")]
    MissingField(&'static str),
    #[error("Invalid timestamp for '{0}'")]
    InvalidTimestamp(&'static str),
    #[error("Email already exists")]
    EmailAlreadyExists,
    #[error("Invalid Credentials: Failed to authenticate user")]
    InvalidPassword,
    #[error("Either email format is invalid or password is empty")]
    InvalidEmailOrPassword,
    #[error("Password and password confirmation do not match")]
    PasswordMismatch,
    #[error("JSON {0}.PublicID does not match update param")]
    PublicIdMismatch(&'static str),
    #[error("JSON {0}.PublicID is empty")]
    EmptyPublicId(&'static str),
    #[error("Invalid NewProfile.UserID: Does not match given user")]
    ProfileUserMismatch,
    #[error("Invalid SessionToken: Token must be UserID:Token format")]
    InvalidSessionToken,
    #[error("Invalid user session's token")]
    InvalidUserSessionToken,
    #[error("User session has expired")]
    SessionExpired,
    #[error("Authorization header not found in request")]
    MissingAuthorization,
    #[error("Only `Bearer` Authorization supported")]
    UnsupportedAuthorization,
    #[error("User not found")]
    UserNotFound,
    #[error("Session not found")]
    SessionNotFound,
    #[error("Profile not found")]
    ProfileNotFound,
}

impl Error {
    /// Every failure is reported to clients as a 500; the `title` of the
    /// error body is what tells them apart.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Body rendered for every failed request.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub status: u16,
    pub title: String,
    pub message: String,
}

/// A failure paired with the step that failed, ready to be rendered.
#[derive(Debug)]
pub struct ApiError {
    pub title: &'static str,
    pub report: eyre::Report,
}

impl ApiError {
    pub fn new(title: &'static str, report: impl Into<eyre::Report>) -> Self {
        Self {
            title,
            report: report.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.report.downcast_ref::<Error>() {
            Some(e) => e.status_code(),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status_code().as_u16(),
            title: self.title.to_string(),
            message: self.report.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("{}: {:?}", self.title, self.report);
        (self.status_code(), Json(self.body())).into_response()
    }
}

pub trait Titled<T> {
    fn titled(self, title: &'static str) -> Result<T, ApiError>;
}

impl<T, E: Into<eyre::Report>> Titled<T> for Result<T, E> {
    fn titled(self, title: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::new(title, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_error_body_repeats_status() -> eyre::Result<()> {
        let response =
            ApiError::new("Failed to delete user", Error::UserNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body: ErrorBody = serde_json::from_slice(&bytes)?;
        assert_eq!(
            body,
            ErrorBody {
                status: 500,
                title: "Failed to delete user".to_string(),
                message: "User not found".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_foreign_errors_are_500() {
        let error = ApiError::new("Failed to read body", eyre::eyre!("connection reset"));
        let body = error.body();
        assert_eq!(body.status, 500);
        assert_eq!(body.message, "connection reset");
    }
}
