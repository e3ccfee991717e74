use std::sync::Arc;

use eyre::{ensure, Result};

use crate::domain::session::parse_token;
use crate::domain::user::User;
use crate::error::Error;
use crate::repository::sessions::SessionRepository;
use crate::repository::users::UserRepository;

#[derive(Clone)]
pub struct AuthService {
    pub user_repository: Arc<UserRepository>,
    pub session_repository: Arc<SessionRepository>,
}

impl AuthService {
    /// Resolves a bearer token to its user. The token must belong to a live
    /// session of an existing user.
    pub async fn check_authorization(&self, token: &str) -> Result<User> {
        let (user_id, _) = parse_token(token)?;

        let user = self
            .user_repository
            .get(user_id.clone())
            .await?
            .ok_or(Error::UserNotFound)?;
        let session = self
            .session_repository
            .get_by_user(user_id)
            .await?
            .ok_or(Error::SessionNotFound)?;

        ensure!(session.validate_token(token), Error::InvalidUserSessionToken);
        ensure!(!session.expired(), Error::SessionExpired);
        Ok(user)
    }
}
