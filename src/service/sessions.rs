use std::sync::Arc;

use chrono::{Duration, Utc};
use eyre::{ensure, Result};
use log::{debug, info};

use crate::domain::request::Page;
use crate::domain::session::{EndSession, NewSession, Session};
use crate::error::Error;
use crate::repository::sessions::SessionRepository;
use crate::repository::users::UserRepository;

#[derive(Clone)]
pub struct SessionService {
    pub user_repository: Arc<UserRepository>,
    pub session_repository: Arc<SessionRepository>,
    pub session_ttl: Duration,
}

impl SessionService {
    /// Authenticates the credentials and returns the user's live session,
    /// replacing it first if it has expired.
    pub async fn login(&self, request: NewSession) -> Result<Session> {
        let user = self
            .user_repository
            .get_by_email(request.email)
            .await?
            .ok_or(Error::UserNotFound)?;
        user.authenticate(&request.password)?;

        if let Some(session) = self
            .session_repository
            .get_by_user(user.public_id.clone())
            .await?
        {
            if !session.expired() {
                debug!("Reusing session for user {}", user.public_id);
                return Ok(session);
            }
            self.session_repository
                .delete_by_user(user.public_id.clone())
                .await?;
        }

        let session = Session::new(user.public_id, Utc::now() + self.session_ttl);
        info!("New session for user {}", session.user_id);
        self.session_repository.create(session).await
    }

    pub async fn logout(&self, request: EndSession) -> Result<()> {
        let session = self.get(request.user_id).await?;
        ensure!(
            session.validate_token(&request.token),
            Error::InvalidUserSessionToken
        );
        self.session_repository
            .delete_by_user(session.user_id)
            .await?;
        Ok(())
    }

    pub async fn get(&self, user_id: String) -> Result<Session> {
        Ok(self
            .session_repository
            .get_by_user(user_id)
            .await?
            .ok_or(Error::SessionNotFound)?)
    }

    pub async fn get_all(&self, page: i64, per_page: i64) -> Result<Page<Session>> {
        let (records, total) = self.session_repository.get_all(page, per_page).await?;
        Ok(Page {
            page,
            total,
            response_per_page: per_page,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{NewUser, User};
    use lazy_static::lazy_static;
    use std::sync::Mutex;

    lazy_static! {
        static ref bob: User = User::new(NewUser {
            email: "bob@guma.com".to_string(),
            password: "glow".to_string(),
        })
        .unwrap();
    }

    fn mock_user_repository() -> UserRepository {
        let mut user_repository = UserRepository::faux();
        faux::when!(user_repository.get_by_email)
            .then(|email| Ok((email == bob.email).then(|| bob.clone())));
        user_repository
    }

    fn service(session_repository: SessionRepository) -> SessionService {
        SessionService {
            user_repository: Arc::new(mock_user_repository()),
            session_repository: Arc::new(session_repository),
            session_ttl: Duration::hours(1),
        }
    }

    fn credentials(password: &str) -> NewSession {
        NewSession {
            email: "bob@guma.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let service = service(SessionRepository::faux());
        let err = service.login(credentials("grow")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidPassword)
        ));
    }

    #[tokio::test]
    async fn test_login_reuses_live_session() -> Result<()> {
        let live = Session::new(bob.public_id.clone(), Utc::now() + Duration::minutes(10));
        let existing = live.clone();
        let mut session_repository = SessionRepository::faux();
        faux::when!(session_repository.get_by_user).then(move |_| Ok(Some(existing.clone())));

        let session = service(session_repository)
            .login(credentials("glow"))
            .await?;
        assert_eq!(session, live);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_replaces_expired_session() -> Result<()> {
        let stale = Session::new(bob.public_id.clone(), Utc::now() - Duration::minutes(10));
        let existing = stale.clone();
        let removed = Arc::new(Mutex::new(Vec::new()));
        let log = removed.clone();

        let mut session_repository = SessionRepository::faux();
        faux::when!(session_repository.get_by_user).then(move |_| Ok(Some(existing.clone())));
        faux::when!(session_repository.delete_by_user).then(move |user_id| {
            log.lock().unwrap().push(user_id);
            Ok(1)
        });
        faux::when!(session_repository.create).then(Ok);

        let session = service(session_repository)
            .login(credentials("glow"))
            .await?;
        assert_ne!(session.token, stale.token);
        assert_eq!(session.user_id, bob.public_id);
        assert!(!session.expired());
        assert_eq!(*removed.lock().unwrap(), vec![bob.public_id.clone()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_creates_first_session() -> Result<()> {
        let mut session_repository = SessionRepository::faux();
        faux::when!(session_repository.get_by_user).then(|_| Ok(None));
        faux::when!(session_repository.create).then(Ok);

        let before = Utc::now();
        let session = service(session_repository)
            .login(credentials("glow"))
            .await?;
        assert!(session.expires >= before + Duration::hours(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_logout_validates_token() -> Result<()> {
        let live = Session::new(bob.public_id.clone(), Utc::now() + Duration::minutes(10));
        let existing = live.clone();
        let mut session_repository = SessionRepository::faux();
        faux::when!(session_repository.get_by_user).then(move |_| Ok(Some(existing.clone())));
        faux::when!(session_repository.delete_by_user).then(|_| Ok(1));
        let service = service(session_repository);

        let err = service
            .logout(EndSession {
                user_id: bob.public_id.clone(),
                token: live.token.clone(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidUserSessionToken)
        ));

        service
            .logout(EndSession {
                user_id: bob.public_id.clone(),
                token: live.session_token(),
            })
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_session() {
        let mut session_repository = SessionRepository::faux();
        faux::when!(session_repository.get_by_user).then(|_| Ok(None));
        let err = service(session_repository)
            .get("nobody".to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::SessionNotFound)
        ));
    }
}
