use eyre::Result;
use validator::Validate;

use crate::domain::profile::{NewProfile, Profile, UpdateProfile};
use crate::domain::request::{Page, PageQuery};
use crate::domain::session::{EndSession, NewSession, Session};
use crate::domain::user::{NewUser, UpdateUser, UpdateUserPassword, User};
use crate::error::Error;
use crate::service::auth::AuthService;
use crate::service::profiles::ProfileService;
use crate::service::sessions::SessionService;
use crate::service::users::UserService;

#[derive(Clone)]
pub struct Api {
    pub user_service: UserService,
    pub session_service: SessionService,
    pub profile_service: ProfileService,
    pub auth_service: AuthService,
}

impl Api {
    pub async fn create_user(&self, request: NewUser) -> Result<User> {
        request
            .validate()
            .map_err(|_| Error::InvalidEmailOrPassword)?;
        self.user_service.create(request).await
    }

    pub async fn get_user(&self, public_id: String) -> Result<User> {
        self.user_service.get(public_id).await
    }

    pub async fn get_user_with_profile(&self, public_id: String) -> Result<User> {
        self.user_service.get_with_profile(public_id).await
    }

    pub async fn get_users(&self, query: PageQuery) -> Result<Page<User>> {
        self.user_service
            .get_all(query.page(), query.response_per_page())
            .await
    }

    pub async fn update_user(&self, public_id: String, request: UpdateUser) -> Result<()> {
        request
            .validate()
            .map_err(|_| Error::InvalidEmailOrPassword)?;
        self.user_service.update(public_id, request).await
    }

    pub async fn update_password(
        &self,
        public_id: String,
        request: UpdateUserPassword,
    ) -> Result<()> {
        self.user_service.update_password(public_id, request).await
    }

    pub async fn delete_user(&self, public_id: String) -> Result<()> {
        self.user_service.delete(public_id).await
    }

    pub async fn login(&self, request: NewSession) -> Result<Session> {
        request
            .validate()
            .map_err(|_| Error::InvalidEmailOrPassword)?;
        self.session_service.login(request).await
    }

    pub async fn logout(&self, request: EndSession) -> Result<()> {
        self.session_service.logout(request).await
    }

    pub async fn get_session(&self, user_id: String) -> Result<Session> {
        self.session_service.get(user_id).await
    }

    pub async fn get_sessions(&self, query: PageQuery) -> Result<Page<Session>> {
        self.session_service
            .get_all(query.page(), query.response_per_page())
            .await
    }

    pub async fn create_profile(&self, user: &User, request: NewProfile) -> Result<Profile> {
        self.profile_service.create(user, request).await
    }

    pub async fn get_profile(&self, public_id: String) -> Result<Profile> {
        self.profile_service.get(public_id).await
    }

    pub async fn get_profile_by_user(&self, user_id: String) -> Result<Profile> {
        self.profile_service.get_by_user(user_id).await
    }

    pub async fn get_profiles(&self, query: PageQuery) -> Result<Page<Profile>> {
        self.profile_service
            .get_all(query.page(), query.response_per_page())
            .await
    }

    pub async fn update_profile(&self, public_id: String, request: UpdateProfile) -> Result<()> {
        self.profile_service.update(public_id, request).await
    }

    pub async fn delete_profile(&self, public_id: String) -> Result<()> {
        self.profile_service.delete(public_id).await
    }

    pub async fn check_authorization(&self, token: &str) -> Result<User> {
        self.auth_service.check_authorization(token).await
    }
}
