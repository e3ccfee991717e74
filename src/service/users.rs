use std::sync::Arc;

use eyre::{ensure, Result};
use log::info;

use crate::domain::request::Page;
use crate::domain::user::{NewUser, UpdateUser, UpdateUserPassword, User};
use crate::error::Error;
use crate::repository::profiles::ProfileRepository;
use crate::repository::sessions::SessionRepository;
use crate::repository::users::UserRepository;

#[derive(Clone)]
pub struct UserService {
    pub user_repository: Arc<UserRepository>,
    pub session_repository: Arc<SessionRepository>,
    pub profile_repository: Arc<ProfileRepository>,
}

impl UserService {
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        ensure!(
            !self.user_repository.exists(new_user.email.clone()).await?,
            Error::EmailAlreadyExists
        );
        let user = User::new(new_user)?;
        self.user_repository.create(user).await
    }

    pub async fn get(&self, public_id: String) -> Result<User> {
        Ok(self
            .user_repository
            .get(public_id)
            .await?
            .ok_or(Error::UserNotFound)?)
    }

    /// The full record, with the user's profile attached when one exists.
    pub async fn get_with_profile(&self, public_id: String) -> Result<User> {
        let mut user = self.get(public_id).await?;
        user.profile = self
            .profile_repository
            .get_by_user(user.public_id.clone())
            .await?;
        Ok(user)
    }

    pub async fn get_all(&self, page: i64, per_page: i64) -> Result<Page<User>> {
        let (records, total) = self.user_repository.get_all(page, per_page).await?;
        Ok(Page {
            page,
            total,
            response_per_page: per_page,
            records,
        })
    }

    pub async fn update(&self, public_id: String, update: UpdateUser) -> Result<()> {
        ensure!(!update.public_id.is_empty(), Error::EmptyPublicId("UpdateUser"));
        ensure!(
            update.public_id == public_id,
            Error::PublicIdMismatch("UpdateUser")
        );
        self.get(public_id).await?;
        if let Some(owner) = self
            .user_repository
            .get_by_email(update.email.clone())
            .await?
        {
            ensure!(
                owner.public_id == update.public_id,
                Error::EmailAlreadyExists
            );
        }
        self.user_repository.update(update).await?;
        Ok(())
    }

    pub async fn update_password(
        &self,
        public_id: String,
        update: UpdateUserPassword,
    ) -> Result<()> {
        ensure!(
            update.public_id == public_id,
            Error::PublicIdMismatch("UpdateUserPassword")
        );
        ensure!(
            update.password == update.password_confirm,
            Error::PasswordMismatch
        );
        let mut user = self.get(public_id).await?;
        user.change_password(&update.password)?;
        self.user_repository.save_changes(user).await?;
        Ok(())
    }

    /// Removes the user together with its profile and session.
    pub async fn delete(&self, public_id: String) -> Result<()> {
        let user = self.get(public_id).await?;
        self.profile_repository
            .delete_by_user(user.public_id.clone())
            .await?;
        self.session_repository
            .delete_by_user(user.public_id.clone())
            .await?;
        self.user_repository.delete(user.public_id.clone()).await?;
        info!("Deleted user {}", user.public_id);
        Ok(())
    }
}
