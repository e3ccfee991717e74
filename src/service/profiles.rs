use std::sync::Arc;

use eyre::{ensure, Result};
use log::debug;

use crate::domain::profile::{NewProfile, Profile, UpdateProfile};
use crate::domain::request::Page;
use crate::domain::user::User;
use crate::error::Error;
use crate::repository::profiles::ProfileRepository;

#[derive(Clone)]
pub struct ProfileService {
    pub profile_repository: Arc<ProfileRepository>,
}

impl ProfileService {
    /// Saves a profile for `user`, or hands back the one it already has.
    pub async fn create(&self, user: &User, request: NewProfile) -> Result<Profile> {
        ensure!(request.user_id == user.public_id, Error::ProfileUserMismatch);

        if let Some(profile) = self
            .profile_repository
            .get_by_user(user.public_id.clone())
            .await?
        {
            debug!("User {} already has profile {}", user.public_id, profile.public_id);
            return Ok(profile);
        }

        let profile = Profile {
            address: request.address,
            first_name: request.first_name,
            last_name: request.last_name,
            ..Profile::new(user.public_id.clone())
        };
        self.profile_repository.create(profile).await
    }

    pub async fn get(&self, public_id: String) -> Result<Profile> {
        Ok(self
            .profile_repository
            .get(public_id)
            .await?
            .ok_or(Error::ProfileNotFound)?)
    }

    pub async fn get_by_user(&self, user_id: String) -> Result<Profile> {
        Ok(self
            .profile_repository
            .get_by_user(user_id)
            .await?
            .ok_or(Error::ProfileNotFound)?)
    }

    pub async fn get_all(&self, page: i64, per_page: i64) -> Result<Page<Profile>> {
        let (records, total) = self.profile_repository.get_all(page, per_page).await?;
        Ok(Page {
            page,
            total,
            response_per_page: per_page,
            records,
        })
    }

    pub async fn update(&self, public_id: String, update: UpdateProfile) -> Result<()> {
        ensure!(
            !update.public_id.is_empty(),
            Error::EmptyPublicId("UpdateProfile")
        );
        ensure!(
            update.public_id == public_id,
            Error::PublicIdMismatch("UpdateProfile")
        );
        self.get(public_id).await?;
        self.profile_repository.update(update).await?;
        Ok(())
    }

    pub async fn delete(&self, public_id: String) -> Result<()> {
        self.get(public_id.clone()).await?;
        self.profile_repository.delete(public_id).await?;
        Ok(())
    }
}
