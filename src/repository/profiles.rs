use std::sync::Arc;

use eyre::Result;

use crate::db::fields::{consume, consume_all};
use crate::db::Sql;
use crate::domain::profile::{Profile, UpdateProfile, TABLE, UNIQUE_INDEX};

#[cfg_attr(test, faux::create)]
pub struct ProfileRepository {
    db: Arc<Sql>,
}

#[cfg_attr(test, faux::methods)]
impl ProfileRepository {
    pub fn new(db: Arc<Sql>) -> Self {
        Self { db }
    }

    pub async fn create(&self, profile: Profile) -> Result<Profile> {
        self.db.save(&profile).await?;
        Ok(profile)
    }

    pub async fn get(&self, public_id: String) -> Result<Option<Profile>> {
        self.db
            .get(TABLE, "public_id", &public_id)
            .await?
            .map(|fields| consume(&fields))
            .transpose()
    }

    pub async fn get_by_user(&self, user_id: String) -> Result<Option<Profile>> {
        self.db
            .get(TABLE, UNIQUE_INDEX, &user_id)
            .await?
            .map(|fields| consume(&fields))
            .transpose()
    }

    pub async fn get_all(&self, page: i64, per_page: i64) -> Result<(Vec<Profile>, i64)> {
        let (rows, total) = self
            .db
            .get_all_per_page(TABLE, "asc", "public_id", page, per_page)
            .await?;
        Ok((consume_all(&rows)?, total))
    }

    pub async fn update(&self, update: UpdateProfile) -> Result<u64> {
        self.db.update(&update, "public_id").await
    }

    pub async fn delete(&self, public_id: String) -> Result<u64> {
        self.db.delete(TABLE, "public_id", &public_id).await
    }

    pub async fn delete_by_user(&self, user_id: String) -> Result<u64> {
        self.db.delete(TABLE, UNIQUE_INDEX, &user_id).await
    }
}
