use std::sync::Arc;

use eyre::Result;

use crate::db::fields::{consume, consume_all};
use crate::db::Sql;
use crate::domain::user::{UpdateUser, User, TABLE};

#[cfg_attr(test, faux::create)]
pub struct UserRepository {
    db: Arc<Sql>,
}

#[cfg_attr(test, faux::methods)]
impl UserRepository {
    pub fn new(db: Arc<Sql>) -> Self {
        Self { db }
    }

    pub async fn create(&self, user: User) -> Result<User> {
        self.db.save(&user).await?;
        Ok(user)
    }

    pub async fn get(&self, public_id: String) -> Result<Option<User>> {
        self.db
            .get(TABLE, "public_id", &public_id)
            .await?
            .map(|fields| consume(&fields))
            .transpose()
    }

    pub async fn get_by_email(&self, email: String) -> Result<Option<User>> {
        self.db
            .get(TABLE, "email", &email)
            .await?
            .map(|fields| consume(&fields))
            .transpose()
    }

    pub async fn exists(&self, email: String) -> Result<bool> {
        Ok(self.db.get(TABLE, "email", &email).await?.is_some())
    }

    pub async fn get_all(&self, page: i64, per_page: i64) -> Result<(Vec<User>, i64)> {
        let (rows, total) = self
            .db
            .get_all_per_page(TABLE, "asc", "public_id", page, per_page)
            .await?;
        Ok((consume_all(&rows)?, total))
    }

    pub async fn update(&self, update: UpdateUser) -> Result<u64> {
        self.db.update(&update, "public_id").await
    }

    /// Rewrites the whole row, hash included.
    pub async fn save_changes(&self, user: User) -> Result<u64> {
        self.db.update(&user, "public_id").await
    }

    pub async fn delete(&self, public_id: String) -> Result<u64> {
        self.db.delete(TABLE, "public_id", &public_id).await
    }
}
