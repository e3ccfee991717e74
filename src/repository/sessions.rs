use std::sync::Arc;

use eyre::Result;

use crate::db::fields::{consume, consume_all};
use crate::db::Sql;
use crate::domain::session::{Session, TABLE, UNIQUE_INDEX};

#[cfg_attr(test, faux::create)]
pub struct SessionRepository {
    db: Arc<Sql>,
}

#[cfg_attr(test, faux::methods)]
impl SessionRepository {
    pub fn new(db: Arc<Sql>) -> Self {
        Self { db }
    }

    pub async fn create(&self, session: Session) -> Result<Session> {
        self.db.save(&session).await?;
        Ok(session)
    }

    pub async fn get_by_user(&self, user_id: String) -> Result<Option<Session>> {
        self.db
            .get(TABLE, UNIQUE_INDEX, &user_id)
            .await?
            .map(|fields| consume(&fields))
            .transpose()
    }

    pub async fn get_all(&self, page: i64, per_page: i64) -> Result<(Vec<Session>, i64)> {
        let (rows, total) = self
            .db
            .get_all_per_page(TABLE, "asc", "public_id", page, per_page)
            .await?;
        Ok((consume_all(&rows)?, total))
    }

    pub async fn delete_by_user(&self, user_id: String) -> Result<u64> {
        self.db.delete(TABLE, UNIQUE_INDEX, &user_id).await
    }
}
