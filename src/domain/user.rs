use bcrypt::{hash, verify};
use eyre::{ensure, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::fields::{required_text, FieldMap, TableConsumer, TableFields, TableIdentity};
use crate::domain::profile::Profile;
use crate::error::Error;

pub const TABLE: &str = "users";

const HASH_COST: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub public_id: String,
    pub private_id: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

#[derive(Debug, Validate, Deserialize, Serialize)]
pub struct NewUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Validate, Deserialize, Serialize)]
pub struct UpdateUser {
    #[validate(email)]
    pub email: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateUserPassword {
    pub public_id: String,
    pub password: String,
    pub password_confirm: String,
}

/// Hash input is `<private_id>:<password>`.
fn salted(private_id: &str, password: &str) -> String {
    format!("{}:{}", private_id, password)
}

impl User {
    pub fn new(new_user: NewUser) -> Result<Self> {
        let mut user = User {
            email: new_user.email,
            public_id: Uuid::new_v4().to_string(),
            private_id: Uuid::new_v4().to_string(),
            ..Default::default()
        };
        user.change_password(&new_user.password)?;
        Ok(user)
    }

    pub fn authenticate(&self, password: &str) -> Result<()> {
        ensure!(
            verify(salted(&self.private_id, password), &self.hash)?,
            Error::InvalidPassword
        );
        Ok(())
    }

    pub fn change_password(&mut self, password: &str) -> Result<()> {
        self.hash = hash(salted(&self.private_id, password), HASH_COST)?;
        Ok(())
    }

    /// Fields safe to hand to any caller: no hash, no private id.
    pub fn safe_fields(&self) -> FieldMap {
        let mut fields = self.fields();
        fields.remove("hash");
        fields.remove("private_id");
        fields
    }
}

impl TableIdentity for User {
    fn table(&self) -> &'static str {
        TABLE
    }
}

impl TableFields for User {
    fn fields(&self) -> FieldMap {
        FieldMap::from([
            ("email".to_string(), self.email.as_str().into()),
            ("public_id".to_string(), self.public_id.as_str().into()),
            ("private_id".to_string(), self.private_id.as_str().into()),
            ("hash".to_string(), self.hash.as_str().into()),
        ])
    }
}

impl TableConsumer for User {
    fn with_fields(&mut self, fields: &FieldMap) -> Result<()> {
        self.email = required_text(fields, "email")?;
        self.public_id = required_text(fields, "public_id")?;
        self.private_id = required_text(fields, "private_id")?;
        self.hash = required_text(fields, "hash")?;
        Ok(())
    }
}

impl TableIdentity for UpdateUser {
    fn table(&self) -> &'static str {
        TABLE
    }
}

impl TableFields for UpdateUser {
    fn fields(&self) -> FieldMap {
        FieldMap::from([
            ("email".to_string(), self.email.as_str().into()),
            ("public_id".to_string(), self.public_id.as_str().into()),
        ])
    }
}
