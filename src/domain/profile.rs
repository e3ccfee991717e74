use eyre::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::fields::{text, FieldMap, TableConsumer, TableFields, TableIdentity};

pub const TABLE: &str = "profiles";

/// Column profiles are looked up by when going through their owner.
pub const UNIQUE_INDEX: &str = "user_id";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewProfile {
    pub address: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateProfile {
    pub address: String,
    pub public_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub address: String,
    pub user_id: String,
    pub public_id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Profile {
    pub fn new(user_id: String) -> Self {
        Profile {
            user_id,
            public_id: Uuid::new_v4().to_string(),
            ..Default::default()
        }
    }
}

impl TableIdentity for Profile {
    fn table(&self) -> &'static str {
        TABLE
    }
}

impl TableFields for Profile {
    fn fields(&self) -> FieldMap {
        FieldMap::from([
            ("address".to_string(), self.address.as_str().into()),
            ("user_id".to_string(), self.user_id.as_str().into()),
            ("first_name".to_string(), self.first_name.as_str().into()),
            ("last_name".to_string(), self.last_name.as_str().into()),
            ("public_id".to_string(), self.public_id.as_str().into()),
        ])
    }
}

// Every key is optional here; missing ones keep their current value.
impl TableConsumer for Profile {
    fn with_fields(&mut self, fields: &FieldMap) -> Result<()> {
        if let Some(user_id) = text(fields, "user_id") {
            self.user_id = user_id;
        }
        if let Some(public_id) = text(fields, "public_id") {
            self.public_id = public_id;
        }
        if let Some(first_name) = text(fields, "first_name") {
            self.first_name = first_name;
        }
        if let Some(last_name) = text(fields, "last_name") {
            self.last_name = last_name;
        }
        if let Some(address) = text(fields, "address") {
            self.address = address;
        }
        Ok(())
    }
}

impl TableIdentity for UpdateProfile {
    fn table(&self) -> &'static str {
        TABLE
    }
}

impl TableFields for UpdateProfile {
    fn fields(&self) -> FieldMap {
        FieldMap::from([
            ("address".to_string(), self.address.as_str().into()),
            ("first_name".to_string(), self.first_name.as_str().into()),
            ("last_name".to_string(), self.last_name.as_str().into()),
            ("public_id".to_string(), self.public_id.as_str().into()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fields::consume;

    #[test]
    fn test_with_fields() -> Result<()> {
        let fields = FieldMap::from([
            ("first_name".to_string(), "Bob".into()),
            ("last_name".to_string(), "Ged".into()),
            ("address".to_string(), "No. 20 Toku street, Ala, Lagos.".into()),
            ("user_id".to_string(), "2332323-23220-Gu34433-23232232".into()),
            ("public_id".to_string(), "2332323-23220-Gu34433-23232232".into()),
        ]);
        let profile: Profile = consume(&fields)?;
        assert_eq!(profile.user_id, "2332323-23220-Gu34433-23232232");
        assert_eq!(profile.first_name, "Bob");
        assert_eq!(profile.fields(), fields);
        Ok(())
    }

    #[test]
    fn test_partial_fields_keep_defaults() -> Result<()> {
        let mut profile = Profile::new("owner".to_string());
        let public_id = profile.public_id.clone();
        profile.with_fields(&FieldMap::from([("address".to_string(), "Lagos".into())]))?;
        assert_eq!(profile.address, "Lagos");
        assert_eq!(profile.user_id, "owner");
        assert_eq!(profile.public_id, public_id);
        Ok(())
    }

    #[test]
    fn test_fields() {
        let fields = Profile::default().fields();
        for key in ["address", "user_id", "public_id", "first_name", "last_name"] {
            assert!(fields.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn test_update_carries_its_index() {
        let update = UpdateProfile {
            address: "Lagos".to_string(),
            public_id: "p-1".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Ged".to_string(),
        };
        assert!(update.fields().contains_key("public_id"));
        assert!(!update.fields().contains_key("user_id"));
    }
}
