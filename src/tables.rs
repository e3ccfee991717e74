use crate::db::{FieldMigration, IndexMigration, Migrations, TableMigration};
use crate::domain::{profile, session, user};

const ID: &str = "VARCHAR(255)";

pub fn users() -> TableMigration {
    TableMigration {
        table_name: user::TABLE.to_string(),
        timestamped: true,
        fields: vec![
            FieldMigration::new("email", ID).not_null(),
            FieldMigration::new("public_id", ID).primary_key().not_null(),
            FieldMigration::new("private_id", ID).not_null(),
            FieldMigration::new("hash", ID).not_null(),
        ],
        ..Default::default()
    }
}

pub fn sessions() -> TableMigration {
    TableMigration {
        table_name: session::TABLE.to_string(),
        timestamped: true,
        indexes: vec![IndexMigration::new("user_id", "user_id")],
        fields: vec![
            FieldMigration::new("user_id", ID).not_null(),
            FieldMigration::new("token", ID).not_null(),
            FieldMigration::new("public_id", ID).primary_key().not_null(),
            FieldMigration::new("expires", "timestamp").not_null(),
        ],
        ..Default::default()
    }
}

pub fn profiles() -> TableMigration {
    TableMigration {
        table_name: profile::TABLE.to_string(),
        timestamped: true,
        indexes: vec![IndexMigration::new("user_id", "user_id")],
        fields: vec![
            FieldMigration::new("user_id", ID).not_null(),
            FieldMigration::new("address", "text").not_null(),
            FieldMigration::new("public_id", ID).primary_key().not_null(),
            FieldMigration::new("first_name", ID).not_null(),
            FieldMigration::new("last_name", ID).not_null(),
        ],
        ..Default::default()
    }
}

/// Every table the service needs, in creation order.
pub fn migrations(database: Option<String>) -> Migrations {
    let mut migrations = Migrations::new(database, vec![]);
    migrations.register(users());
    migrations.register(sessions());
    migrations.register(profiles());
    migrations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_table() {
        assert_eq!(
            users().to_string(),
            "CREATE TABLE IF NOT EXISTS users (\n\
             \temail VARCHAR(255) NOT NULL,\n\
             \tpublic_id VARCHAR(255) NOT NULL PRIMARY KEY,\n\
             \tprivate_id VARCHAR(255) NOT NULL,\n\
             \thash VARCHAR(255) NOT NULL,\n\
             \tcreated_at timestamp NOT NULL,\n\
             \tupdated_at timestamp NOT NULL\n);\r\n"
        );
    }

    #[test]
    fn test_sessions_table_indexes_user() {
        let sql = sessions().to_string();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS sessions (\n"));
        assert!(sql.contains("\texpires timestamp NOT NULL,\n"));
        assert!(sql.ends_with("\tupdated_at timestamp NOT NULL,\n\tINDEX user_id (user_id)\n);\r\n"));
    }

    #[test]
    fn test_every_table_is_registered() {
        let migrations = migrations(Some("midash".to_string()));
        let names: Vec<_> = migrations.tables().iter().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, vec!["users", "sessions", "profiles"]);
        assert!(migrations.to_string().starts_with("use midash;\r\n\nCREATE TABLE IF NOT EXISTS users ("));
    }
}
