pub mod fields;
pub mod migrations;
pub mod sql;

pub use migrations::{FieldMigration, IndexMigration, Migrations, TableMigration};
pub use sql::Sql;
