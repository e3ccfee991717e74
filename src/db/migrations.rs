use std::fmt::{self, Display, Formatter, Write};

use eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

/// Placeholder replaced by the table name inside extra queries.
pub const TABLE_PLACEHOLDER: &str = "{table}";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMigration {
    pub field_name: String,
    pub field_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
}

impl FieldMigration {
    pub fn new(field_name: &str, field_type: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            field_type: field_type.to_string(),
            ..Default::default()
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

impl Display for FieldMigration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field_name, self.field_type)?;
        if self.not_null {
            f.write_str(" NOT NULL")?;
        }
        if self.primary_key {
            f.write_str(" PRIMARY KEY")?;
        }
        if self.auto_increment {
            f.write_str(" AUTO_INCREMENT")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexMigration {
    pub field: String,
    pub index_name: String,
}

impl IndexMigration {
    pub fn new(field: &str, index_name: &str) -> Self {
        Self {
            field: field.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

impl Display for IndexMigration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "INDEX {} ({})", self.field, self.index_name)
    }
}

/// Declarative description of a table, rendered to `CREATE TABLE IF NOT EXISTS`
/// followed by any extra queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMigration {
    pub table_name: String,
    pub timestamped: bool,
    pub fields: Vec<FieldMigration>,
    pub indexes: Vec<IndexMigration>,
    /// Complete statements run after the table is created.
    pub queries: Vec<String>,
}

impl Display for TableMigration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let has_fields = !self.fields.is_empty();
        let has_indexes = has_fields && !self.indexes.is_empty();

        if !self.table_name.is_empty() {
            writeln!(f, "CREATE TABLE IF NOT EXISTS {} (", self.table_name)?;

            let fields = self
                .fields
                .iter()
                .map(|field| format!("\t{}", field))
                .collect::<Vec<_>>();
            f.write_str(&fields.join(",\n"))?;

            if self.timestamped {
                if has_fields {
                    f.write_str(",\n")?;
                }
                f.write_str("\tcreated_at timestamp NOT NULL,\n")?;
                f.write_str("\tupdated_at timestamp NOT NULL")?;
            }

            if has_indexes {
                f.write_str(",\n")?;
                let indexes = self
                    .indexes
                    .iter()
                    .map(|index| format!("\t{}", index))
                    .collect::<Vec<_>>();
                f.write_str(&indexes.join(",\n"))?;
            }

            f.write_str("\n);\r\n")?;
        }

        if !self.queries.is_empty() {
            f.write_str("\r\n")?;
            for query in &self.queries {
                let query = query.replace(TABLE_PLACEHOLDER, &self.table_name);
                if query.ends_with(';') {
                    writeln!(f, "{}", query)?;
                } else {
                    writeln!(f, "{};", query)?;
                }
            }
            f.write_str("\r\n")?;
        }

        Ok(())
    }
}

/// The set of tables a database needs.
#[derive(Debug, Clone, Default)]
pub struct Migrations {
    database: Option<String>,
    tables: Vec<TableMigration>,
}

impl Migrations {
    pub fn new(database: Option<String>, tables: Vec<TableMigration>) -> Self {
        Self { database, tables }
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn tables(&self) -> &[TableMigration] {
        &self.tables
    }

    pub fn register(&mut self, table: TableMigration) {
        self.tables.push(table);
    }

    /// Runs every table's statements against the pool. The pool is already bound
    /// to its database, so the `use` prefix is not sent.
    pub async fn migrate(&self, pool: &MySqlPool) -> Result<()> {
        for table in &self.tables {
            let query = table.to_string();
            info!("Executing migration for table {}", table.table_name);
            sqlx::raw_sql(&query).execute(pool).await?;
        }
        Ok(())
    }
}

impl Display for Migrations {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(database) = self.database.as_deref().filter(|d| !d.is_empty()) {
            write!(f, "use {};\r\n\n", database)?;
        }
        let mut rendered = String::new();
        for table in &self.tables {
            write!(rendered, "{}", table)?;
        }
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: &str = "use buba;\r\n\nCREATE TABLE IF NOT EXISTS users (\n\tid INTEGER NOT NULL PRIMARY KEY AUTO_INCREMENT,\n\tname VARCHAR(255) NOT NULL,\n\tcreated_at timestamp NOT NULL,\n\tupdated_at timestamp NOT NULL,\n\tINDEX name (name_idx)\n);\r\n\r\nALTER TABLE users ADD bottle VARCHAR(255) NOT NULL;\nALTER TABLE users ADD wine_id VARCHAR(255) NOT NULL;\n\r\n";

    #[test]
    fn test_migration_renders_expected_sql() {
        let mut migrations = Migrations::new(Some("buba".to_string()), vec![]);
        migrations.register(TableMigration {
            table_name: "users".to_string(),
            timestamped: true,
            indexes: vec![IndexMigration::new("name", "name_idx")],
            fields: vec![
                FieldMigration::new("id", "INTEGER")
                    .not_null()
                    .primary_key()
                    .auto_increment(),
                FieldMigration::new("name", "VARCHAR(255)").not_null(),
            ],
            queries: vec![
                "ALTER TABLE {table} ADD bottle VARCHAR(255) NOT NULL;".to_string(),
                "ALTER TABLE {table} ADD wine_id VARCHAR(255) NOT NULL".to_string(),
            ],
        });

        assert_eq!(migrations.to_string(), EXPECTED);
    }

    #[test]
    fn test_untimestamped_table_with_index() {
        let table = TableMigration {
            table_name: "tags".to_string(),
            fields: vec![FieldMigration::new("label", "text")],
            indexes: vec![IndexMigration::new("label", "label_idx")],
            ..Default::default()
        };
        assert_eq!(
            table.to_string(),
            "CREATE TABLE IF NOT EXISTS tags (\n\tlabel text,\n\tINDEX label (label_idx)\n);\r\n"
        );
    }

    #[test]
    fn test_indexes_need_fields() {
        let table = TableMigration {
            table_name: "empty".to_string(),
            timestamped: true,
            indexes: vec![IndexMigration::new("name", "name_idx")],
            ..Default::default()
        };
        assert_eq!(
            table.to_string(),
            "CREATE TABLE IF NOT EXISTS empty (\n\tcreated_at timestamp NOT NULL,\n\tupdated_at timestamp NOT NULL\n);\r\n"
        );
    }

    #[test]
    fn test_queries_only() {
        let table = TableMigration {
            queries: vec!["DROP TABLE legacy".to_string()],
            ..Default::default()
        };
        assert_eq!(table.to_string(), "\r\nDROP TABLE legacy;\n\r\n");
    }

    #[test]
    fn test_migrations_without_database() {
        let migrations = Migrations::new(None, vec![]);
        assert_eq!(migrations.to_string(), "");
        assert_eq!(migrations.database(), None);
    }
}
