use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, NaiveDateTime, Utc};
use eyre::Result;
use log::{debug, error};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, MySqlPool, Row, TypeInfo};
use tap::TapFallible;
use tokio::sync::OnceCell;

use crate::db::fields::{FieldMap, FieldValue, TableFields};
use crate::db::migrations::Migrations;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// `asc` and unknown words sort ascending, `dsc`/`desc` descending.
    pub fn from_word(word: &str) -> Self {
        match word.to_lowercase().as_str() {
            "dsc" | "desc" => Order::Desc,
            _ => Order::Asc,
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Order::Asc => f.write_str("ASC"),
            Order::Desc => f.write_str("DESC"),
        }
    }
}

/// `(?,?,?)` for `total` values.
pub fn field_markers(total: usize) -> String {
    format!("({})", vec!["?"; total].join(","))
}

/// `(a, b, c)` for the given column names.
pub fn field_name_markers(names: &[String]) -> String {
    format!("({})", names.join(", "))
}

pub fn insert_query(table: &str, names: &[String]) -> String {
    format!(
        "INSERT INTO {} {} VALUES {}",
        table,
        field_name_markers(names),
        field_markers(names.len())
    )
}

pub fn update_query(table: &str, names: &[String], index: &str) -> String {
    let assignments = names
        .iter()
        .map(|name| format!("{}=?", name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {} SET {} WHERE {}=?", table, assignments, index)
}

pub fn select_item_query(table: &str, index: &str) -> String {
    format!("SELECT * FROM {} WHERE {}=?", table, index)
}

pub fn select_all_query(table: &str, order_by: &str, order: Order) -> String {
    format!("SELECT * FROM {} ORDER BY {} {}", table, order_by, order)
}

pub fn select_limited_query(
    table: &str,
    order_by: &str,
    order: Order,
    limit: i64,
    offset: i64,
) -> String {
    format!(
        "{} LIMIT {} OFFSET {}",
        select_all_query(table, order_by, order),
        limit,
        offset
    )
}

pub fn count_query(table: &str, index: &str) -> String {
    format!("SELECT COUNT({}) FROM {}", index, table)
}

pub fn delete_query(table: &str, index: &str) -> String {
    format!("DELETE FROM {} WHERE {}=?", table, index)
}

/// Returns `(limit, offset)` for a page request, or `None` when every record
/// is wanted. An offset too large for `i64` saturates, so it lands past the end.
pub fn page_window(page: i64, per_page: i64) -> Option<(i64, i64)> {
    if per_page <= 0 {
        return None;
    }
    if page <= 0 {
        return Some((per_page, 0));
    }
    let offset = (page - 1).checked_mul(per_page).unwrap_or(i64::MAX);
    Some((per_page, offset))
}

fn bind_values<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: Vec<FieldValue>,
) -> Query<'q, MySql, MySqlArguments> {
    for value in values {
        query = match value {
            FieldValue::Text(text) => query.bind(text),
            FieldValue::Timestamp(time) => query.bind(time),
        };
    }
    query
}

fn row_to_fields(row: &MySqlRow) -> Result<FieldMap> {
    let mut fields = FieldMap::new();
    for column in row.columns() {
        let index = column.ordinal();
        let value = match column.type_info().name() {
            "TIMESTAMP" => row
                .try_get::<Option<DateTime<Utc>>, _>(index)?
                .map(FieldValue::Timestamp),
            "DATETIME" => row
                .try_get::<Option<NaiveDateTime>, _>(index)?
                .map(|time| FieldValue::Timestamp(time.and_utc())),
            _ => row.try_get::<Option<String>, _>(index)?.map(FieldValue::Text),
        };
        if let Some(value) = value {
            fields.insert(column.name().to_string(), value);
        }
    }
    Ok(fields)
}

/// Thin CRUD wrapper over a MySQL pool. Registered migrations run once, ahead
/// of the first statement issued through it.
pub struct Sql {
    pool: MySqlPool,
    migrations: Migrations,
    migrated: OnceCell<()>,
}

impl Sql {
    pub fn new(pool: MySqlPool, migrations: Migrations) -> Self {
        Self {
            pool,
            migrations,
            migrated: OnceCell::new(),
        }
    }

    async fn migrate(&self) -> Result<()> {
        self.migrated
            .get_or_try_init(|| async {
                self.migrations
                    .migrate(&self.pool)
                    .await
                    .tap_err(|e| error!("Migration failed: {:?}", e))
            })
            .await?;
        Ok(())
    }

    /// Inserts the record, stamping `created_at` and `updated_at`.
    pub async fn save<T: TableFields>(&self, record: &T) -> Result<()> {
        self.migrate().await?;

        let now = Utc::now();
        let mut fields = record.fields();
        fields.entry("created_at".to_string()).or_insert(now.into());
        fields.entry("updated_at".to_string()).or_insert(now.into());

        let (names, values): (Vec<String>, Vec<FieldValue>) = fields.into_iter().unzip();
        let query = insert_query(record.table(), &names);
        debug!("DB:Query table={} query={}", record.table(), query);

        bind_values(sqlx::query(&query), values)
            .execute(&self.pool)
            .await
            .tap_err(|e| error!("Save to {} failed: {:?}", record.table(), e))?;
        Ok(())
    }

    /// Updates every field but `index`, targeting the row whose `index` column
    /// equals the record's value for it.
    pub async fn update<T: TableFields>(&self, record: &T, index: &str) -> Result<u64> {
        self.migrate().await?;

        let mut fields = record.fields();
        fields.insert("updated_at".to_string(), Utc::now().into());
        let index_value = fields.remove(index).ok_or(Error::IndexKeyNotFound)?;

        let (names, mut values): (Vec<String>, Vec<FieldValue>) = fields.into_iter().unzip();
        values.push(index_value);
        let query = update_query(record.table(), &names, index);
        debug!("DB:Query table={} query={}", record.table(), query);

        let result = bind_values(sqlx::query(&query), values)
            .execute(&self.pool)
            .await
            .tap_err(|e| error!("Update of {} failed: {:?}", record.table(), e))?;
        Ok(result.rows_affected())
    }

    pub async fn get(&self, table: &str, index: &str, value: &str) -> Result<Option<FieldMap>> {
        self.migrate().await?;

        let query = select_item_query(table, index);
        debug!("DB:Query table={} query={}", table, query);

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .tap_err(|e| error!("Get from {} failed: {:?}", table, e))?;
        row.as_ref().map(row_to_fields).transpose()
    }

    pub async fn get_all(&self, table: &str, order: &str, order_by: &str) -> Result<Vec<FieldMap>> {
        self.migrate().await?;

        let query = select_all_query(table, order_by, Order::from_word(order));
        debug!("DB:Query table={} query={}", table, query);
        self.fetch_all(table, &query).await
    }

    /// Returns one page of records along with the table's total record count.
    pub async fn get_all_per_page(
        &self,
        table: &str,
        order: &str,
        order_by: &str,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<FieldMap>, i64)> {
        let Some((limit, offset)) = page_window(page, per_page) else {
            let records = self.get_all(table, order, order_by).await?;
            let total = records.len() as i64;
            return Ok((records, total));
        };

        let total = self.count(table, "public_id").await?;
        if offset >= total {
            return Ok((vec![], total));
        }

        let query = select_limited_query(table, order_by, Order::from_word(order), limit, offset);
        debug!("DB:Query table={} query={}", table, query);
        let records = self.fetch_all(table, &query).await?;
        Ok((records, total))
    }

    pub async fn count(&self, table: &str, index: &str) -> Result<i64> {
        self.migrate().await?;

        let query = count_query(table, index);
        debug!("DB:Query table={} query={}", table, query);

        sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map(|row| row.get::<i64, _>(0))
            .tap_err(|e| error!("Count of {} failed: {:?}", table, e))
            .map_err(Into::into)
    }

    pub async fn delete(&self, table: &str, index: &str, value: &str) -> Result<u64> {
        self.migrate().await?;

        let query = delete_query(table, index);
        debug!("DB:Query table={} query={}", table, query);

        let result = sqlx::query(&query)
            .bind(value)
            .execute(&self.pool)
            .await
            .tap_err(|e| error!("Delete from {} failed: {:?}", table, e))?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, table: &str, query: &str) -> Result<Vec<FieldMap>> {
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .tap_err(|e| error!("Select from {} failed: {:?}", table, e))?;
        rows.iter().map(row_to_fields).collect()
    }
}
