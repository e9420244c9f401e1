//! Persistent store for recorded stock summaries, backed by SQLite.

use anyhow::{Context, Result, bail};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

use crate::currency_provider::{InvalidArgument, price_column};
use crate::summary::{Summary, SummaryRow};

const TABLE: &str = "stockSummary";

/// Append-only table of stock summaries with one converted price column per
/// configured currency. The column set is fixed when the table is created;
/// changing currencies on an existing database is a schema change, not a
/// config edit.
#[derive(Debug)]
pub struct SummaryStore {
    pool: SqlitePool,
    columns: Vec<String>,
}

impl SummaryStore {
    /// Opens the database at `path`, creating the file and the table when
    /// missing, and verifies an existing table carries every configured
    /// currency column.
    pub async fn open(path: &Path, currencies: &[String]) -> Result<Self> {
        let mut columns = Vec::new();
        for code in currencies {
            let column = price_column(&code.to_lowercase())?;
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        if columns.is_empty() {
            return Err(InvalidArgument::new("at least one target currency is required").into());
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        // All access goes through a single connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        let mut ddl = format!(
            "CREATE TABLE IF NOT EXISTS {TABLE} (\
             id INTEGER PRIMARY KEY AUTOINCREMENT, \
             date TEXT NOT NULL, \
             name TEXT NOT NULL, \
             stockSymbol TEXT NOT NULL, \
             priceUSD REAL NOT NULL"
        );
        for column in &columns {
            ddl.push_str(&format!(", {column} REAL NOT NULL"));
        }
        ddl.push(')');
        sqlx::query(&ddl)
            .execute(&pool)
            .await
            .context("Failed to create stock summary table")?;

        // No migration path: an existing table must already carry every
        // configured column.
        let info = sqlx::query(&format!("PRAGMA table_info({TABLE})"))
            .fetch_all(&pool)
            .await?;
        let existing: BTreeSet<String> = info
            .iter()
            .filter_map(|row| row.try_get::<String, _>("name").ok())
            .collect();
        for column in &columns {
            if !existing.contains(column) {
                bail!(
                    "column {column} is missing from {TABLE}; the schema is fixed when the \
                     table is created, recreate the database to change currencies"
                );
            }
        }

        debug!("Store ready at {} with columns {:?}", path.display(), columns);
        Ok(SummaryStore { pool, columns })
    }

    /// Converted price columns this store was opened with, in config order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Inserts a summary and returns the assigned row id.
    pub async fn append(&self, summary: &Summary) -> Result<i64> {
        let expected: BTreeSet<&str> = self.columns.iter().map(String::as_str).collect();
        let actual: BTreeSet<&str> = summary.converted.keys().map(String::as_str).collect();
        if expected != actual {
            bail!(
                "converted price columns {actual:?} do not match the store schema {expected:?}"
            );
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("INSERT INTO {TABLE} (date, name, stockSymbol, priceUSD"));
        for column in &self.columns {
            builder.push(format!(", {column}"));
        }
        builder.push(") VALUES (");
        {
            let mut values = builder.separated(", ");
            values.push_bind(summary.date.to_rfc3339());
            values.push_bind(&summary.name);
            values.push_bind(&summary.stock_symbol);
            values.push_bind(summary.price_usd);
            for column in &self.columns {
                values.push_bind(summary.converted[column]);
            }
            values.push_unseparated(")");
        }

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .context("Failed to insert stock summary row")?;
        Ok(result.last_insert_rowid())
    }

    /// All rows in insertion order.
    pub async fn list_all(&self) -> Result<Vec<SummaryRow>> {
        let query = format!("SELECT * FROM {TABLE} ORDER BY id");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to read stock summary rows")?;
        rows.iter().map(|row| self.row_from(row)).collect()
    }

    /// The row with the given id, or `None` when absent.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<SummaryRow>> {
        let query = format!("SELECT * FROM {TABLE} WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read stock summary row {id}"))?;
        row.as_ref().map(|row| self.row_from(row)).transpose()
    }

    fn row_from(&self, row: &SqliteRow) -> Result<SummaryRow> {
        let mut converted = BTreeMap::new();
        for column in &self.columns {
            converted.insert(column.clone(), row.try_get(column.as_str())?);
        }
        Ok(SummaryRow {
            id: row.try_get("id")?,
            date: row.try_get("date")?,
            name: row.try_get("name")?,
            stock_symbol: row.try_get("stockSymbol")?,
            price_usd: row.try_get("priceUSD")?,
            converted,
        })
    }
}
