//! Named-column access over result-set rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::postgres::PgRow;

/// A result-set row with typed, named-column getters.
///
/// Column names are part of the datastore contract and are matched exactly.
pub struct ProcRow(PgRow);

impl ProcRow {
    pub(crate) fn new(row: PgRow) -> Self {
        Self(row)
    }

    pub fn int(&self, column: &str) -> Result<i32, sqlx::Error> {
        self.0.try_get(column)
    }

    pub fn opt_int(&self, column: &str) -> Result<Option<i32>, sqlx::Error> {
        self.0.try_get(column)
    }

    pub fn bigint(&self, column: &str) -> Result<i64, sqlx::Error> {
        self.0.try_get(column)
    }

    pub fn string(&self, column: &str) -> Result<String, sqlx::Error> {
        self.0.try_get(column)
    }

    pub fn opt_string(&self, column: &str) -> Result<Option<String>, sqlx::Error> {
        self.0.try_get(column)
    }

    pub fn boolean(&self, column: &str) -> Result<bool, sqlx::Error> {
        self.0.try_get(column)
    }

    pub fn decimal(&self, column: &str) -> Result<Decimal, sqlx::Error> {
        self.0.try_get(column)
    }

    pub fn timestamp(&self, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
        self.0.try_get(column)
    }

    pub fn bytes(&self, column: &str) -> Result<Vec<u8>, sqlx::Error> {
        self.0.try_get(column)
    }
}
