//! Repository trait implementations for the SQLite database.

use crate::Db;
use erp_core::ports::Repository;

mod account;
mod company;
mod fiscal_year;
mod report;
mod stock_item;
mod user;
mod voucher;

impl Repository for Db {
    type Error = sqlx::Error;
}

/// Whether the error is a violated `unique` constraint.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
