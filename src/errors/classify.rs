//! Membership tests for opaque storage errors.
//!
//! Handlers call these before deciding which `ApiError` to build. They never
//! fail: anything that is not a recognised storage error answers `false`.

use std::error::Error as StdError;

/// Postgres `unique_violation`
pub const UNIQUE_VIOLATION: &str = "23505";

fn storage_errors<'a>(err: &'a (dyn StdError + 'static)) -> impl Iterator<Item = &'a sqlx::Error> {
    std::iter::successors(Some(err), |&e| e.source())
        .filter_map(|e| e.downcast_ref::<sqlx::Error>())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// True iff the storage layer rejected a write because the key already exists
pub fn is_already_exists(err: &(dyn StdError + 'static)) -> bool {
    storage_errors(err).any(is_unique_violation)
}

/// True iff the storage layer found no row
pub fn is_not_found(err: &(dyn StdError + 'static)) -> bool {
    storage_errors(err).any(|e| matches!(e, sqlx::Error::RowNotFound))
}

pub fn is_already_exists_anyhow(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<sqlx::Error>())
        .any(is_unique_violation)
}

pub fn is_not_found_anyhow(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<sqlx::Error>())
        .any(|e| matches!(e, sqlx::Error::RowNotFound))
}
