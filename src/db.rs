use anyhow::Context;
use sqlx::{error::ErrorKind, postgres::PgPoolOptions, PgPool};

use crate::config::PoolConfig;

pub async fn connect(database_url: &str, pool: &PoolConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(pool.acquire_timeout)
        .idle_timeout(Some(pool.idle_timeout))
        .max_lifetime(Some(pool.max_lifetime))
        .connect(database_url)
        .await
        .context("connect to database")
}

/// Integrity-constraint class of a database error. `None` for unclassified
/// server errors (`ErrorKind::Other`) and for transport or pool failures.
pub(crate) fn violation_kind(e: &sqlx::Error) -> Option<ErrorKind> {
    match e {
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::Other => None,
            kind => Some(kind),
        },
        _ => None,
    }
}
