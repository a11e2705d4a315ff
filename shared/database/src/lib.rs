//! Data access for the trial management system.
//!
//! [`TrialManagementRepository`] is the entry point. It runs on any
//! [`TrialStore`]: [`PgTrialStore`] in production, [`InMemoryTrialStore`]
//! where no database is available.

pub mod postgres;
pub mod schema;
pub mod store;
pub mod repositories;

pub use postgres::{PostgresPool, create_postgres_pool, health_check as postgres_health_check};
pub use repositories::*;
pub use schema::create_schema;
pub use store::{
    Include, InMemoryTrialStore, PgTrialStore, StoreError, StoreResult, TrialStore,
};
pub use trial_utils::DatabaseConfig;

use anyhow::Result;

/// Connects to PostgreSQL and makes sure the schema exists.
pub async fn initialize_store(config: &DatabaseConfig) -> Result<PgTrialStore> {
    let pool = create_postgres_pool(
        &config.postgres_url,
        config.max_connections,
        config.connection_timeout(),
    )
    .await?;

    create_schema(&pool).await?;

    Ok(PgTrialStore::new(pool))
}

/// Convenience for callers that only need the facade.
pub async fn connect_repository(config: &DatabaseConfig) -> Result<TrialManagementRepository> {
    let store = initialize_store(config).await?;
    Ok(TrialManagementRepository::with_store(store))
}
