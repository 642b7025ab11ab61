//! Infrastructure Database Layer
//!
//! This crate provides PostgreSQL persistence for product accounting
//! configurations using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: repositories hold the SQL,
//! adapters implement the `domain_accounting` ports on top of them.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresMappingStore;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/accounting")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresMappingStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresMappingStore, PostgresReferenceDirectory};
pub use error::{db_to_port_error, DatabaseError};
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
