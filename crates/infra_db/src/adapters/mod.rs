//! Domain Adapters
//!
//! This module provides adapter implementations for the accounting domain
//! ports, connecting them to the PostgreSQL database layer.
//!
//! # Architecture
//!
//! Each adapter:
//! - Implements a domain port trait
//! - Translates between domain records and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::{PostgresMappingStore, PostgresReferenceDirectory};
//! use domain_accounting::MappingLifecycleCoordinator;
//! use std::sync::Arc;
//!
//! let coordinator = MappingLifecycleCoordinator::new(
//!     Arc::new(PostgresMappingStore::new(pool.clone())),
//!     Arc::new(PostgresReferenceDirectory::new(pool)),
//! );
//! ```

pub mod mapping;
pub mod reference;

pub use mapping::PostgresMappingStore;
pub use reference::PostgresReferenceDirectory;
