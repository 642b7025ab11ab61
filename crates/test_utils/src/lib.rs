//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! accounting configuration test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixture chart of accounts and reference data
//! - `builders`: Configuration payload builders
//! - `database`: PostgreSQL container management and seeding
//! - `assertions`: Assertion helpers for mapping errors and snapshots
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
