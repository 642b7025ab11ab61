//! Repository implementations
//!
//! Repositories encapsulate SQL and map between database rows and
//! primitive values. Conversion to domain types happens in the adapters.
//!
//! # Architecture
//!
//! - Runtime-checked queries (`sqlx::query` / `query_as` with `FromRow`)
//! - PostgreSQL enums mirrored as `sqlx::Type` enums
//! - One transaction per change set

pub mod mapping;
pub mod reference;

pub use mapping::{MappingRepository, StoredConfiguration};
pub use reference::ReferenceRepository;
