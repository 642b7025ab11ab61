//! Core Kernel - Foundational types shared by the accounting mapping workspace
//!
//! This crate provides the building blocks used across all other crates:
//! - Strongly-typed numeric identifiers for products, GL accounts and reference data
//! - The kernel error type
//! - Port traits and error types for the ports and adapters architecture

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{ProductId, GlAccountId, PaymentTypeId, ChargeId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
