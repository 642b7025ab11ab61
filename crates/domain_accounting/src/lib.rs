//! Product Accounting Configuration Domain
//!
//! This crate binds financial products (loans, savings, shares) to the GL
//! accounts their transactions post to. A product's accounting method decides
//! which slots must be bound; the rule table is the single source of that
//! knowledge.
//!
//! # Architecture
//!
//! The domain layer is infrastructure-agnostic:
//! - **Rule table**: `(product type, method, deposit type) -> slot set`
//! - **Payload parsing**: loosely typed JSON to a typed configuration request
//! - **Assembly**: payload plus slot plan to GL mapping records
//! - **Reconciliation**: keyed set difference for advanced collections
//! - **Lifecycle**: create, update (in place or recreate), delete, fetch
//! - **Ports**: `MappingStore` and `ReferenceDirectory`
//!
//! # Configuration Lifecycle
//!
//! ```text
//! Unconfigured -> Configured(method) -> Configured(method')  (rows recreated)
//!                                   \-> Unconfigured        (method NONE)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_accounting::{MappingLifecycleCoordinator, ProductRef};
//!
//! let coordinator = MappingLifecycleCoordinator::new(store, directory);
//! coordinator.create(ProductRef::loan(7), &payload, None).await?;
//! let outcome = coordinator.update(ProductRef::loan(7), &changes, None).await?;
//! ```

pub mod assembler;
pub mod change_tracker;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod payload;
pub mod ports;
pub mod product;
pub mod reconcile;
pub mod rule_table;
pub mod slot;

pub use assembler::MappingAssembler;
pub use change_tracker::{ChangeTracker, Changes};
pub use error::{FieldError, MappingError, ValidationCode, ValidationErrors};
pub use lifecycle::{AccountingConfigurationView, CommandOutcome, MappingLifecycleCoordinator, SlotMappingView};
pub use model::{
    AccountingConfiguration, ChargeIncomeMapping, ChargeKind, ConfigurationSnapshot, ConfigurationState,
    GlAccountMapping, MappingChangeSet, PaymentChannelMapping,
};
pub use payload::{ChargeIncomeEntry, ConfigurationPayload, PaymentChannelEntry};
pub use ports::{MappingStore, ReferenceDirectory};
pub use product::{AccountingMethod, DepositAccountType, ProductRef, ProductType};
pub use reconcile::{reconcile, AdvancedMappingHandler, Reconciliation};
pub use rule_table::{RuleTable, SlotFlags, SlotPlan, SlotPresence, SlotRule, UnsupportedMethod};
pub use slot::{GlAccountCategory, MappingSlot, PostingBasis};

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockMappingStore, MockReferenceDirectory};
