//! Accounting Domain Ports
//!
//! This module defines the port interfaces the accounting engine needs from
//! the outside world, enabling swappable implementations (PostgreSQL, mock).
//!
//! # Architecture
//!
//! - **`MappingStore`**: loads a product's stored configuration and applies
//!   a [`MappingChangeSet`] atomically.
//! - **`ReferenceDirectory`**: answers existence and classification questions
//!   about products, GL accounts, payment types and charges.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_accounting::{MappingLifecycleCoordinator, MappingStore, ReferenceDirectory};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn MappingStore> = Arc::new(PostgresMappingStore::new(pool.clone()));
//! let directory: Arc<dyn ReferenceDirectory> = Arc::new(PostgresReferenceDirectory::new(pool));
//! let coordinator = MappingLifecycleCoordinator::new(store, directory);
//! ```

use async_trait::async_trait;

use core_kernel::{
    ChargeId, DomainPort, GlAccountId, HealthCheckable, OperationMetadata, PaymentTypeId, PortError,
};

use crate::model::{ChargeKind, ConfigurationSnapshot, MappingChangeSet};
use crate::product::ProductRef;
use crate::slot::GlAccountCategory;

/// Storage for product accounting configurations
#[async_trait]
pub trait MappingStore: DomainPort + HealthCheckable {
    /// Loads everything stored for a product
    ///
    /// Returns an empty snapshot when nothing has been configured yet.
    async fn load(
        &self,
        product: ProductRef,
        metadata: Option<OperationMetadata>,
    ) -> Result<ConfigurationSnapshot, PortError>;

    /// Applies every write in `changes` atomically
    ///
    /// Implementations must either persist the whole change set or nothing.
    /// A duplicate mapping surfaces as `PortError::Conflict`.
    async fn apply(
        &self,
        product: ProductRef,
        changes: &MappingChangeSet,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// Read-only lookups of data owned by other subsystems
#[async_trait]
pub trait ReferenceDirectory: DomainPort + HealthCheckable {
    async fn product_exists(&self, product: ProductRef) -> Result<bool, PortError>;

    /// Category of a GL account, or `None` if it does not exist
    async fn gl_account_category(&self, id: GlAccountId) -> Result<Option<GlAccountCategory>, PortError>;

    async fn payment_type_exists(&self, id: PaymentTypeId) -> Result<bool, PortError>;

    /// Kind of a charge, or `None` if it does not exist
    async fn charge_kind(&self, id: ChargeId) -> Result<Option<ChargeKind>, PortError>;
}

/// Mock implementations of the accounting ports for testing
///
/// These adapters keep state in memory and are useful for unit testing
/// without a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of MappingStore
    ///
    /// Counts `apply` calls so tests can assert that no-op updates issue no writes,
    /// and keeps the most recent change set for inspection.
    #[derive(Debug, Default)]
    pub struct MockMappingStore {
        snapshots: Arc<RwLock<HashMap<ProductRef, ConfigurationSnapshot>>>,
        apply_calls: AtomicUsize,
        last_applied: RwLock<Option<MappingChangeSet>>,
    }

    impl MockMappingStore {
        /// Creates a new mock store
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of `apply` calls received, including failed ones
        pub fn apply_calls(&self) -> usize {
            self.apply_calls.load(Ordering::SeqCst)
        }

        /// Change set received by the most recent `apply` call
        pub async fn last_applied(&self) -> Option<MappingChangeSet> {
            self.last_applied.read().await.clone()
        }

        /// Current stored state for a product
        pub async fn snapshot(&self, product: ProductRef) -> ConfigurationSnapshot {
            self.snapshots.read().await.get(&product).cloned().unwrap_or_default()
        }

        /// Pre-populates the store for a product
        pub async fn seed(&self, product: ProductRef, snapshot: ConfigurationSnapshot) {
            self.snapshots.write().await.insert(product, snapshot);
        }
    }

    impl DomainPort for MockMappingStore {}

    #[async_trait]
    impl HealthCheckable for MockMappingStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                message: Some("Mock adapter always healthy".to_string()),
                ..HealthCheckResult::healthy("mock-mapping-store")
            }
        }
    }

    #[async_trait]
    impl MappingStore for MockMappingStore {
        async fn load(
            &self,
            product: ProductRef,
            _metadata: Option<OperationMetadata>,
        ) -> Result<ConfigurationSnapshot, PortError> {
            Ok(self.snapshot(product).await)
        }

        async fn apply(
            &self,
            product: ProductRef,
            changes: &MappingChangeSet,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.apply_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_applied.write().await = Some(changes.clone());
            let mut snapshots = self.snapshots.write().await;
            let snapshot = snapshots.entry(product).or_default();
            snapshot.apply(changes)
        }
    }

    /// In-memory mock implementation of ReferenceDirectory
    #[derive(Debug, Default, Clone)]
    pub struct MockReferenceDirectory {
        products: HashSet<ProductRef>,
        gl_accounts: HashMap<GlAccountId, GlAccountCategory>,
        payment_types: HashSet<PaymentTypeId>,
        charges: HashMap<ChargeId, ChargeKind>,
    }

    impl MockReferenceDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_product(mut self, product: ProductRef) -> Self {
            self.products.insert(product);
            self
        }

        pub fn with_gl_account(mut self, id: i64, category: GlAccountCategory) -> Self {
            self.gl_accounts.insert(GlAccountId::new(id), category);
            self
        }

        /// Registers a contiguous block of accounts of one category
        pub fn with_gl_accounts(mut self, ids: impl IntoIterator<Item = i64>, category: GlAccountCategory) -> Self {
            for id in ids {
                self.gl_accounts.insert(GlAccountId::new(id), category);
            }
            self
        }

        pub fn with_payment_type(mut self, id: i64) -> Self {
            self.payment_types.insert(PaymentTypeId::new(id));
            self
        }

        pub fn with_charge(mut self, id: i64, kind: ChargeKind) -> Self {
            self.charges.insert(ChargeId::new(id), kind);
            self
        }
    }

    impl DomainPort for MockReferenceDirectory {}

    #[async_trait]
    impl HealthCheckable for MockReferenceDirectory {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-reference-directory")
        }
    }

    #[async_trait]
    impl ReferenceDirectory for MockReferenceDirectory {
        async fn product_exists(&self, product: ProductRef) -> Result<bool, PortError> {
            Ok(self.products.contains(&product))
        }

        async fn gl_account_category(&self, id: GlAccountId) -> Result<Option<GlAccountCategory>, PortError> {
            Ok(self.gl_accounts.get(&id).copied())
        }

        async fn payment_type_exists(&self, id: PaymentTypeId) -> Result<bool, PortError> {
            Ok(self.payment_types.contains(&id))
        }

        async fn charge_kind(&self, id: ChargeId) -> Result<Option<ChargeKind>, PortError> {
            Ok(self.charges.get(&id).copied())
        }
    }
}
