//! PostgreSQL Mapping Store Adapter
//!
//! Implements the `MappingStore` port on top of [`MappingRepository`],
//! translating between raw rows and domain records.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresMappingStore;
//! use domain_accounting::MappingStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn MappingStore> = Arc::new(PostgresMappingStore::new(pool));
//! let snapshot = store.load(ProductRef::loan(7), None).await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, ChargeId, DomainPort, GlAccountId, HealthCheckResult, HealthCheckable, OperationMetadata,
    PaymentTypeId, PortError,
};
use domain_accounting::{
    AccountingConfiguration, AccountingMethod, ChargeIncomeMapping, ConfigurationSnapshot, DepositAccountType,
    GlAccountMapping, MappingChangeSet, MappingSlot, MappingStore, PaymentChannelMapping, ProductRef,
};

use crate::error::{db_to_port_error, DatabaseError};
use crate::repositories::mapping::{ConfigurationRow, GlMappingRow, MappingRepository, StoredConfiguration};

/// PostgreSQL-backed implementation of the MappingStore port
///
/// # Error Handling
///
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - `DatabaseError::DuplicateEntry` -> `PortError::Conflict`
/// - Rows that no longer decode into domain values -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresMappingStore {
    repository: MappingRepository,
    pool: PgPool,
}

impl PostgresMappingStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: MappingRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &MappingRepository {
        &self.repository
    }
}

impl DomainPort for PostgresMappingStore {}

#[async_trait]
impl HealthCheckable for PostgresMappingStore {
    async fn health_check(&self) -> HealthCheckResult {
        database_health("postgres-mapping-store", &self.pool).await
    }
}

#[async_trait]
impl MappingStore for PostgresMappingStore {
    #[instrument(skip(self, _metadata), fields(product = %product))]
    async fn load(
        &self,
        product: ProductRef,
        _metadata: Option<OperationMetadata>,
    ) -> Result<ConfigurationSnapshot, PortError> {
        debug!("Loading accounting configuration");

        let stored = self.repository.load(product).await.map_err(db_to_port_error)?;
        stored_to_snapshot(product, stored).map_err(db_to_port_error)
    }

    #[instrument(skip(self, changes, metadata), fields(product = %product, rows = changes.row_operations()))]
    async fn apply(
        &self,
        product: ProductRef,
        changes: &MappingChangeSet,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        if let Some(correlation_id) = metadata.as_ref().and_then(|m| m.correlation_id.as_deref()) {
            debug!(correlation_id, "Applying change set");
        }

        self.repository
            .apply(product, changes)
            .await
            .map_err(db_to_port_error)
    }
}

/// Runs `SELECT 1` against the pool and times it
pub(crate) async fn database_health(adapter_id: &str, pool: &PgPool) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}

// ============================================================================
// Row conversion
// ============================================================================

fn stored_to_snapshot(product: ProductRef, stored: StoredConfiguration) -> Result<ConfigurationSnapshot, DatabaseError> {
    let configuration = stored
        .configuration
        .map(|row| row_to_configuration(product, row))
        .transpose()?;

    let gl_mappings = stored
        .gl_mappings
        .into_iter()
        .map(|row| row_to_gl_mapping(product, row))
        .collect::<Result<Vec<_>, _>>()?;

    let payment_channels = stored
        .payment_channels
        .into_iter()
        .map(|row| PaymentChannelMapping {
            payment_type_id: PaymentTypeId::new(row.payment_type_id),
            fund_source_account_id: GlAccountId::new(row.fund_source_account_id),
        })
        .collect();

    let charge_mappings = stored
        .charge_mappings
        .into_iter()
        .map(|row| ChargeIncomeMapping {
            charge_id: ChargeId::new(row.charge_id),
            income_account_id: GlAccountId::new(row.income_account_id),
            kind: row.charge_kind.into(),
        })
        .collect();

    Ok(ConfigurationSnapshot {
        configuration,
        gl_mappings,
        payment_channels,
        charge_mappings,
    })
}

fn row_to_configuration(product: ProductRef, row: ConfigurationRow) -> Result<AccountingConfiguration, DatabaseError> {
    let method = AccountingMethod::from_code(i64::from(row.accounting_method)).ok_or_else(|| {
        DatabaseError::CorruptRow(format!("Unknown accounting method code {}", row.accounting_method))
    })?;
    let deposit_account_type = DepositAccountType::from_code(i64::from(row.deposit_account_type))
        .ok_or_else(|| {
            DatabaseError::CorruptRow(format!("Unknown deposit account type {}", row.deposit_account_type))
        })?;

    Ok(AccountingConfiguration {
        product,
        method,
        deposit_account_type,
        dormancy_tracking: row.dormancy_tracking,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_gl_mapping(product: ProductRef, row: GlMappingRow) -> Result<GlAccountMapping, DatabaseError> {
    let slot: MappingSlot = row
        .slot
        .parse()
        .map_err(|e: core_kernel::CoreError| DatabaseError::CorruptRow(e.to_string()))?;

    Ok(GlAccountMapping {
        product,
        slot,
        gl_account_id: GlAccountId::new(row.gl_account_id),
        category: row.category.into(),
    })
}
