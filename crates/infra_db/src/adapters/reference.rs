//! PostgreSQL Reference Directory Adapter
//!
//! Implements the `ReferenceDirectory` port over [`ReferenceRepository`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{ChargeId, DomainPort, GlAccountId, HealthCheckResult, HealthCheckable, PaymentTypeId, PortError};
use domain_accounting::{ChargeKind, GlAccountCategory, ProductRef, ReferenceDirectory};

use crate::adapters::mapping::database_health;
use crate::error::db_to_port_error;
use crate::repositories::mapping::ProductType as DbProductType;
use crate::repositories::ReferenceRepository;

/// PostgreSQL-backed implementation of the ReferenceDirectory port
#[derive(Debug, Clone)]
pub struct PostgresReferenceDirectory {
    repository: ReferenceRepository,
    pool: PgPool,
}

impl PostgresReferenceDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ReferenceRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &ReferenceRepository {
        &self.repository
    }
}

impl DomainPort for PostgresReferenceDirectory {}

#[async_trait]
impl HealthCheckable for PostgresReferenceDirectory {
    async fn health_check(&self) -> HealthCheckResult {
        database_health("postgres-reference-directory", &self.pool).await
    }
}

#[async_trait]
impl ReferenceDirectory for PostgresReferenceDirectory {
    #[instrument(skip(self), fields(product = %product))]
    async fn product_exists(&self, product: ProductRef) -> Result<bool, PortError> {
        self.repository
            .product_exists(product.id.value(), DbProductType::from(product.product_type))
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(gl_account = %id))]
    async fn gl_account_category(&self, id: GlAccountId) -> Result<Option<GlAccountCategory>, PortError> {
        let category = self
            .repository
            .gl_account_category(id.value())
            .await
            .map_err(db_to_port_error)?;
        Ok(category.map(Into::into))
    }

    async fn payment_type_exists(&self, id: PaymentTypeId) -> Result<bool, PortError> {
        self.repository
            .payment_type_exists(id.value())
            .await
            .map_err(db_to_port_error)
    }

    async fn charge_kind(&self, id: ChargeId) -> Result<Option<ChargeKind>, PortError> {
        let kind = self
            .repository
            .charge_kind(id.value())
            .await
            .map_err(db_to_port_error)?;
        Ok(kind.map(Into::into))
    }
}
