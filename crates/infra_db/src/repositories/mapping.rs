//! Accounting mapping repository implementation
//!
//! This module provides database access for product accounting
//! configurations: the configuration record, GL account mappings, and the
//! payment-channel and charge-income override tables.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use domain_accounting::{
    ChargeKind as DomainChargeKind, GlAccountCategory as DomainCategory, MappingChangeSet,
    ProductRef, ProductType as DomainProductType,
};

use crate::error::DatabaseError;

/// Repository for product accounting configurations
///
/// Reads return raw rows; all writes for one operation go through
/// [`MappingRepository::apply`] inside a single transaction.
#[derive(Debug, Clone)]
pub struct MappingRepository {
    pool: PgPool,
}

impl MappingRepository {
    /// Creates a new MappingRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the configuration record and every mapping row of a product
    ///
    /// Reads run in one repeatable-read transaction so the four tables are
    /// observed at the same point in time.
    pub async fn load(&self, product: ProductRef) -> Result<StoredConfiguration, DatabaseError> {
        let product_id = product.id.value();
        let product_type = ProductType::from(product.product_type);
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let configuration = sqlx::query_as::<_, ConfigurationRow>(
            r#"
            SELECT
                product_id,
                product_type,
                accounting_method,
                deposit_account_type,
                dormancy_tracking,
                created_at,
                updated_at
            FROM product_accounting_configurations
            WHERE product_id = $1 AND product_type = $2
            "#,
        )
        .bind(product_id)
        .bind(product_type)
        .fetch_optional(&mut *tx)
        .await?;

        let gl_mappings = sqlx::query_as::<_, GlMappingRow>(
            r#"
            SELECT slot, gl_account_id, category
            FROM product_gl_account_mappings
            WHERE product_id = $1 AND product_type = $2
            ORDER BY mapping_id
            "#,
        )
        .bind(product_id)
        .bind(product_type)
        .fetch_all(&mut *tx)
        .await?;

        let payment_channels = sqlx::query_as::<_, PaymentChannelRow>(
            r#"
            SELECT payment_type_id, fund_source_account_id
            FROM product_payment_channel_mappings
            WHERE product_id = $1 AND product_type = $2
            ORDER BY payment_type_id
            "#,
        )
        .bind(product_id)
        .bind(product_type)
        .fetch_all(&mut *tx)
        .await?;

        let charge_mappings = sqlx::query_as::<_, ChargeIncomeRow>(
            r#"
            SELECT charge_id, income_account_id, charge_kind
            FROM product_charge_income_mappings
            WHERE product_id = $1 AND product_type = $2
            ORDER BY charge_id
            "#,
        )
        .bind(product_id)
        .bind(product_type)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StoredConfiguration {
            configuration,
            gl_mappings,
            payment_channels,
            charge_mappings,
        })
    }

    /// Applies a change set in one transaction
    ///
    /// Any failure rolls the whole set back. Updates and deletes that match
    /// no row fail with `DatabaseError::NotFound`; duplicate inserts fail
    /// with `DatabaseError::DuplicateEntry` from the unique constraints.
    pub async fn apply(&self, product: ProductRef, changes: &MappingChangeSet) -> Result<(), DatabaseError> {
        let product_id = product.id.value();
        let product_type = ProductType::from(product.product_type);
        let mut tx = self.pool.begin().await?;

        if changes.delete_configuration {
            // mapping rows cascade
            let result = sqlx::query(
                "DELETE FROM product_accounting_configurations WHERE product_id = $1 AND product_type = $2",
            )
            .bind(product_id)
            .bind(product_type)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::not_found("AccountingConfiguration", product));
            }
            tx.commit().await?;
            debug!("Configuration deleted");
            return Ok(());
        }

        if let Some(config) = &changes.upsert_configuration {
            sqlx::query(
                r#"
                INSERT INTO product_accounting_configurations (
                    product_id, product_type, accounting_method, deposit_account_type,
                    dormancy_tracking, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (product_id, product_type) DO UPDATE SET
                    accounting_method = EXCLUDED.accounting_method,
                    deposit_account_type = EXCLUDED.deposit_account_type,
                    dormancy_tracking = EXCLUDED.dormancy_tracking,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(product_id)
            .bind(product_type)
            .bind(config.method.code())
            .bind(config.deposit_account_type.code())
            .bind(config.dormancy_tracking)
            .bind(config.created_at)
            .bind(config.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        // ---- GL account mappings ----

        if changes.delete_all_gl_mappings {
            let result = sqlx::query(
                "DELETE FROM product_gl_account_mappings WHERE product_id = $1 AND product_type = $2",
            )
            .bind(product_id)
            .bind(product_type)
            .execute(&mut *tx)
            .await?;
            debug!(rows = result.rows_affected(), "Cleared GL mappings");
        }

        for slot in &changes.gl_deletes {
            let result = sqlx::query(
                "DELETE FROM product_gl_account_mappings WHERE product_id = $1 AND product_type = $2 AND slot = $3",
            )
            .bind(product_id)
            .bind(product_type)
            .bind(slot.code())
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::not_found("GlAccountMapping", slot));
            }
        }

        for mapping in &changes.gl_updates {
            let result = sqlx::query(
                r#"
                UPDATE product_gl_account_mappings
                SET gl_account_id = $4, category = $5, updated_at = NOW()
                WHERE product_id = $1 AND product_type = $2 AND slot = $3
                "#,
            )
            .bind(product_id)
            .bind(product_type)
            .bind(mapping.slot.code())
            .bind(mapping.gl_account_id.value())
            .bind(GlAccountCategory::from(mapping.category))
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::not_found("GlAccountMapping", mapping.slot));
            }
        }

        for mapping in &changes.gl_inserts {
            sqlx::query(
                r#"
                INSERT INTO product_gl_account_mappings (product_id, product_type, slot, gl_account_id, category)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(product_id)
            .bind(product_type)
            .bind(mapping.slot.code())
            .bind(mapping.gl_account_id.value())
            .bind(GlAccountCategory::from(mapping.category))
            .execute(&mut *tx)
            .await?;
        }

        // ---- Payment channel mappings ----

        for payment_type_id in &changes.channel_deletes {
            let result = sqlx::query(
                r#"
                DELETE FROM product_payment_channel_mappings
                WHERE product_id = $1 AND product_type = $2 AND payment_type_id = $3
                "#,
            )
            .bind(product_id)
            .bind(product_type)
            .bind(payment_type_id.value())
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::not_found("PaymentChannelMapping", payment_type_id));
            }
        }

        for mapping in &changes.channel_updates {
            let result = sqlx::query(
                r#"
                UPDATE product_payment_channel_mappings
                SET fund_source_account_id = $4, updated_at = NOW()
                WHERE product_id = $1 AND product_type = $2 AND payment_type_id = $3
                "#,
            )
            .bind(product_id)
            .bind(product_type)
            .bind(mapping.payment_type_id.value())
            .bind(mapping.fund_source_account_id.value())
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::not_found("PaymentChannelMapping", mapping.payment_type_id));
            }
        }

        for mapping in &changes.channel_inserts {
            sqlx::query(
                r#"
                INSERT INTO product_payment_channel_mappings (
                    product_id, product_type, payment_type_id, fund_source_account_id
                ) VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(product_id)
            .bind(product_type)
            .bind(mapping.payment_type_id.value())
            .bind(mapping.fund_source_account_id.value())
            .execute(&mut *tx)
            .await?;
        }

        // ---- Charge income mappings ----

        for charge_id in &changes.charge_deletes {
            let result = sqlx::query(
                r#"
                DELETE FROM product_charge_income_mappings
                WHERE product_id = $1 AND product_type = $2 AND charge_id = $3
                "#,
            )
            .bind(product_id)
            .bind(product_type)
            .bind(charge_id.value())
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::not_found("ChargeIncomeMapping", charge_id));
            }
        }

        for mapping in &changes.charge_updates {
            let result = sqlx::query(
                r#"
                UPDATE product_charge_income_mappings
                SET income_account_id = $4, updated_at = NOW()
                WHERE product_id = $1 AND product_type = $2 AND charge_id = $3
                "#,
            )
            .bind(product_id)
            .bind(product_type)
            .bind(mapping.charge_id.value())
            .bind(mapping.income_account_id.value())
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::not_found("ChargeIncomeMapping", mapping.charge_id));
            }
        }

        for mapping in &changes.charge_inserts {
            sqlx::query(
                r#"
                INSERT INTO product_charge_income_mappings (
                    product_id, product_type, charge_id, income_account_id, charge_kind
                ) VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(product_id)
            .bind(product_type)
            .bind(mapping.charge_id.value())
            .bind(mapping.income_account_id.value())
            .bind(ChargeKind::from(mapping.kind))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(row_operations = changes.row_operations(), "Change set committed");
        Ok(())
    }
}

// ============================================================================
// Type definitions
// ============================================================================

/// Product type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "product_type", rename_all = "snake_case")]
pub enum ProductType {
    Loan,
    Savings,
    Share,
}

/// GL account category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "gl_account_category", rename_all = "snake_case")]
pub enum GlAccountCategory {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

/// Charge kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "charge_kind", rename_all = "snake_case")]
pub enum ChargeKind {
    Fee,
    Penalty,
}

impl From<DomainProductType> for ProductType {
    fn from(value: DomainProductType) -> Self {
        match value {
            DomainProductType::Loan => ProductType::Loan,
            DomainProductType::Savings => ProductType::Savings,
            DomainProductType::Share => ProductType::Share,
        }
    }
}

impl From<ProductType> for DomainProductType {
    fn from(value: ProductType) -> Self {
        match value {
            ProductType::Loan => DomainProductType::Loan,
            ProductType::Savings => DomainProductType::Savings,
            ProductType::Share => DomainProductType::Share,
        }
    }
}

impl From<DomainCategory> for GlAccountCategory {
    fn from(value: DomainCategory) -> Self {
        match value {
            DomainCategory::Asset => GlAccountCategory::Asset,
            DomainCategory::Liability => GlAccountCategory::Liability,
            DomainCategory::Equity => GlAccountCategory::Equity,
            DomainCategory::Income => GlAccountCategory::Income,
            DomainCategory::Expense => GlAccountCategory::Expense,
        }
    }
}

impl From<GlAccountCategory> for DomainCategory {
    fn from(value: GlAccountCategory) -> Self {
        match value {
            GlAccountCategory::Asset => DomainCategory::Asset,
            GlAccountCategory::Liability => DomainCategory::Liability,
            GlAccountCategory::Equity => DomainCategory::Equity,
            GlAccountCategory::Income => DomainCategory::Income,
            GlAccountCategory::Expense => DomainCategory::Expense,
        }
    }
}

impl From<DomainChargeKind> for ChargeKind {
    fn from(value: DomainChargeKind) -> Self {
        match value {
            DomainChargeKind::Fee => ChargeKind::Fee,
            DomainChargeKind::Penalty => ChargeKind::Penalty,
        }
    }
}

impl From<ChargeKind> for DomainChargeKind {
    fn from(value: ChargeKind) -> Self {
        match value {
            ChargeKind::Fee => DomainChargeKind::Fee,
            ChargeKind::Penalty => DomainChargeKind::Penalty,
        }
    }
}

/// Database row for the configuration record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConfigurationRow {
    pub product_id: i64,
    pub product_type: ProductType,
    pub accounting_method: i16,
    pub deposit_account_type: i16,
    pub dormancy_tracking: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for a GL account mapping
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GlMappingRow {
    pub slot: String,
    pub gl_account_id: i64,
    pub category: GlAccountCategory,
}

/// Database row for a payment channel mapping
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentChannelRow {
    pub payment_type_id: i64,
    pub fund_source_account_id: i64,
}

/// Database row for a charge income mapping
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChargeIncomeRow {
    pub charge_id: i64,
    pub income_account_id: i64,
    pub charge_kind: ChargeKind,
}

/// Everything stored for one product, as raw rows
#[derive(Debug, Clone, Default)]
pub struct StoredConfiguration {
    pub configuration: Option<ConfigurationRow>,
    pub gl_mappings: Vec<GlMappingRow>,
    pub payment_channels: Vec<PaymentChannelRow>,
    pub charge_mappings: Vec<ChargeIncomeRow>,
}
