//! Reference data repository implementation
//!
//! Products, GL accounts, payment types and charges are owned by other
//! subsystems. The accounting engine only reads them, except for the insert
//! helpers used to seed test databases.

use sqlx::PgPool;

use crate::error::DatabaseError;
use crate::repositories::mapping::{ChargeKind, GlAccountCategory, ProductType};

/// Repository for reference data lookups
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn product_exists(&self, product_id: i64, product_type: ProductType) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE product_id = $1 AND product_type = $2)",
        )
        .bind(product_id)
        .bind(product_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Category of a GL account, `None` if the account does not exist
    pub async fn gl_account_category(&self, gl_account_id: i64) -> Result<Option<GlAccountCategory>, DatabaseError> {
        let category = sqlx::query_scalar::<_, GlAccountCategory>(
            "SELECT category FROM gl_accounts WHERE gl_account_id = $1",
        )
        .bind(gl_account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn payment_type_exists(&self, payment_type_id: i64) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM payment_types WHERE payment_type_id = $1)",
        )
        .bind(payment_type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Kind of a charge, `None` if the charge does not exist
    pub async fn charge_kind(&self, charge_id: i64) -> Result<Option<ChargeKind>, DatabaseError> {
        let kind = sqlx::query_scalar::<_, ChargeKind>("SELECT kind FROM charges WHERE charge_id = $1")
            .bind(charge_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(kind)
    }

    // ------------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------------

    pub async fn insert_product(
        &self,
        product_id: i64,
        product_type: ProductType,
        name: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO products (product_id, product_type, name) VALUES ($1, $2, $3)")
            .bind(product_id)
            .bind(product_type)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_gl_account(
        &self,
        gl_account_id: i64,
        gl_code: &str,
        name: &str,
        category: GlAccountCategory,
    ) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO gl_accounts (gl_account_id, gl_code, name, category) VALUES ($1, $2, $3, $4)")
            .bind(gl_account_id)
            .bind(gl_code)
            .bind(name)
            .bind(category)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_payment_type(&self, payment_type_id: i64, name: &str) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO payment_types (payment_type_id, name) VALUES ($1, $2)")
            .bind(payment_type_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_charge(&self, charge_id: i64, name: &str, kind: ChargeKind) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO charges (charge_id, name, kind) VALUES ($1, $2, $3)")
            .bind(charge_id)
            .bind(name)
            .bind(kind)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
