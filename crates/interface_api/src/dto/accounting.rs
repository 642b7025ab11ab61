//! Accounting configuration DTOs
//!
//! Configuration payloads are passed to the domain as raw JSON so that
//! unknown keys and mistyped values are reported in the validation batch
//! instead of being rejected by the deserializer.

use serde::{Deserialize, Serialize};

use core_kernel::ProductId;
use domain_accounting::{AccountingMethod, DepositAccountType, ProductRef, ProductType, SlotRule};

use crate::error::ApiError;

/// `/products/:product_type/:product_id/accounting` path segments
#[derive(Debug, Deserialize)]
pub struct ProductPath {
    pub product_type: String,
    pub product_id: String,
}

impl ProductPath {
    pub fn product_ref(&self) -> Result<ProductRef, ApiError> {
        let product_type = parse_product_type(&self.product_type)?;
        let id: ProductId = self
            .product_id
            .parse()
            .map_err(|e: core_kernel::CoreError| ApiError::NotFound(e.to_string()))?;
        Ok(ProductRef::new(id, product_type))
    }
}

pub fn parse_product_type(segment: &str) -> Result<ProductType, ApiError> {
    segment
        .parse()
        .map_err(|e: core_kernel::CoreError| ApiError::NotFound(e.to_string()))
}

/// Query string of the rules template endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesQuery {
    pub accounting_rule: i64,
    pub deposit_account_type: Option<i64>,
    pub is_dormancy_tracking_active: Option<bool>,
}

/// Required and optional slots for one configuration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesTemplateResponse {
    pub product_type: ProductType,
    pub accounting_rule: AccountingMethod,
    pub deposit_account_type: DepositAccountType,
    pub is_dormancy_tracking_active: bool,
    pub required_slots: Vec<SlotRule>,
    pub optional_slots: Vec<SlotRule>,
}
