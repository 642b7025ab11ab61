//! Test Data Builders
//!
//! Builds configuration payloads with sensible defaults. Tests specify only
//! the parameters they care about; every required slot of the chosen rule set
//! is filled from the fixture chart of accounts unless removed.

use serde_json::{json, Map, Value};

use domain_accounting::{AccountingMethod, DepositAccountType, ProductType, RuleTable, SlotFlags};

use crate::fixtures::ChartOfAccounts;

/// Builder for accounting configuration payloads
#[derive(Debug, Clone)]
pub struct ConfigurationPayloadBuilder {
    product_type: ProductType,
    method: AccountingMethod,
    deposit_account_type: Option<DepositAccountType>,
    dormancy_tracking: Option<bool>,
    include_rule: bool,
    include_required: bool,
    include_optional: bool,
    overrides: Map<String, Value>,
    removed: Vec<String>,
    payment_channels: Option<Vec<Value>>,
    fees: Option<Vec<Value>>,
    penalties: Option<Vec<Value>>,
}

impl ConfigurationPayloadBuilder {
    /// Creates a builder for a product type and method with every required slot bound
    pub fn new(product_type: ProductType, method: AccountingMethod) -> Self {
        Self {
            product_type,
            method,
            deposit_account_type: None,
            dormancy_tracking: None,
            include_rule: true,
            include_required: true,
            include_optional: false,
            overrides: Map::new(),
            removed: Vec::new(),
            payment_channels: None,
            fees: None,
            penalties: None,
        }
    }

    pub fn loan_cash() -> Self {
        Self::new(ProductType::Loan, AccountingMethod::CashBased)
    }

    pub fn loan_accrual() -> Self {
        Self::new(ProductType::Loan, AccountingMethod::AccrualPeriodic)
    }

    pub fn savings_cash() -> Self {
        Self::new(ProductType::Savings, AccountingMethod::CashBased)
    }

    pub fn share_cash() -> Self {
        Self::new(ProductType::Share, AccountingMethod::CashBased)
    }

    /// Starts from an empty payload, for partial updates
    pub fn empty(product_type: ProductType) -> Self {
        let mut builder = Self::new(product_type, AccountingMethod::None);
        builder.include_rule = false;
        builder.include_required = false;
        builder
    }

    /// Sets the accounting rule written to the payload
    pub fn method(mut self, method: AccountingMethod) -> Self {
        self.method = method;
        self.include_rule = true;
        self
    }

    pub fn deposit_account_type(mut self, deposit_account_type: DepositAccountType) -> Self {
        self.deposit_account_type = Some(deposit_account_type);
        self
    }

    pub fn dormancy_tracking(mut self, active: bool) -> Self {
        self.dormancy_tracking = Some(active);
        self
    }

    /// Also binds every optional slot of the rule set
    pub fn with_optional_slots(mut self) -> Self {
        self.include_optional = true;
        self
    }

    /// Leaves out the required slots, keeping only explicit parameters
    pub fn without_slots(mut self) -> Self {
        self.include_required = false;
        self
    }

    /// Sets a parameter to a GL account id
    pub fn slot(mut self, parameter: &str, gl_account_id: i64) -> Self {
        self.overrides.insert(parameter.to_string(), json!(gl_account_id));
        self
    }

    /// Sets an arbitrary top-level value
    pub fn raw(mut self, key: &str, value: Value) -> Self {
        self.overrides.insert(key.to_string(), value);
        self
    }

    /// Removes a parameter from the built payload
    pub fn remove(mut self, parameter: &str) -> Self {
        self.removed.push(parameter.to_string());
        self
    }

    pub fn payment_channel(mut self, payment_type_id: i64, fund_source_account_id: i64) -> Self {
        self.payment_channels.get_or_insert_with(Vec::new).push(json!({
            "paymentTypeId": payment_type_id,
            "fundSourceAccountId": fund_source_account_id,
        }));
        self
    }

    pub fn fee(mut self, charge_id: i64, income_account_id: i64) -> Self {
        self.fees.get_or_insert_with(Vec::new).push(json!({
            "chargeId": charge_id,
            "incomeAccountId": income_account_id,
        }));
        self
    }

    pub fn penalty(mut self, charge_id: i64, income_account_id: i64) -> Self {
        self.penalties.get_or_insert_with(Vec::new).push(json!({
            "chargeId": charge_id,
            "incomeAccountId": income_account_id,
        }));
        self
    }

    /// Sends the payment channel collection even if no entry is added
    pub fn no_payment_channels(mut self) -> Self {
        self.payment_channels.get_or_insert_with(Vec::new);
        self
    }

    /// Sends the fee collection even if no entry is added
    pub fn no_fees(mut self) -> Self {
        self.fees.get_or_insert_with(Vec::new);
        self
    }

    /// Sends the penalty collection even if no entry is added
    pub fn no_penalties(mut self) -> Self {
        self.penalties.get_or_insert_with(Vec::new);
        self
    }

    /// Sends an empty array for every advanced collection
    pub fn clear_advanced_mappings(mut self) -> Self {
        self.payment_channels = Some(Vec::new());
        self.fees = Some(Vec::new());
        self.penalties = Some(Vec::new());
        self
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Number of slot rows a successful create with this payload produces
    pub fn expected_rows(&self) -> usize {
        RuleTable::plan(self.product_type, self.method, self.deposit(), self.flags())
            .map(|plan| {
                let optional = if self.include_optional { plan.optional.len() } else { 0 };
                plan.required.len() + optional
            })
            .unwrap_or(0)
    }

    pub fn build_map(&self) -> Map<String, Value> {
        let mut body = Map::new();
        if self.include_rule {
            body.insert("accountingRule".to_string(), json!(self.method.code()));
        }
        if let Some(deposit) = self.deposit_account_type {
            body.insert("depositAccountType".to_string(), json!(deposit.code()));
        }
        if let Some(active) = self.dormancy_tracking {
            body.insert("isDormancyTrackingActive".to_string(), json!(active));
        }

        if let Ok(plan) = RuleTable::plan(self.product_type, self.method, self.deposit(), self.flags()) {
            // Each slot gets its own account so mix-ups show in assertions
            if self.include_required {
                for (offset, rule) in plan.required.iter().enumerate() {
                    body.insert(
                        rule.parameter.to_string(),
                        json!(ChartOfAccounts::account(rule.category, offset as i64)),
                    );
                }
            }
            if self.include_optional {
                for (offset, rule) in plan.optional.iter().enumerate() {
                    body.insert(
                        rule.parameter.to_string(),
                        json!(ChartOfAccounts::account(rule.category, 50 + offset as i64)),
                    );
                }
            }
        }

        if let Some(channels) = &self.payment_channels {
            body.insert("paymentChannelToFundSourceMappings".to_string(), Value::Array(channels.clone()));
        }
        if let Some(fees) = &self.fees {
            body.insert("feeToIncomeAccountMappings".to_string(), Value::Array(fees.clone()));
        }
        if let Some(penalties) = &self.penalties {
            body.insert("penaltyToIncomeAccountMappings".to_string(), Value::Array(penalties.clone()));
        }

        for (key, value) in &self.overrides {
            body.insert(key.clone(), value.clone());
        }
        for key in &self.removed {
            body.remove(key);
        }
        body
    }

    pub fn build(&self) -> Value {
        Value::Object(self.build_map())
    }

    fn deposit(&self) -> DepositAccountType {
        self.deposit_account_type.unwrap_or_default()
    }

    fn flags(&self) -> SlotFlags {
        SlotFlags {
            dormancy_tracking: self.dormancy_tracking.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_cash_binds_fourteen_slots() {
        let builder = ConfigurationPayloadBuilder::loan_cash();
        let body = builder.build_map();

        assert_eq!(builder.expected_rows(), 14);
        assert_eq!(body.len(), 15);
        assert_eq!(body["accountingRule"], json!(2));
        assert_eq!(body["fundSourceAccountId"], json!(100));
    }

    #[test]
    fn test_remove_and_override() {
        let body = ConfigurationPayloadBuilder::loan_cash()
            .remove("writeOffAccountId")
            .slot("fundSourceAccountId", 250)
            .build_map();

        assert!(!body.contains_key("writeOffAccountId"));
        assert_eq!(body["fundSourceAccountId"], json!(250));
    }

    #[test]
    fn test_empty_builder_carries_only_explicit_values() {
        let body = ConfigurationPayloadBuilder::empty(ProductType::Loan)
            .fee(11, 401)
            .build_map();

        assert_eq!(body.len(), 1);
        assert_eq!(body["feeToIncomeAccountMappings"][0]["chargeId"], json!(11));
    }

    #[test]
    fn test_unsupported_combination_has_no_slots() {
        let builder = ConfigurationPayloadBuilder::new(ProductType::Share, AccountingMethod::AccrualPeriodic);
        assert_eq!(builder.expected_rows(), 0);
        assert_eq!(builder.build_map().len(), 1);
    }
}
