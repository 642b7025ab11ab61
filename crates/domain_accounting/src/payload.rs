//! Configuration payload parsing
//!
//! Requests arrive as loosely typed JSON. Parsing locates each recognized
//! parameter by its canonical name, extracts a typed value, and records every
//! problem (unknown parameter, wrong type, unknown code) in a single
//! [`ValidationErrors`] batch instead of stopping at the first one.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use core_kernel::{ChargeId, GlAccountId, PaymentTypeId};

use crate::error::ValidationErrors;
use crate::model::ChargeKind;
use crate::product::{AccountingMethod, DepositAccountType, ProductType};
use crate::rule_table::RuleTable;

pub const ACCOUNTING_RULE: &str = "accountingRule";
pub const DEPOSIT_ACCOUNT_TYPE: &str = "depositAccountType";
pub const DORMANCY_TRACKING: &str = "isDormancyTrackingActive";
pub const PAYMENT_CHANNEL_MAPPINGS: &str = "paymentChannelToFundSourceMappings";
pub const FEE_INCOME_MAPPINGS: &str = "feeToIncomeAccountMappings";
pub const PENALTY_INCOME_MAPPINGS: &str = "penaltyToIncomeAccountMappings";

const PAYMENT_TYPE_ID: &str = "paymentTypeId";
const FUND_SOURCE_ACCOUNT_ID: &str = "fundSourceAccountId";
const CHARGE_ID: &str = "chargeId";
const INCOME_ACCOUNT_ID: &str = "incomeAccountId";

/// Payment channel entry as submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChannelEntry {
    pub payment_type_id: PaymentTypeId,
    pub fund_source_account_id: GlAccountId,
}

/// Charge income entry as submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeIncomeEntry {
    pub charge_id: ChargeId,
    pub income_account_id: GlAccountId,
}

/// Typed view of a configuration request
///
/// `None` on any field means the parameter was absent (or `null`). For the
/// collections this distinction matters: an absent collection leaves stored
/// rows alone, while an empty one removes them all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationPayload {
    pub accounting_method: Option<AccountingMethod>,
    pub deposit_account_type: Option<DepositAccountType>,
    pub dormancy_tracking: Option<bool>,
    accounts: BTreeMap<String, GlAccountId>,
    pub payment_channels: Option<Vec<PaymentChannelEntry>>,
    pub fee_income: Option<Vec<ChargeIncomeEntry>>,
    pub penalty_income: Option<Vec<ChargeIncomeEntry>>,
}

impl ConfigurationPayload {
    /// Parses a payload, failing with the full batch of problems
    pub fn parse(product_type: ProductType, json: &Value) -> Result<Self, ValidationErrors> {
        let (payload, errors) = Self::parse_collecting(product_type, json);
        errors.into_result().map(|_| payload)
    }

    /// Parses as much as possible, returning the problems alongside
    ///
    /// Lets callers merge parse problems with later checks such as missing
    /// required slots into one batch.
    pub fn parse_collecting(product_type: ProductType, json: &Value) -> (Self, ValidationErrors) {
        let mut payload = Self::default();
        let mut errors = ValidationErrors::new();

        let Some(object) = json.as_object() else {
            errors.invalid("payload", "The request body must be a JSON object");
            return (payload, errors);
        };

        let slot_parameters = RuleTable::parameters_for(product_type);
        let savings = product_type == ProductType::Savings;

        for (key, value) in object {
            match key.as_str() {
                ACCOUNTING_RULE => {
                    payload.accounting_method = parse_accounting_method(value, &mut errors);
                }
                DEPOSIT_ACCOUNT_TYPE if savings => {
                    payload.deposit_account_type = parse_deposit_type(value, &mut errors);
                }
                DORMANCY_TRACKING if savings => {
                    payload.dormancy_tracking = parse_bool(key, value, &mut errors);
                }
                PAYMENT_CHANNEL_MAPPINGS => {
                    payload.payment_channels = parse_collection(key, value, &mut errors, |entry, path, errors| {
                        let payment_type = required_id(entry, path, PAYMENT_TYPE_ID, errors);
                        let account = required_id(entry, path, FUND_SOURCE_ACCOUNT_ID, errors);
                        Some(PaymentChannelEntry {
                            payment_type_id: PaymentTypeId::new(payment_type?),
                            fund_source_account_id: GlAccountId::new(account?),
                        })
                    }, &[PAYMENT_TYPE_ID, FUND_SOURCE_ACCOUNT_ID]);
                }
                FEE_INCOME_MAPPINGS | PENALTY_INCOME_MAPPINGS => {
                    let entries = parse_collection(key, value, &mut errors, |entry, path, errors| {
                        let charge = required_id(entry, path, CHARGE_ID, errors);
                        let account = required_id(entry, path, INCOME_ACCOUNT_ID, errors);
                        Some(ChargeIncomeEntry {
                            charge_id: ChargeId::new(charge?),
                            income_account_id: GlAccountId::new(account?),
                        })
                    }, &[CHARGE_ID, INCOME_ACCOUNT_ID]);
                    if key == FEE_INCOME_MAPPINGS {
                        payload.fee_income = entries;
                    } else {
                        payload.penalty_income = entries;
                    }
                }
                param if slot_parameters.contains(param) => {
                    if let Some(id) = parse_id(key, value, &mut errors) {
                        payload.accounts.insert(key.clone(), GlAccountId::new(id));
                    }
                }
                _ => errors.unsupported(key),
            }
        }

        (payload, errors)
    }

    /// GL account supplied for a slot parameter
    pub fn account(&self, parameter: &str) -> Option<GlAccountId> {
        self.accounts.get(parameter).copied()
    }

    /// Charge collection of the given kind, if present
    pub fn charge_entries(&self, kind: ChargeKind) -> Option<&[ChargeIncomeEntry]> {
        match kind {
            ChargeKind::Fee => self.fee_income.as_deref(),
            ChargeKind::Penalty => self.penalty_income.as_deref(),
        }
    }

    pub fn with_account(mut self, parameter: impl Into<String>, account: GlAccountId) -> Self {
        self.accounts.insert(parameter.into(), account);
        self
    }
}

/// Parameter name for a charge collection
pub fn charge_collection_parameter(kind: ChargeKind) -> &'static str {
    match kind {
        ChargeKind::Fee => FEE_INCOME_MAPPINGS,
        ChargeKind::Penalty => PENALTY_INCOME_MAPPINGS,
    }
}

// ============================================================================
// Value extraction
// ============================================================================

/// Reads a positive integer from a number or numeric string; `null` and blank strings are absent
fn extract_id(value: &Value) -> Result<Option<i64>, String> {
    let raw = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_i64().ok_or_else(|| format!("{} is not a whole number", n))?,
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("'{}' is not a whole number", s))?,
        other => return Err(format!("expected an identifier, got {}", json_type(other))),
    };
    if raw <= 0 {
        return Err(format!("must be greater than zero, got {}", raw));
    }
    Ok(Some(raw))
}

fn parse_id(parameter: &str, value: &Value, errors: &mut ValidationErrors) -> Option<i64> {
    match extract_id(value) {
        Ok(id) => id,
        Err(reason) => {
            errors.invalid(parameter, format!("The parameter `{}` {}", parameter, reason));
            None
        }
    }
}

fn parse_code(parameter: &str, value: &Value, errors: &mut ValidationErrors) -> Option<i64> {
    match value {
        Value::Null => None,
        Value::Number(n) if n.is_i64() => n.as_i64(),
        Value::String(s) if s.trim().parse::<i64>().is_ok() => s.trim().parse::<i64>().ok(),
        other => {
            errors.invalid(parameter, format!("The parameter `{}` must be an integer code, got {}", parameter, json_type(other)));
            None
        }
    }
}

fn parse_accounting_method(value: &Value, errors: &mut ValidationErrors) -> Option<AccountingMethod> {
    let code = parse_code(ACCOUNTING_RULE, value, errors)?;
    let method = AccountingMethod::from_code(code);
    if method.is_none() {
        errors.invalid(ACCOUNTING_RULE, format!("The parameter `{}` must be between 1 and 4, got {}", ACCOUNTING_RULE, code));
    }
    method
}

fn parse_deposit_type(value: &Value, errors: &mut ValidationErrors) -> Option<DepositAccountType> {
    let code = parse_code(DEPOSIT_ACCOUNT_TYPE, value, errors)?;
    let deposit_type = DepositAccountType::from_code(code);
    if deposit_type.is_none() {
        errors.invalid(DEPOSIT_ACCOUNT_TYPE, format!("The parameter `{}` must be one of 100, 200, 300, got {}", DEPOSIT_ACCOUNT_TYPE, code));
    }
    deposit_type
}

fn parse_bool(parameter: &str, value: &Value, errors: &mut ValidationErrors) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        other => {
            errors.invalid(parameter, format!("The parameter `{}` must be a boolean, got {}", parameter, json_type(other)));
            None
        }
    }
}

fn required_id(entry: &Map<String, Value>, path: &str, field: &str, errors: &mut ValidationErrors) -> Option<i64> {
    let parameter = format!("{}.{}", path, field);
    match entry.get(field) {
        None => {
            errors.required(&parameter);
            None
        }
        Some(value) => match extract_id(value) {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                errors.required(&parameter);
                None
            }
            Err(reason) => {
                errors.invalid(&parameter, format!("The parameter `{}` {}", parameter, reason));
                None
            }
        },
    }
}

fn parse_collection<T, F>(
    parameter: &str,
    value: &Value,
    errors: &mut ValidationErrors,
    mut parse_entry: F,
    fields: &[&str],
) -> Option<Vec<T>>
where
    F: FnMut(&Map<String, Value>, &str, &mut ValidationErrors) -> Option<T>,
{
    let items = match value {
        Value::Null => return None,
        Value::Array(items) => items,
        other => {
            errors.invalid(parameter, format!("The parameter `{}` must be an array, got {}", parameter, json_type(other)));
            return None;
        }
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let path = format!("{}[{}]", parameter, index);
        let Some(entry) = item.as_object() else {
            errors.invalid(&path, format!("`{}` must be an object", path));
            continue;
        };
        for key in entry.keys().filter(|k| !fields.contains(&k.as_str())) {
            errors.unsupported(&format!("{}.{}", path, key));
        }
        if let Some(parsed) = parse_entry(entry, &path, errors) {
            entries.push(parsed);
        }
    }
    Some(entries)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationCode;
    use serde_json::json;

    #[test]
    fn test_parses_known_parameters() {
        let payload = ConfigurationPayload::parse(
            ProductType::Loan,
            &json!({
                "accountingRule": 2,
                "fundSourceAccountId": 10,
                "loanPortfolioAccountId": "11",
                "writeOffAccountId": null,
            }),
        )
        .unwrap();

        assert_eq!(payload.accounting_method, Some(AccountingMethod::CashBased));
        assert_eq!(payload.account("fundSourceAccountId"), Some(GlAccountId::new(10)));
        assert_eq!(payload.account("loanPortfolioAccountId"), Some(GlAccountId::new(11)));
        assert_eq!(payload.account("writeOffAccountId"), None);
        assert!(payload.payment_channels.is_none());
    }

    #[test]
    fn test_collects_every_problem() {
        let errors = ConfigurationPayload::parse(
            ProductType::Share,
            &json!({
                "accountingRule": 9,
                "shareEquityId": -4,
                "isDormancyTrackingActive": true,
                "color": "blue",
            }),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 4);
        assert!(errors.contains("accountingRule"));
        assert!(errors.contains("shareEquityId"));
        // savings-only flag is unknown for shares
        assert!(errors.contains("isDormancyTrackingActive"));
        assert!(errors.errors().iter().any(|e| e.parameter == "color" && e.code == ValidationCode::Unsupported));
    }

    #[test]
    fn test_empty_collection_is_distinct_from_absent() {
        let payload = ConfigurationPayload::parse(
            ProductType::Savings,
            &json!({ "feeToIncomeAccountMappings": [] }),
        )
        .unwrap();

        assert_eq!(payload.charge_entries(ChargeKind::Fee), Some(&[][..]));
        assert_eq!(payload.charge_entries(ChargeKind::Penalty), None);
    }

    #[test]
    fn test_collection_entry_errors_carry_path() {
        let errors = ConfigurationPayload::parse(
            ProductType::Loan,
            &json!({
                "paymentChannelToFundSourceMappings": [
                    { "paymentTypeId": 1, "fundSourceAccountId": 2 },
                    { "paymentTypeId": 3, "extra": 1 },
                ]
            }),
        )
        .unwrap_err();

        assert!(errors.contains("paymentChannelToFundSourceMappings[1].fundSourceAccountId"));
        assert!(errors.contains("paymentChannelToFundSourceMappings[1].extra"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_non_object_payload() {
        let errors = ConfigurationPayload::parse(ProductType::Loan, &json!([1, 2])).unwrap_err();
        assert!(errors.contains("payload"));
    }
}
