//! Rules template handler

use axum::{extract::Path, Json};

use domain_accounting::{
    AccountingMethod, DepositAccountType, MappingError, ProductType, RuleTable, SlotFlags, ValidationErrors,
};

use crate::dto::accounting::{parse_product_type, RulesQuery, RulesTemplateResponse};
use crate::error::ApiError;
use crate::extract::ApiQuery;

/// Lists the slots a configuration must and may bind
pub async fn rules_template(
    Path(product_type): Path<String>,
    ApiQuery(query): ApiQuery<RulesQuery>,
) -> Result<Json<RulesTemplateResponse>, ApiError> {
    let product_type = parse_product_type(&product_type)?;

    let mut errors = ValidationErrors::new();
    let method = AccountingMethod::from_code(query.accounting_rule);
    if method.is_none() {
        errors.invalid(
            "accountingRule",
            format!("Unknown accounting rule code {}", query.accounting_rule),
        );
    }
    let deposit_account_type = match query.deposit_account_type {
        None => Some(DepositAccountType::Standard),
        Some(code) if product_type == ProductType::Savings => {
            let resolved = DepositAccountType::from_code(code);
            if resolved.is_none() {
                errors.invalid("depositAccountType", format!("Unknown deposit account type {}", code));
            }
            resolved
        }
        Some(_) => {
            errors.unsupported("depositAccountType");
            None
        }
    };

    let (Some(method), Some(deposit_account_type)) = (method, deposit_account_type) else {
        return Err(MappingError::Validation(errors).into());
    };
    errors.into_result().map_err(MappingError::from)?;

    let dormancy_tracking = query.is_dormancy_tracking_active.unwrap_or(false);
    let plan = RuleTable::plan(
        product_type,
        method,
        deposit_account_type,
        SlotFlags { dormancy_tracking },
    )
    .map_err(|unsupported| {
        let mut errors = ValidationErrors::new();
        errors.invalid(
            "accountingRule",
            format!(
                "Accounting rule {} is not supported for {} products",
                unsupported.method, unsupported.product_type
            ),
        );
        MappingError::Validation(errors)
    })?;

    Ok(Json(RulesTemplateResponse {
        product_type,
        accounting_rule: method,
        deposit_account_type,
        is_dormancy_tracking_active: dormancy_tracking,
        required_slots: plan.required,
        optional_slots: plan.optional,
    }))
}
