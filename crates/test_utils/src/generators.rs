//! Property-Based Test Generators
//!
//! Provides proptest strategies that stay inside the fixture reference data,
//! so generated configurations pass reference verification.

use proptest::prelude::*;
use std::collections::BTreeMap;

use core_kernel::{ChargeId, GlAccountId, PaymentTypeId};
use domain_accounting::{
    AccountingMethod, ChargeIncomeMapping, ChargeKind, DepositAccountType, GlAccountCategory, PaymentChannelMapping,
    ProductType, RuleTable,
};

use crate::builders::ConfigurationPayloadBuilder;
use crate::fixtures::ChartOfAccounts;

pub fn product_type_strategy() -> impl Strategy<Value = ProductType> {
    prop_oneof![
        Just(ProductType::Loan),
        Just(ProductType::Savings),
        Just(ProductType::Share),
    ]
}

pub fn accounting_method_strategy() -> impl Strategy<Value = AccountingMethod> {
    prop_oneof![
        Just(AccountingMethod::None),
        Just(AccountingMethod::CashBased),
        Just(AccountingMethod::AccrualPeriodic),
        Just(AccountingMethod::AccrualUpfront),
    ]
}

pub fn deposit_account_type_strategy() -> impl Strategy<Value = DepositAccountType> {
    prop_oneof![
        Just(DepositAccountType::Standard),
        Just(DepositAccountType::FixedDeposit),
        Just(DepositAccountType::RecurringDeposit),
    ]
}

/// Account id from the fixture block of a category
pub fn gl_account_strategy(category: GlAccountCategory) -> impl Strategy<Value = i64> {
    ChartOfAccounts::accounts(category)
}

/// Payload builders for every supported (product, method, deposit, dormancy) combination
pub fn supported_payload_strategy() -> impl Strategy<Value = ConfigurationPayloadBuilder> {
    (
        product_type_strategy(),
        accounting_method_strategy(),
        deposit_account_type_strategy(),
        any::<bool>(),
    )
        .prop_filter("combination must have a rule set", |(product_type, method, _, _)| {
            RuleTable::supports(*product_type, *method)
        })
        .prop_map(|(product_type, method, deposit, dormancy)| {
            let builder = ConfigurationPayloadBuilder::new(product_type, method);
            if product_type == ProductType::Savings {
                builder.deposit_account_type(deposit).dormancy_tracking(dormancy)
            } else {
                builder
            }
        })
}

/// Payment channel mappings with unique payment types
pub fn payment_channel_set_strategy() -> impl Strategy<Value = Vec<PaymentChannelMapping>> {
    prop::collection::btree_map(1i64..20, gl_account_strategy(GlAccountCategory::Asset), 0..8).prop_map(
        |entries: BTreeMap<i64, i64>| {
            entries
                .into_iter()
                .map(|(payment_type, account)| PaymentChannelMapping {
                    payment_type_id: PaymentTypeId::new(payment_type),
                    fund_source_account_id: GlAccountId::new(account),
                })
                .collect()
        },
    )
}

/// Charge income mappings of one kind with unique charges
pub fn charge_set_strategy(kind: ChargeKind) -> impl Strategy<Value = Vec<ChargeIncomeMapping>> {
    prop::collection::btree_map(1i64..40, gl_account_strategy(GlAccountCategory::Income), 0..8).prop_map(
        move |entries: BTreeMap<i64, i64>| {
            entries
                .into_iter()
                .map(|(charge, account)| ChargeIncomeMapping {
                    charge_id: ChargeId::new(charge),
                    income_account_id: GlAccountId::new(account),
                    kind,
                })
                .collect()
        },
    )
}
