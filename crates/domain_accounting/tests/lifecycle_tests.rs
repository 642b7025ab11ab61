//! Mapping Lifecycle Tests
//!
//! End-to-end tests of `MappingLifecycleCoordinator` against the in-memory
//! store and reference directory.
//!
//! # Test Organization
//!
//! - `create_tests` - first submission, rule table coverage, batch validation
//! - `update_tests` - in-place patching, method changes, change reporting
//! - `advanced_mapping_tests` - payment channel and charge income collections
//! - `reference_tests` - account categories and missing entities
//! - `delete_and_fetch_tests` - removal and read back

use serde_json::{json, Map, Value};
use std::sync::Arc;

use core_kernel::{ChargeId, GlAccountId, PaymentTypeId, ProductId};
use domain_accounting::{
    AccountingMethod, ChargeKind, ConfigurationState, DepositAccountType, GlAccountCategory, MappingError,
    MappingLifecycleCoordinator, MappingSlot, MockMappingStore, MockReferenceDirectory, ProductRef, ProductType,
    RuleTable, SlotFlags, ValidationCode,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

const LOAN: ProductRef = ProductRef {
    id: ProductId::new(1),
    product_type: ProductType::Loan,
};

/// First account id of each category block in the fixture chart of accounts
fn block(category: GlAccountCategory) -> i64 {
    match category {
        GlAccountCategory::Asset => 100,
        GlAccountCategory::Liability => 200,
        GlAccountCategory::Equity => 300,
        GlAccountCategory::Income => 400,
        GlAccountCategory::Expense => 500,
    }
}

fn directory() -> MockReferenceDirectory {
    MockReferenceDirectory::new()
        .with_product(LOAN)
        .with_product(ProductRef::savings(2))
        .with_product(ProductRef::share(3))
        .with_gl_accounts(100..200, GlAccountCategory::Asset)
        .with_gl_accounts(200..300, GlAccountCategory::Liability)
        .with_gl_accounts(300..400, GlAccountCategory::Equity)
        .with_gl_accounts(400..500, GlAccountCategory::Income)
        .with_gl_accounts(500..600, GlAccountCategory::Expense)
        .with_payment_type(1)
        .with_payment_type(2)
        .with_payment_type(3)
        .with_charge(11, ChargeKind::Fee)
        .with_charge(12, ChargeKind::Fee)
        .with_charge(21, ChargeKind::Penalty)
}

fn setup() -> (Arc<MockMappingStore>, MappingLifecycleCoordinator) {
    let store = Arc::new(MockMappingStore::new());
    let coordinator = MappingLifecycleCoordinator::new(store.clone(), Arc::new(directory()));
    (store, coordinator)
}

/// Payload binding every required slot to a distinct account of the right category
fn slot_payload(
    product_type: ProductType,
    method: AccountingMethod,
    deposit_type: DepositAccountType,
    flags: SlotFlags,
) -> Map<String, Value> {
    let plan = RuleTable::plan(product_type, method, deposit_type, flags).unwrap();
    let mut body = Map::new();
    body.insert("accountingRule".to_string(), json!(method.code()));
    for (index, rule) in plan.required.iter().enumerate() {
        body.insert(rule.parameter.to_string(), json!(block(rule.category) + index as i64));
    }
    body
}

fn loan_cash() -> Map<String, Value> {
    slot_payload(
        ProductType::Loan,
        AccountingMethod::CashBased,
        DepositAccountType::Standard,
        SlotFlags::default(),
    )
}

fn validation_errors(error: MappingError) -> domain_accounting::ValidationErrors {
    match error {
        MappingError::Validation(errors) => errors,
        other => panic!("Expected Validation error, got {other:?}"),
    }
}

// ============================================================================
// CREATE
// ============================================================================

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_loan_cash_creates_fourteen_mappings() {
        let (store, coordinator) = setup();
        let body = json!({
            "accountingRule": 2,
            "fundSourceAccountId": 101,
            "loanPortfolioAccountId": 102,
            "transfersInSuspenseAccountId": 103,
            "interestOnLoanAccountId": 401,
            "incomeFromFeeAccountId": 402,
            "incomeFromPenaltyAccountId": 403,
            "incomeFromRecoveryAccountId": 404,
            "incomeFromChargeOffInterestAccountId": 405,
            "incomeFromChargeOffFeesAccountId": 406,
            "incomeFromGoodwillCreditInterestAccountId": 407,
            "incomeFromGoodwillCreditFeesAccountId": 408,
            "writeOffAccountId": 501,
            "goodwillCreditAccountId": 502,
            "overpaymentLiabilityAccountId": 201
        });

        let outcome = coordinator.create(LOAN, &body, None).await.unwrap();

        assert_eq!(outcome.resource_id, LOAN.id);
        let snapshot = store.snapshot(LOAN).await;
        assert_eq!(snapshot.gl_mappings.len(), 14);
        assert_eq!(snapshot.state(), ConfigurationState::Configured(AccountingMethod::CashBased));
        assert_eq!(
            snapshot.gl_mapping(MappingSlot::FundSource).unwrap().gl_account_id,
            GlAccountId::new(101)
        );
        assert_eq!(
            snapshot.gl_mapping(MappingSlot::OverpaymentLiability).unwrap().category,
            GlAccountCategory::Liability
        );
        assert_eq!(store.apply_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_slots_reported_in_one_batch_with_no_writes() {
        let (store, coordinator) = setup();
        let mut body = loan_cash();
        body.remove("writeOffAccountId");
        body.remove("goodwillCreditAccountId");
        body.insert("bogusParameter".to_string(), json!(1));

        let errors = validation_errors(coordinator.create(LOAN, &Value::Object(body), None).await.unwrap_err());

        assert_eq!(errors.len(), 3);
        assert!(errors.contains("writeOffAccountId"));
        assert!(errors.contains("goodwillCreditAccountId"));
        assert!(errors.contains("bogusParameter"));
        assert_eq!(store.apply_calls(), 0);
        assert!(store.snapshot(LOAN).await.gl_mappings.is_empty());
    }

    #[tokio::test]
    async fn test_loan_accrual_adds_receivables() {
        let (store, coordinator) = setup();
        let body = slot_payload(
            ProductType::Loan,
            AccountingMethod::AccrualPeriodic,
            DepositAccountType::Standard,
            SlotFlags::default(),
        );

        coordinator.create(LOAN, &Value::Object(body), None).await.unwrap();

        let snapshot = store.snapshot(LOAN).await;
        assert_eq!(snapshot.gl_mappings.len(), 17);
        for slot in [
            MappingSlot::InterestReceivable,
            MappingSlot::FeesReceivable,
            MappingSlot::PenaltiesReceivable,
        ] {
            assert!(snapshot.gl_mapping(slot).is_some(), "missing {slot}");
        }
    }

    #[tokio::test]
    async fn test_optional_loan_slots_bound_when_supplied() {
        let (store, coordinator) = setup();
        let mut body = loan_cash();
        body.insert("chargeOffExpenseAccountId".to_string(), json!(590));

        coordinator.create(LOAN, &Value::Object(body), None).await.unwrap();

        let snapshot = store.snapshot(LOAN).await;
        assert_eq!(snapshot.gl_mappings.len(), 15);
        assert!(snapshot.gl_mapping(MappingSlot::ChargeOffExpense).is_some());
    }

    #[tokio::test]
    async fn test_fixed_deposit_omits_standard_only_slots() {
        let (store, coordinator) = setup();
        let product = ProductRef::savings(2);
        let mut body = slot_payload(
            ProductType::Savings,
            AccountingMethod::CashBased,
            DepositAccountType::FixedDeposit,
            SlotFlags::default(),
        );
        body.insert("depositAccountType".to_string(), json!(200));

        coordinator.create(product, &Value::Object(body), None).await.unwrap();

        let snapshot = store.snapshot(product).await;
        assert_eq!(snapshot.gl_mappings.len(), 6);
        assert!(snapshot.gl_mapping(MappingSlot::OverdraftPortfolioControl).is_none());
        assert!(snapshot.gl_mapping(MappingSlot::IncomeFromInterest).is_none());
        assert!(snapshot.gl_mapping(MappingSlot::LossesWrittenOff).is_none());
        assert_eq!(
            snapshot.configuration.unwrap().deposit_account_type,
            DepositAccountType::FixedDeposit
        );
    }

    #[tokio::test]
    async fn test_dormancy_tracking_requires_escheat_liability() {
        let (store, coordinator) = setup();
        let product = ProductRef::savings(2);
        let mut body = slot_payload(
            ProductType::Savings,
            AccountingMethod::CashBased,
            DepositAccountType::Standard,
            SlotFlags::default(),
        );
        body.insert("isDormancyTrackingActive".to_string(), json!(true));

        let errors = validation_errors(coordinator.create(product, &Value::Object(body), None).await.unwrap_err());

        assert_eq!(errors.len(), 1);
        assert!(errors.contains("escheatLiabilityId"));
        assert_eq!(store.apply_calls(), 0);
    }

    #[tokio::test]
    async fn test_share_accrual_is_rejected() {
        let (_, coordinator) = setup();
        let body = json!({ "accountingRule": 3 });

        let errors = validation_errors(coordinator.create(ProductRef::share(3), &body, None).await.unwrap_err());

        assert!(errors.contains("accountingRule"));
        assert_eq!(errors.errors()[0].code, ValidationCode::InvalidValue);
    }

    #[tokio::test]
    async fn test_unknown_method_code_is_invalid() {
        let (_, coordinator) = setup();
        let body = json!({ "accountingRule": 9 });

        let errors = validation_errors(coordinator.create(LOAN, &body, None).await.unwrap_err());

        assert_eq!(errors.len(), 1);
        assert!(errors.contains("accountingRule"));
    }

    #[tokio::test]
    async fn test_missing_method_is_required() {
        let (_, coordinator) = setup();

        let errors = validation_errors(coordinator.create(LOAN, &json!({}), None).await.unwrap_err());

        assert_eq!(errors.errors()[0].code, ValidationCode::Required);
        assert!(errors.contains("accountingRule"));
    }

    #[tokio::test]
    async fn test_savings_parameters_unsupported_for_loans() {
        let (_, coordinator) = setup();
        let mut body = loan_cash();
        body.insert("depositAccountType".to_string(), json!(100));

        let errors = validation_errors(coordinator.create(LOAN, &Value::Object(body), None).await.unwrap_err());

        assert_eq!(errors.errors()[0].code, ValidationCode::Unsupported);
    }

    #[tokio::test]
    async fn test_none_method_stores_unconfigured_record() {
        let (store, coordinator) = setup();

        coordinator.create(LOAN, &json!({ "accountingRule": 1 }), None).await.unwrap();

        let snapshot = store.snapshot(LOAN).await;
        assert!(snapshot.configuration.is_some());
        assert!(snapshot.gl_mappings.is_empty());
        assert_eq!(snapshot.state(), ConfigurationState::Unconfigured);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (_, coordinator) = setup();

        let err = coordinator
            .create(ProductRef::loan(999), &Value::Object(loan_cash()), None)
            .await
            .unwrap_err();

        assert!(matches!(err, MappingError::NotFound { ref entity, .. } if entity == "Product"));
    }

    #[tokio::test]
    async fn test_second_create_is_conflict() {
        let (store, coordinator) = setup();
        let body = Value::Object(loan_cash());
        coordinator.create(LOAN, &body, None).await.unwrap();

        let err = coordinator.create(LOAN, &body, None).await.unwrap_err();

        assert!(matches!(err, MappingError::Conflict(_)));
        assert_eq!(store.apply_calls(), 1);
    }
}

// ============================================================================
// UPDATE
// ============================================================================

mod update_tests {
    use super::*;

    async fn configured() -> (Arc<MockMappingStore>, MappingLifecycleCoordinator) {
        let (store, coordinator) = setup();
        coordinator.create(LOAN, &Value::Object(loan_cash()), None).await.unwrap();
        (store, coordinator)
    }

    #[tokio::test]
    async fn test_identical_update_reports_nothing_and_writes_nothing() {
        let (store, coordinator) = configured().await;

        let outcome = coordinator.update(LOAN, &Value::Object(loan_cash()), None).await.unwrap();

        assert!(outcome.changes.is_empty());
        assert_eq!(store.apply_calls(), 1);
    }

    #[tokio::test]
    async fn test_single_slot_change_touches_one_row() {
        let (store, coordinator) = configured().await;
        let before = store.snapshot(LOAN).await;

        let outcome = coordinator
            .update(LOAN, &json!({ "writeOffAccountId": 599 }), None)
            .await
            .unwrap();

        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes.get("writeOffAccountId"), Some(&json!(599)));

        let after = store.snapshot(LOAN).await;
        assert_eq!(after.gl_mappings.len(), 14);
        assert_eq!(
            after.gl_mapping(MappingSlot::LossesWrittenOff).unwrap().gl_account_id,
            GlAccountId::new(599)
        );
        assert_eq!(
            after.gl_mapping(MappingSlot::FundSource),
            before.gl_mapping(MappingSlot::FundSource)
        );
    }

    #[tokio::test]
    async fn test_method_change_recreates_all_rows() {
        let (store, coordinator) = configured().await;
        let body = slot_payload(
            ProductType::Loan,
            AccountingMethod::AccrualPeriodic,
            DepositAccountType::Standard,
            SlotFlags::default(),
        );

        let outcome = coordinator.update(LOAN, &Value::Object(body), None).await.unwrap();

        assert_eq!(outcome.changes.get("accountingRule"), Some(&json!(3)));
        assert_eq!(outcome.changes.len(), 18);

        let applied = store.last_applied().await.expect("one change set applied");
        assert!(applied.delete_all_gl_mappings);
        assert!(applied.gl_updates.is_empty());
        assert!(applied.gl_deletes.is_empty());
        assert_eq!(applied.gl_inserts.len(), 17);

        let snapshot = store.snapshot(LOAN).await;
        assert_eq!(snapshot.gl_mappings.len(), 17);
        assert_eq!(
            snapshot.state(),
            ConfigurationState::Configured(AccountingMethod::AccrualPeriodic)
        );
    }

    #[tokio::test]
    async fn test_method_change_with_missing_slots_leaves_store_untouched() {
        let (store, coordinator) = configured().await;
        let before = store.snapshot(LOAN).await;

        let errors = validation_errors(
            coordinator
                .update(LOAN, &json!({ "accountingRule": 3 }), None)
                .await
                .unwrap_err(),
        );

        assert_eq!(errors.len(), 17);
        assert_eq!(store.snapshot(LOAN).await, before);
    }

    #[tokio::test]
    async fn test_switch_to_none_deletes_gl_rows() {
        let (store, coordinator) = configured().await;

        let outcome = coordinator
            .update(LOAN, &json!({ "accountingRule": 1 }), None)
            .await
            .unwrap();

        assert_eq!(outcome.changes.get("accountingRule"), Some(&json!(1)));
        let snapshot = store.snapshot(LOAN).await;
        assert!(snapshot.gl_mappings.is_empty());
        assert!(snapshot.configuration.is_some());
        assert_eq!(snapshot.state(), ConfigurationState::Unconfigured);
        assert_eq!(coordinator.state(LOAN).await.unwrap(), ConfigurationState::Unconfigured);
    }

    #[tokio::test]
    async fn test_disabling_dormancy_tracking_drops_escheat_row() {
        let (store, coordinator) = setup();
        let product = ProductRef::savings(2);
        let flags = SlotFlags { dormancy_tracking: true };
        let mut body = slot_payload(
            ProductType::Savings,
            AccountingMethod::CashBased,
            DepositAccountType::Standard,
            flags,
        );
        body.insert("isDormancyTrackingActive".to_string(), json!(true));
        coordinator.create(product, &Value::Object(body), None).await.unwrap();
        assert!(store.snapshot(product).await.gl_mapping(MappingSlot::EscheatLiability).is_some());

        let outcome = coordinator
            .update(product, &json!({ "isDormancyTrackingActive": false }), None)
            .await
            .unwrap();

        assert_eq!(outcome.changes.get("isDormancyTrackingActive"), Some(&json!(false)));
        let snapshot = store.snapshot(product).await;
        assert!(snapshot.gl_mapping(MappingSlot::EscheatLiability).is_none());
        assert_eq!(snapshot.gl_mappings.len(), 9);
    }

    #[tokio::test]
    async fn test_update_without_configuration_is_not_found() {
        let (_, coordinator) = setup();

        let err = coordinator
            .update(LOAN, &json!({ "writeOffAccountId": 501 }), None)
            .await
            .unwrap_err();

        assert!(matches!(err, MappingError::NotFound { .. }));
    }
}

// ============================================================================
// ADVANCED MAPPINGS
// ============================================================================

mod advanced_mapping_tests {
    use super::*;

    fn with_channels(channels: Value) -> Value {
        let mut body = loan_cash();
        body.insert("paymentChannelToFundSourceMappings".to_string(), channels);
        Value::Object(body)
    }

    fn channel_pairs(store_snapshot: &domain_accounting::ConfigurationSnapshot) -> Vec<(i64, i64)> {
        let mut pairs: Vec<_> = store_snapshot
            .payment_channels
            .iter()
            .map(|m| (m.payment_type_id.value(), m.fund_source_account_id.value()))
            .collect();
        pairs.sort();
        pairs
    }

    #[tokio::test]
    async fn test_payment_channels_reconciled_by_key() {
        let (store, coordinator) = setup();
        let initial = json!([
            { "paymentTypeId": 1, "fundSourceAccountId": 101 },
            { "paymentTypeId": 2, "fundSourceAccountId": 102 }
        ]);
        coordinator.create(LOAN, &with_channels(initial), None).await.unwrap();

        let outcome = coordinator
            .update(
                LOAN,
                &json!({ "paymentChannelToFundSourceMappings": [
                    { "paymentTypeId": 1, "fundSourceAccountId": 101 },
                    { "paymentTypeId": 3, "fundSourceAccountId": 103 }
                ]}),
                None,
            )
            .await
            .unwrap();

        assert!(outcome.changes.contains_key("paymentChannelToFundSourceMappings"));
        let snapshot = store.snapshot(LOAN).await;
        assert_eq!(channel_pairs(&snapshot), vec![(1, 101), (3, 103)]);
    }

    #[tokio::test]
    async fn test_absent_collection_keeps_rows_and_empty_clears_them() {
        let (store, coordinator) = setup();
        let initial = json!([{ "paymentTypeId": 1, "fundSourceAccountId": 101 }]);
        coordinator.create(LOAN, &with_channels(initial), None).await.unwrap();

        let outcome = coordinator
            .update(LOAN, &json!({ "writeOffAccountId": 598 }), None)
            .await
            .unwrap();
        assert!(!outcome.changes.contains_key("paymentChannelToFundSourceMappings"));
        assert_eq!(store.snapshot(LOAN).await.payment_channels.len(), 1);

        coordinator
            .update(LOAN, &json!({ "paymentChannelToFundSourceMappings": [] }), None)
            .await
            .unwrap();
        assert!(store.snapshot(LOAN).await.payment_channels.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_payment_type_is_conflict() {
        let (store, coordinator) = setup();
        let channels = json!([
            { "paymentTypeId": 1, "fundSourceAccountId": 101 },
            { "paymentTypeId": 1, "fundSourceAccountId": 102 }
        ]);

        let err = coordinator.create(LOAN, &with_channels(channels), None).await.unwrap_err();

        assert!(matches!(err, MappingError::Conflict(_)));
        assert_eq!(store.apply_calls(), 0);
    }

    #[tokio::test]
    async fn test_fee_and_penalty_collections_are_independent() {
        let (store, coordinator) = setup();
        let mut body = loan_cash();
        body.insert(
            "feeToIncomeAccountMappings".to_string(),
            json!([{ "chargeId": 11, "incomeAccountId": 410 }, { "chargeId": 12, "incomeAccountId": 210 }]),
        );
        body.insert(
            "penaltyToIncomeAccountMappings".to_string(),
            json!([{ "chargeId": 21, "incomeAccountId": 411 }]),
        );
        coordinator.create(LOAN, &Value::Object(body), None).await.unwrap();

        coordinator
            .update(LOAN, &json!({ "feeToIncomeAccountMappings": [] }), None)
            .await
            .unwrap();

        let snapshot = store.snapshot(LOAN).await;
        assert_eq!(snapshot.charges_of(ChargeKind::Fee).count(), 0);
        let penalties: Vec<_> = snapshot.charges_of(ChargeKind::Penalty).collect();
        assert_eq!(penalties.len(), 1);
        assert_eq!(penalties[0].charge_id, ChargeId::new(21));
    }

    #[tokio::test]
    async fn test_penalty_charge_in_fee_collection_is_rejected() {
        let (store, coordinator) = setup();
        let mut body = loan_cash();
        body.insert(
            "feeToIncomeAccountMappings".to_string(),
            json!([{ "chargeId": 21, "incomeAccountId": 410 }]),
        );

        let errors = validation_errors(coordinator.create(LOAN, &Value::Object(body), None).await.unwrap_err());

        assert_eq!(errors.errors()[0].code, ValidationCode::InvalidChargeKind);
        assert_eq!(store.apply_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_entry_reports_its_path() {
        let (_, coordinator) = setup();
        let channels = json!([{ "paymentTypeId": 1 }]);

        let errors = validation_errors(coordinator.create(LOAN, &with_channels(channels), None).await.unwrap_err());

        assert!(errors.contains("paymentChannelToFundSourceMappings[0].fundSourceAccountId"));
    }

    #[tokio::test]
    async fn test_unknown_payment_type_is_not_found() {
        let (_, coordinator) = setup();
        let channels = json!([{ "paymentTypeId": 42, "fundSourceAccountId": 101 }]);

        let err = coordinator.create(LOAN, &with_channels(channels), None).await.unwrap_err();

        match err {
            MappingError::NotFound { entity, id } => {
                assert_eq!(entity, "PaymentType");
                assert_eq!(id, PaymentTypeId::new(42).to_string());
            }
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }
}

// ============================================================================
// REFERENCE CHECKS
// ============================================================================

mod reference_tests {
    use super::*;

    #[tokio::test]
    async fn test_wrong_category_rejected() {
        let (store, coordinator) = setup();
        let mut body = loan_cash();
        body.insert("loanPortfolioAccountId".to_string(), json!(450));
        body.insert("writeOffAccountId".to_string(), json!(150));

        let errors = validation_errors(coordinator.create(LOAN, &Value::Object(body), None).await.unwrap_err());

        assert_eq!(errors.len(), 2);
        assert!(errors
            .errors()
            .iter()
            .all(|e| e.code == ValidationCode::InvalidAccountCategory));
        assert_eq!(store.apply_calls(), 0);
    }

    #[tokio::test]
    async fn test_fund_source_accepts_liability() {
        let (store, coordinator) = setup();
        let mut body = loan_cash();
        body.insert("fundSourceAccountId".to_string(), json!(250));

        coordinator.create(LOAN, &Value::Object(body), None).await.unwrap();

        assert_eq!(
            store.snapshot(LOAN).await.gl_mapping(MappingSlot::FundSource).unwrap().gl_account_id,
            GlAccountId::new(250)
        );
    }

    #[tokio::test]
    async fn test_missing_gl_account_is_not_found() {
        let (_, coordinator) = setup();
        let mut body = loan_cash();
        body.insert("loanPortfolioAccountId".to_string(), json!(9999));

        let err = coordinator.create(LOAN, &Value::Object(body), None).await.unwrap_err();

        assert!(matches!(err, MappingError::NotFound { ref entity, .. } if entity == "GlAccount"));
    }
}

// ============================================================================
// DELETE AND FETCH
// ============================================================================

mod delete_and_fetch_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_removes_everything() {
        let (store, coordinator) = setup();
        let mut body = loan_cash();
        body.insert(
            "paymentChannelToFundSourceMappings".to_string(),
            json!([{ "paymentTypeId": 1, "fundSourceAccountId": 101 }]),
        );
        coordinator.create(LOAN, &Value::Object(body), None).await.unwrap();

        coordinator.delete(LOAN, None).await.unwrap();

        let snapshot = store.snapshot(LOAN).await;
        assert!(snapshot.configuration.is_none());
        assert!(snapshot.gl_mappings.is_empty());
        assert!(snapshot.payment_channels.is_empty());

        let err = coordinator.delete(LOAN, None).await.unwrap_err();
        assert!(matches!(err, MappingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_fetch_returns_mappings_in_rule_order() {
        let (_, coordinator) = setup();
        coordinator.create(LOAN, &Value::Object(loan_cash()), None).await.unwrap();
        coordinator
            .update(LOAN, &json!({ "writeOffAccountId": 597 }), None)
            .await
            .unwrap();

        let view = coordinator.fetch(LOAN, None).await.unwrap();

        assert_eq!(view.accounting_rule, AccountingMethod::CashBased);
        assert_eq!(view.mappings.len(), 14);
        assert_eq!(view.mappings[0].slot, MappingSlot::FundSource);
        assert_eq!(view.mappings[0].parameter, Some("fundSourceAccountId"));
        assert_eq!(view.mappings[13].slot, MappingSlot::OverpaymentLiability);
    }

    #[tokio::test]
    async fn test_fetch_unconfigured_is_not_found() {
        let (_, coordinator) = setup();

        let err = coordinator.fetch(LOAN, None).await.unwrap_err();

        assert!(matches!(err, MappingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_health_reports_both_ports() {
        let (_, coordinator) = setup();

        let health = coordinator.health().await;

        assert_eq!(health.len(), 2);
        assert!(health.iter().all(|h| h.is_operational()));
    }
}
