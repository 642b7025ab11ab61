//! Property-based tests for the accounting mapping domain
//!
//! - `reconcile_properties` - keyed set difference converges on the submitted collection
//! - `rule_table_properties` - slot plans are well formed for every supported combination

use proptest::prelude::*;
use std::collections::BTreeMap;

use domain_accounting::{
    reconcile, AccountingMethod, DepositAccountType, ProductType, RuleTable, SlotFlags, SlotPresence,
};

fn product_type() -> impl Strategy<Value = ProductType> {
    prop_oneof![
        Just(ProductType::Loan),
        Just(ProductType::Savings),
        Just(ProductType::Share),
    ]
}

fn method() -> impl Strategy<Value = AccountingMethod> {
    (1i64..=4).prop_map(|code| AccountingMethod::from_code(code).unwrap())
}

fn deposit_type() -> impl Strategy<Value = DepositAccountType> {
    prop_oneof![Just(100i64), Just(200), Just(300)].prop_map(|code| DepositAccountType::from_code(code).unwrap())
}

// ============================================================================
// RECONCILIATION
// ============================================================================

mod reconcile_properties {
    use super::*;

    proptest! {
        #[test]
        fn applying_operations_yields_incoming(
            existing in prop::collection::btree_map(1i64..20, 1i64..5, 0..10),
            incoming in prop::collection::btree_map(1i64..20, 1i64..5, 0..10),
        ) {
            let incoming_rows: Vec<(i64, i64)> = incoming.iter().map(|(k, v)| (*k, *v)).collect();
            let ops = reconcile(existing.clone(), &incoming_rows, "rows").unwrap();

            let mut result: BTreeMap<i64, i64> = existing.clone();
            for key in &ops.to_delete {
                prop_assert!(result.remove(key).is_some());
            }
            for (key, value) in &ops.to_update {
                prop_assert_ne!(existing.get(key), Some(value));
                result.insert(*key, *value);
            }
            for (key, value) in &ops.to_insert {
                prop_assert!(!existing.contains_key(key));
                result.insert(*key, *value);
            }

            prop_assert_eq!(result, incoming);
        }

        #[test]
        fn reconciling_with_itself_is_empty(
            rows in prop::collection::btree_map(1i64..50, 1i64..50, 0..15),
        ) {
            let incoming: Vec<(i64, i64)> = rows.iter().map(|(k, v)| (*k, *v)).collect();
            let ops = reconcile(rows.clone(), &incoming, "rows").unwrap();
            prop_assert!(ops.is_empty());
        }
    }
}

// ============================================================================
// RULE TABLE
// ============================================================================

mod rule_table_properties {
    use super::*;

    proptest! {
        #[test]
        fn plans_have_unique_slots_and_parameters(
            product_type in product_type(),
            method in method(),
            deposit_type in deposit_type(),
            dormancy_tracking in any::<bool>(),
        ) {
            let flags = SlotFlags { dormancy_tracking };
            if let Ok(plan) = RuleTable::plan(product_type, method, deposit_type, flags) {
                let mut slots: Vec<_> = plan.rules().map(|rule| rule.slot).collect();
                let mut parameters: Vec<_> = plan.rules().map(|rule| rule.parameter).collect();
                let total = slots.len();
                slots.sort();
                slots.dedup();
                parameters.sort();
                parameters.dedup();
                prop_assert_eq!(slots.len(), total);
                prop_assert_eq!(parameters.len(), total);

                prop_assert!(plan.optional.iter().all(|rule| rule.presence == SlotPresence::Optional));
                prop_assert!(plan.required.iter().all(|rule| rule.presence != SlotPresence::Optional));
                prop_assert!(plan.rules().all(|rule| rule.accepts(rule.category)));
            }
        }

        #[test]
        fn none_always_resolves_to_empty_plan(
            product_type in product_type(),
            deposit_type in deposit_type(),
        ) {
            let plan = RuleTable::plan(product_type, AccountingMethod::None, deposit_type, SlotFlags::default()).unwrap();
            prop_assert!(plan.is_empty());
        }

        #[test]
        fn accrual_only_slots_never_appear_under_cash(
            product_type in product_type(),
            deposit_type in deposit_type(),
        ) {
            let plan = RuleTable::plan(product_type, AccountingMethod::CashBased, deposit_type, SlotFlags::default()).unwrap();
            prop_assert!(plan.rules().all(|rule| !rule.slot.is_accrual_only()));
        }
    }
}
