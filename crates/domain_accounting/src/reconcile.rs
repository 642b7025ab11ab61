//! Advanced mapping reconciliation
//!
//! Payment-channel and charge-income overrides are keyed collections. On
//! every update the submitted collection replaces the stored one, which is
//! computed as a set difference so that unchanged rows are never rewritten.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use core_kernel::{ChargeId, GlAccountId, PaymentTypeId};

use crate::error::MappingError;
use crate::model::{ChargeIncomeMapping, ChargeKind, ConfigurationSnapshot, PaymentChannelMapping};
use crate::payload::{ChargeIncomeEntry, PaymentChannelEntry};

/// Row operations needed to turn the stored collection into the submitted one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<K, V> {
    pub to_insert: Vec<(K, V)>,
    pub to_update: Vec<(K, V)>,
    pub to_delete: Vec<K>,
}

impl<K, V> Default for Reconciliation<K, V> {
    fn default() -> Self {
        Self {
            to_insert: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }
}

impl<K, V> Reconciliation<K, V> {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Diffs stored `(key, value)` rows against an incoming keyed collection
///
/// New keys are inserted, keys whose value differs are updated, and stored
/// keys absent from `incoming` are deleted. Inserts and updates keep the
/// incoming order; deletes are sorted by key. A key repeated within
/// `incoming` is a conflict naming `collection`.
pub fn reconcile<K, V>(
    existing: impl IntoIterator<Item = (K, V)>,
    incoming: &[(K, V)],
    collection: &str,
) -> Result<Reconciliation<K, V>, MappingError>
where
    K: Ord + Copy + Display,
    V: PartialEq + Copy,
{
    let stored: BTreeMap<K, V> = existing.into_iter().collect();
    let mut seen = BTreeSet::new();
    let mut result = Reconciliation::default();

    for &(key, value) in incoming {
        if !seen.insert(key) {
            return Err(MappingError::conflict(format!(
                "Duplicate key {} in {}",
                key, collection
            )));
        }
        match stored.get(&key) {
            None => result.to_insert.push((key, value)),
            Some(current) if *current != value => result.to_update.push((key, value)),
            Some(_) => {}
        }
    }

    result.to_delete = stored.keys().filter(|key| !seen.contains(*key)).copied().collect();
    Ok(result)
}

/// Applies [`reconcile`] to the two advanced mapping tables
pub struct AdvancedMappingHandler;

impl AdvancedMappingHandler {
    pub fn reconcile_payment_channels(
        snapshot: &ConfigurationSnapshot,
        incoming: &[PaymentChannelEntry],
        collection: &str,
    ) -> Result<Reconciliation<PaymentTypeId, GlAccountId>, MappingError> {
        let entries: Vec<_> = incoming
            .iter()
            .map(|e| (e.payment_type_id, e.fund_source_account_id))
            .collect();
        reconcile(
            snapshot
                .payment_channels
                .iter()
                .map(|m| (m.payment_type_id, m.fund_source_account_id)),
            &entries,
            collection,
        )
    }

    /// Reconciles against stored rows of `kind` only
    pub fn reconcile_charges(
        snapshot: &ConfigurationSnapshot,
        kind: ChargeKind,
        incoming: &[ChargeIncomeEntry],
        collection: &str,
    ) -> Result<Reconciliation<ChargeId, GlAccountId>, MappingError> {
        let entries: Vec<_> = incoming
            .iter()
            .map(|e| (e.charge_id, e.income_account_id))
            .collect();
        reconcile(
            snapshot
                .charges_of(kind)
                .map(|m| (m.charge_id, m.income_account_id)),
            &entries,
            collection,
        )
    }

    pub fn payment_channel_rows(
        ops: &[(PaymentTypeId, GlAccountId)],
    ) -> Vec<PaymentChannelMapping> {
        ops.iter()
            .map(|&(payment_type_id, fund_source_account_id)| PaymentChannelMapping {
                payment_type_id,
                fund_source_account_id,
            })
            .collect()
    }

    pub fn charge_rows(kind: ChargeKind, ops: &[(ChargeId, GlAccountId)]) -> Vec<ChargeIncomeMapping> {
        ops.iter()
            .map(|&(charge_id, income_account_id)| ChargeIncomeMapping {
                charge_id,
                income_account_id,
                kind,
            })
            .collect()
    }
}
