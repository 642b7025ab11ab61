//! Persisted accounting configuration records
//!
//! A product's accounting configuration is stored as one configuration
//! record, one GL mapping row per bound slot, and two sparse advanced
//! mapping tables. Writes are expressed as a [`MappingChangeSet`] so that a
//! whole create, update or delete reaches storage in a single atomic call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ChargeId, GlAccountId, PaymentTypeId, PortError};

use crate::product::{AccountingMethod, DepositAccountType, ProductRef};
use crate::slot::{GlAccountCategory, MappingSlot};

/// Binding of one slot of a product to a GL account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlAccountMapping {
    pub product: ProductRef,
    pub slot: MappingSlot,
    pub gl_account_id: GlAccountId,
    pub category: GlAccountCategory,
}

/// Payment-channel specific fund source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentChannelMapping {
    pub payment_type_id: PaymentTypeId,
    pub fund_source_account_id: GlAccountId,
}

/// Kind of charge an income override applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    Fee,
    Penalty,
}

impl ChargeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeKind::Fee => "fee",
            ChargeKind::Penalty => "penalty",
        }
    }
}

impl fmt::Display for ChargeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Charge-specific income account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeIncomeMapping {
    pub charge_id: ChargeId,
    pub income_account_id: GlAccountId,
    pub kind: ChargeKind,
}

/// Per-product accounting settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingConfiguration {
    pub product: ProductRef,
    pub method: AccountingMethod,
    pub deposit_account_type: DepositAccountType,
    pub dormancy_tracking: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle state of a product's accounting configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationState {
    Unconfigured,
    Configured(AccountingMethod),
}

/// Everything stored for one product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigurationSnapshot {
    pub configuration: Option<AccountingConfiguration>,
    pub gl_mappings: Vec<GlAccountMapping>,
    pub payment_channels: Vec<PaymentChannelMapping>,
    pub charge_mappings: Vec<ChargeIncomeMapping>,
}

impl ConfigurationSnapshot {
    pub fn state(&self) -> ConfigurationState {
        match &self.configuration {
            Some(config) if !config.method.is_none() => ConfigurationState::Configured(config.method),
            _ => ConfigurationState::Unconfigured,
        }
    }

    pub fn gl_mapping(&self, slot: MappingSlot) -> Option<&GlAccountMapping> {
        self.gl_mappings.iter().find(|m| m.slot == slot)
    }

    /// Charge mappings of one kind
    pub fn charges_of(&self, kind: ChargeKind) -> impl Iterator<Item = &ChargeIncomeMapping> {
        self.charge_mappings.iter().filter(move |m| m.kind == kind)
    }

    /// Applies a change set in memory, failing without modification on any violation
    ///
    /// Enforces the same uniqueness and existence rules as the relational
    /// schema: duplicate inserts are conflicts and updates or deletes of
    /// missing rows are not-found errors.
    pub fn apply(&mut self, changes: &MappingChangeSet) -> Result<(), PortError> {
        let mut next = self.clone();
        next.apply_in_place(changes)?;
        *self = next;
        Ok(())
    }

    fn apply_in_place(&mut self, changes: &MappingChangeSet) -> Result<(), PortError> {
        if changes.delete_configuration {
            *self = ConfigurationSnapshot::default();
            return Ok(());
        }

        if let Some(config) = &changes.upsert_configuration {
            self.configuration = Some(config.clone());
        }

        if changes.delete_all_gl_mappings {
            self.gl_mappings.clear();
        }
        for slot in &changes.gl_deletes {
            let before = self.gl_mappings.len();
            self.gl_mappings.retain(|m| m.slot != *slot);
            if self.gl_mappings.len() == before {
                return Err(PortError::not_found("GlAccountMapping", slot));
            }
        }
        for update in &changes.gl_updates {
            let row = self
                .gl_mappings
                .iter_mut()
                .find(|m| m.slot == update.slot)
                .ok_or_else(|| PortError::not_found("GlAccountMapping", update.slot))?;
            row.gl_account_id = update.gl_account_id;
            row.category = update.category;
        }
        for insert in &changes.gl_inserts {
            if self.gl_mapping(insert.slot).is_some() {
                return Err(PortError::conflict(format!("{} for {}", insert.slot, insert.product)));
            }
            self.gl_mappings.push(insert.clone());
        }

        for key in &changes.channel_deletes {
            let before = self.payment_channels.len();
            self.payment_channels.retain(|m| m.payment_type_id != *key);
            if self.payment_channels.len() == before {
                return Err(PortError::not_found("PaymentChannelMapping", key));
            }
        }
        for update in &changes.channel_updates {
            let row = self
                .payment_channels
                .iter_mut()
                .find(|m| m.payment_type_id == update.payment_type_id)
                .ok_or_else(|| PortError::not_found("PaymentChannelMapping", update.payment_type_id))?;
            row.fund_source_account_id = update.fund_source_account_id;
        }
        for insert in &changes.channel_inserts {
            if self.payment_channels.iter().any(|m| m.payment_type_id == insert.payment_type_id) {
                return Err(PortError::conflict(format!("payment type {}", insert.payment_type_id)));
            }
            self.payment_channels.push(*insert);
        }

        for key in &changes.charge_deletes {
            let before = self.charge_mappings.len();
            self.charge_mappings.retain(|m| m.charge_id != *key);
            if self.charge_mappings.len() == before {
                return Err(PortError::not_found("ChargeIncomeMapping", key));
            }
        }
        for update in &changes.charge_updates {
            let row = self
                .charge_mappings
                .iter_mut()
                .find(|m| m.charge_id == update.charge_id)
                .ok_or_else(|| PortError::not_found("ChargeIncomeMapping", update.charge_id))?;
            row.income_account_id = update.income_account_id;
        }
        for insert in &changes.charge_inserts {
            if self.charge_mappings.iter().any(|m| m.charge_id == insert.charge_id) {
                return Err(PortError::conflict(format!("charge {}", insert.charge_id)));
            }
            self.charge_mappings.push(*insert);
        }

        Ok(())
    }
}

/// All writes produced by one lifecycle operation
///
/// Storage adapters apply the set atomically in this order: configuration
/// record, GL deletes, GL updates, GL inserts, then the advanced tables
/// (deletes, updates, inserts).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingChangeSet {
    pub upsert_configuration: Option<AccountingConfiguration>,
    /// Removes the configuration record and every mapping row of the product
    pub delete_configuration: bool,
    pub delete_all_gl_mappings: bool,
    pub gl_deletes: Vec<MappingSlot>,
    pub gl_updates: Vec<GlAccountMapping>,
    pub gl_inserts: Vec<GlAccountMapping>,
    pub channel_deletes: Vec<PaymentTypeId>,
    pub channel_updates: Vec<PaymentChannelMapping>,
    pub channel_inserts: Vec<PaymentChannelMapping>,
    pub charge_deletes: Vec<ChargeId>,
    pub charge_updates: Vec<ChargeIncomeMapping>,
    pub charge_inserts: Vec<ChargeIncomeMapping>,
}

impl MappingChangeSet {
    pub fn is_empty(&self) -> bool {
        self.upsert_configuration.is_none()
            && !self.delete_configuration
            && !self.delete_all_gl_mappings
            && self.gl_deletes.is_empty()
            && self.gl_updates.is_empty()
            && self.gl_inserts.is_empty()
            && !self.has_advanced_changes()
    }

    pub fn has_advanced_changes(&self) -> bool {
        !(self.channel_deletes.is_empty()
            && self.channel_updates.is_empty()
            && self.channel_inserts.is_empty()
            && self.charge_deletes.is_empty()
            && self.charge_updates.is_empty()
            && self.charge_inserts.is_empty())
    }

    /// Number of row-level writes, excluding the configuration record
    pub fn row_operations(&self) -> usize {
        self.gl_deletes.len()
            + self.gl_updates.len()
            + self.gl_inserts.len()
            + self.channel_deletes.len()
            + self.channel_updates.len()
            + self.channel_inserts.len()
            + self.charge_deletes.len()
            + self.charge_updates.len()
            + self.charge_inserts.len()
    }
}
