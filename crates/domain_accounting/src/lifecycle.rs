//! Accounting configuration lifecycle
//!
//! The coordinator drives a product's configuration through its states:
//!
//! ```text
//!   UNCONFIGURED ──create(method ≠ NONE)──▶ CONFIGURED(method)
//!   CONFIGURED(m) ──update(method m)──────▶ CONFIGURED(m)      slots patched in place
//!   CONFIGURED(a) ──update(method b)──────▶ CONFIGURED(b)      all GL rows recreated
//!   CONFIGURED(m) ──update(method NONE)───▶ UNCONFIGURED       GL rows deleted
//! ```
//!
//! Every operation loads one snapshot, computes one [`MappingChangeSet`] and
//! hands it to [`MappingStore::apply`] exactly once, so a rejected request
//! never leaves partial writes behind.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{GlAccountId, HealthCheckResult, OperationMetadata, ProductId};

use crate::assembler::MappingAssembler;
use crate::change_tracker::{self, ChangeTracker, Changes};
use crate::error::{MappingError, ValidationCode, ValidationErrors};
use crate::model::{
    AccountingConfiguration, ChargeIncomeMapping, ChargeKind, ConfigurationSnapshot, ConfigurationState,
    GlAccountMapping, MappingChangeSet, PaymentChannelMapping,
};
use crate::payload::{
    charge_collection_parameter, ConfigurationPayload, ACCOUNTING_RULE, DEPOSIT_ACCOUNT_TYPE, DORMANCY_TRACKING,
    PAYMENT_CHANNEL_MAPPINGS,
};
use crate::ports::{MappingStore, ReferenceDirectory};
use crate::product::{AccountingMethod, DepositAccountType, ProductRef, ProductType};
use crate::reconcile::AdvancedMappingHandler;
use crate::rule_table::{RuleTable, SlotFlags, SlotPlan, SlotPresence};
use crate::slot::{GlAccountCategory, MappingSlot};

/// Result of a create or update, shaped for a command-result envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub resource_id: ProductId,
    pub changes: Changes,
}

/// One bound slot as presented to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotMappingView {
    pub slot: MappingSlot,
    pub parameter: Option<&'static str>,
    pub gl_account_id: GlAccountId,
    pub category: GlAccountCategory,
}

/// Stored configuration of a product, with GL mappings in rule order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingConfigurationView {
    pub product_id: ProductId,
    pub product_type: ProductType,
    pub state: ConfigurationState,
    pub accounting_rule: AccountingMethod,
    pub deposit_account_type: DepositAccountType,
    pub is_dormancy_tracking_active: bool,
    pub mappings: Vec<SlotMappingView>,
    pub payment_channel_to_fund_source_mappings: Vec<PaymentChannelMapping>,
    pub fee_to_income_account_mappings: Vec<ChargeIncomeMapping>,
    pub penalty_to_income_account_mappings: Vec<ChargeIncomeMapping>,
}

/// Orchestrates create, update, delete and fetch of product accounting
pub struct MappingLifecycleCoordinator {
    store: Arc<dyn MappingStore>,
    directory: Arc<dyn ReferenceDirectory>,
}

impl MappingLifecycleCoordinator {
    pub fn new(store: Arc<dyn MappingStore>, directory: Arc<dyn ReferenceDirectory>) -> Self {
        Self { store, directory }
    }

    /// Submits a product's accounting configuration for the first time
    ///
    /// # Errors
    ///
    /// - `MappingError::NotFound` if the product or a referenced entity does not exist
    /// - `MappingError::Conflict` if the product already has a configuration,
    ///   or an advanced collection repeats a key
    /// - `MappingError::Validation` with every payload problem and every
    ///   missing required slot
    #[instrument(skip(self, json, metadata), fields(product = %product))]
    pub async fn create(
        &self,
        product: ProductRef,
        json: &Value,
        metadata: Option<OperationMetadata>,
    ) -> Result<CommandOutcome, MappingError> {
        self.ensure_product(product).await?;

        let (payload, mut errors) = ConfigurationPayload::parse_collecting(product.product_type, json);
        let snapshot = self.store.load(product, metadata.clone()).await?;
        if snapshot.configuration.is_some() {
            warn!("Accounting configuration already exists");
            return Err(MappingError::conflict(format!(
                "Accounting configuration for {} already exists",
                product
            )));
        }

        if payload.accounting_method.is_none() && !errors.contains(ACCOUNTING_RULE) {
            errors.required(ACCOUNTING_RULE);
        }
        let deposit_account_type = payload.deposit_account_type.unwrap_or_default();
        let flags = SlotFlags {
            dormancy_tracking: payload.dormancy_tracking.unwrap_or(false),
        };

        let mut plan = SlotPlan::default();
        let mut gl_inserts = Vec::new();
        if let Some(method) = payload.accounting_method {
            if let Some(resolved) = resolve_plan(product.product_type, method, deposit_account_type, flags, &mut errors) {
                match MappingAssembler::assemble(product, &payload, &resolved) {
                    Ok(mappings) => gl_inserts = mappings,
                    Err(missing) => errors.extend(missing),
                }
                plan = resolved;
            }
        }

        let method = match (payload.accounting_method, errors.is_empty()) {
            (Some(method), true) => method,
            _ => {
                warn!(errors = errors.len(), "Rejected accounting configuration");
                return Err(MappingError::Validation(errors));
            }
        };

        let now = Utc::now();
        let mut changes = MappingChangeSet {
            upsert_configuration: Some(AccountingConfiguration {
                product,
                method,
                deposit_account_type,
                dormancy_tracking: flags.dormancy_tracking,
                created_at: now,
                updated_at: now,
            }),
            gl_inserts,
            ..Default::default()
        };
        let mut tracker = ChangeTracker::new();
        plan_advanced(&snapshot, &payload, &mut changes, &mut tracker)?;
        self.verify_references(&plan, &changes).await?;

        debug!(
            gl_inserts = changes.gl_inserts.len(),
            row_operations = changes.row_operations(),
            "Applying accounting configuration"
        );
        self.store.apply(product, &changes, metadata).await?;

        info!(method = %method, mappings = changes.gl_inserts.len(), "Accounting configuration created");
        Ok(CommandOutcome {
            resource_id: product.id,
            changes: Changes::new(),
        })
    }

    /// Updates a product's accounting configuration
    ///
    /// When the accounting method changes, every GL mapping row is deleted
    /// and the full slot set is recreated from the payload. Otherwise only
    /// slots whose account actually differs are written. Advanced
    /// collections present in the payload are reconciled in both cases.
    ///
    /// Returns the changed parameters; an empty map means nothing was written.
    #[instrument(skip(self, json, metadata), fields(product = %product))]
    pub async fn update(
        &self,
        product: ProductRef,
        json: &Value,
        metadata: Option<OperationMetadata>,
    ) -> Result<CommandOutcome, MappingError> {
        let (payload, mut errors) = ConfigurationPayload::parse_collecting(product.product_type, json);
        let snapshot = self.store.load(product, metadata.clone()).await?;
        let Some(existing) = snapshot.configuration.clone() else {
            return Err(MappingError::not_found("AccountingConfiguration", product));
        };

        let method = payload.accounting_method.unwrap_or(existing.method);
        let deposit_account_type = payload
            .deposit_account_type
            .unwrap_or(existing.deposit_account_type);
        let flags = SlotFlags {
            dormancy_tracking: payload.dormancy_tracking.unwrap_or(existing.dormancy_tracking),
        };

        let mut tracker = ChangeTracker::new();
        let mut config_changed = tracker.track(ACCOUNTING_RULE, Some(&existing.method.code()), &method.code());
        if product.product_type == ProductType::Savings {
            config_changed |= tracker.track(
                DEPOSIT_ACCOUNT_TYPE,
                Some(&existing.deposit_account_type.code()),
                &deposit_account_type.code(),
            );
            config_changed |= tracker.track(
                DORMANCY_TRACKING,
                Some(&existing.dormancy_tracking),
                &flags.dormancy_tracking,
            );
        }

        let mut changes = MappingChangeSet::default();
        let mut plan = SlotPlan::default();

        if method != existing.method {
            if method.is_none() {
                changes.delete_all_gl_mappings = !snapshot.gl_mappings.is_empty();
            } else if let Some(resolved) =
                resolve_plan(product.product_type, method, deposit_account_type, flags, &mut errors)
            {
                match MappingAssembler::assemble(product, &payload, &resolved) {
                    Ok(mappings) => {
                        for mapping in &mappings {
                            if let Some(rule) = resolved.rule_for(mapping.slot) {
                                tracker.record(rule.parameter, &mapping.gl_account_id);
                            }
                        }
                        changes.delete_all_gl_mappings = true;
                        changes.gl_inserts = mappings;
                    }
                    Err(missing) => errors.extend(missing),
                }
                plan = resolved;
            }
        } else if !method.is_none() {
            if let Some(resolved) =
                resolve_plan(product.product_type, method, deposit_account_type, flags, &mut errors)
            {
                patch_in_place(product, &snapshot, &payload, &resolved, &mut changes, &mut tracker, &mut errors);
                plan = resolved;
            }
        }

        if !errors.is_empty() {
            warn!(errors = errors.len(), "Rejected accounting configuration update");
            return Err(MappingError::Validation(errors));
        }

        plan_advanced(&snapshot, &payload, &mut changes, &mut tracker)?;

        if changes.is_empty() && !config_changed {
            debug!("Accounting configuration unchanged");
            return Ok(CommandOutcome {
                resource_id: product.id,
                changes: tracker.into_changes(),
            });
        }

        self.verify_references(&plan, &changes).await?;

        changes.upsert_configuration = Some(AccountingConfiguration {
            method,
            deposit_account_type,
            dormancy_tracking: flags.dormancy_tracking,
            updated_at: Utc::now(),
            ..existing.clone()
        });

        debug!(
            recreate = changes.delete_all_gl_mappings,
            row_operations = changes.row_operations(),
            "Applying accounting configuration update"
        );
        self.store.apply(product, &changes, metadata).await?;

        if method != existing.method {
            info!(from = %existing.method, to = %method, "Accounting method changed");
        } else {
            info!(row_operations = changes.row_operations(), "Accounting configuration updated");
        }
        Ok(CommandOutcome {
            resource_id: product.id,
            changes: tracker.into_changes(),
        })
    }

    /// Removes a product's configuration record and every mapping row
    #[instrument(skip(self, metadata), fields(product = %product))]
    pub async fn delete(&self, product: ProductRef, metadata: Option<OperationMetadata>) -> Result<(), MappingError> {
        let snapshot = self.store.load(product, metadata.clone()).await?;
        if snapshot.configuration.is_none() {
            return Err(MappingError::not_found("AccountingConfiguration", product));
        }

        let changes = MappingChangeSet {
            delete_configuration: true,
            ..Default::default()
        };
        self.store.apply(product, &changes, metadata).await?;

        info!(
            mappings = snapshot.gl_mappings.len(),
            payment_channels = snapshot.payment_channels.len(),
            charges = snapshot.charge_mappings.len(),
            "Accounting configuration deleted"
        );
        Ok(())
    }

    /// Returns the stored configuration of a product
    #[instrument(skip(self, metadata), fields(product = %product))]
    pub async fn fetch(
        &self,
        product: ProductRef,
        metadata: Option<OperationMetadata>,
    ) -> Result<AccountingConfigurationView, MappingError> {
        let snapshot = self.store.load(product, metadata).await?;
        let state = snapshot.state();
        let Some(config) = snapshot.configuration else {
            return Err(MappingError::not_found("AccountingConfiguration", product));
        };

        let plan = RuleTable::plan(
            product.product_type,
            config.method,
            config.deposit_account_type,
            SlotFlags {
                dormancy_tracking: config.dormancy_tracking,
            },
        )
        .unwrap_or_default();

        let mut mappings: Vec<SlotMappingView> = snapshot
            .gl_mappings
            .iter()
            .map(|m| SlotMappingView {
                slot: m.slot,
                parameter: plan.rule_for(m.slot).map(|rule| rule.parameter),
                gl_account_id: m.gl_account_id,
                category: m.category,
            })
            .collect();
        mappings.sort_by_key(|view| plan.position(view.slot).unwrap_or(usize::MAX));

        let (fees, penalties): (Vec<_>, Vec<_>) = snapshot
            .charge_mappings
            .iter()
            .copied()
            .partition(|m| m.kind == ChargeKind::Fee);

        Ok(AccountingConfigurationView {
            product_id: product.id,
            product_type: product.product_type,
            state,
            accounting_rule: config.method,
            deposit_account_type: config.deposit_account_type,
            is_dormancy_tracking_active: config.dormancy_tracking,
            mappings,
            payment_channel_to_fund_source_mappings: snapshot.payment_channels,
            fee_to_income_account_mappings: fees,
            penalty_to_income_account_mappings: penalties,
        })
    }

    /// Current lifecycle state of a product's configuration
    pub async fn state(&self, product: ProductRef) -> Result<ConfigurationState, MappingError> {
        Ok(self.store.load(product, None).await?.state())
    }

    /// Health of both ports
    pub async fn health(&self) -> Vec<HealthCheckResult> {
        vec![
            self.store.health_check().await,
            self.directory.health_check().await,
        ]
    }

    async fn ensure_product(&self, product: ProductRef) -> Result<(), MappingError> {
        if self.directory.product_exists(product).await? {
            Ok(())
        } else {
            Err(MappingError::not_found("Product", product))
        }
    }

    /// Checks every account, payment type and charge about to be written
    ///
    /// Missing entities fail immediately as not-found; category and charge
    /// kind mismatches are collected into one validation batch.
    async fn verify_references(&self, plan: &SlotPlan, changes: &MappingChangeSet) -> Result<(), MappingError> {
        let mut errors = ValidationErrors::new();
        let mut categories: HashMap<GlAccountId, GlAccountCategory> = HashMap::new();

        for mapping in changes.gl_inserts.iter().chain(changes.gl_updates.iter()) {
            let Some(rule) = plan.rule_for(mapping.slot) else {
                continue;
            };
            let category = self.account_category(mapping.gl_account_id, &mut categories).await?;
            if !rule.accepts(category) {
                errors.push(
                    rule.parameter,
                    ValidationCode::InvalidAccountCategory,
                    format!(
                        "GL account {} is {} but `{}` requires {}",
                        mapping.gl_account_id,
                        category,
                        rule.parameter,
                        accepted_categories(rule.category, rule.alternate_category)
                    ),
                );
            }
        }

        for channel in changes.channel_inserts.iter().chain(changes.channel_updates.iter()) {
            if !self.directory.payment_type_exists(channel.payment_type_id).await? {
                return Err(MappingError::not_found("PaymentType", channel.payment_type_id));
            }
            let category = self.account_category(channel.fund_source_account_id, &mut categories).await?;
            if category != GlAccountCategory::Asset {
                errors.push(
                    PAYMENT_CHANNEL_MAPPINGS,
                    ValidationCode::InvalidAccountCategory,
                    format!(
                        "Fund source {} for payment type {} must be an ASSET account, got {}",
                        channel.fund_source_account_id, channel.payment_type_id, category
                    ),
                );
            }
        }

        for charge in changes.charge_inserts.iter().chain(changes.charge_updates.iter()) {
            let parameter = charge_collection_parameter(charge.kind);
            let Some(kind) = self.directory.charge_kind(charge.charge_id).await? else {
                return Err(MappingError::not_found("Charge", charge.charge_id));
            };
            if kind != charge.kind {
                errors.push(
                    parameter,
                    ValidationCode::InvalidChargeKind,
                    format!("Charge {} is a {} but was submitted in `{}`", charge.charge_id, kind, parameter),
                );
            }
            let category = self.account_category(charge.income_account_id, &mut categories).await?;
            let accepted = match charge.kind {
                ChargeKind::Fee => matches!(category, GlAccountCategory::Income | GlAccountCategory::Liability),
                ChargeKind::Penalty => category == GlAccountCategory::Income,
            };
            if !accepted {
                errors.push(
                    parameter,
                    ValidationCode::InvalidAccountCategory,
                    format!(
                        "Income account {} for charge {} has unsupported category {}",
                        charge.income_account_id, charge.charge_id, category
                    ),
                );
            }
        }

        errors.into_result().map_err(|errors| {
            warn!(errors = errors.len(), "Referenced accounts rejected");
            MappingError::Validation(errors)
        })
    }

    async fn account_category(
        &self,
        id: GlAccountId,
        cache: &mut HashMap<GlAccountId, GlAccountCategory>,
    ) -> Result<GlAccountCategory, MappingError> {
        if let Some(category) = cache.get(&id) {
            return Ok(*category);
        }
        let category = self
            .directory
            .gl_account_category(id)
            .await?
            .ok_or_else(|| MappingError::not_found("GlAccount", id))?;
        cache.insert(id, category);
        Ok(category)
    }
}

fn resolve_plan(
    product_type: ProductType,
    method: AccountingMethod,
    deposit_account_type: DepositAccountType,
    flags: SlotFlags,
    errors: &mut ValidationErrors,
) -> Option<SlotPlan> {
    match RuleTable::plan(product_type, method, deposit_account_type, flags) {
        Ok(plan) => Some(plan),
        Err(unsupported) => {
            errors.invalid(ACCOUNTING_RULE, unsupported.to_string());
            None
        }
    }
}

/// Computes in-place writes for an unchanged accounting method
///
/// Only parameters whose value differs from the stored row are written. A
/// required slot with neither a stored row nor a supplied value is an error;
/// rows for slots that no longer apply (for example escheat after dormancy
/// tracking is switched off) are deleted.
fn patch_in_place(
    product: ProductRef,
    snapshot: &ConfigurationSnapshot,
    payload: &ConfigurationPayload,
    plan: &SlotPlan,
    changes: &mut MappingChangeSet,
    tracker: &mut ChangeTracker,
    errors: &mut ValidationErrors,
) {
    let existing: BTreeMap<String, GlAccountId> = plan
        .rules()
        .filter_map(|rule| {
            snapshot
                .gl_mapping(rule.slot)
                .map(|row| (rule.parameter.to_string(), row.gl_account_id))
        })
        .collect();
    let proposed: BTreeMap<String, GlAccountId> = plan
        .rules()
        .filter_map(|rule| payload.account(rule.parameter).map(|id| (rule.parameter.to_string(), id)))
        .collect();
    let changed = change_tracker::diff(&existing, &proposed);

    for rule in plan.rules() {
        if let Some(gl_account_id) = changed.get(rule.parameter) {
            let mapping = GlAccountMapping {
                product,
                slot: rule.slot,
                gl_account_id: *gl_account_id,
                category: rule.category,
            };
            if existing.contains_key(rule.parameter) {
                changes.gl_updates.push(mapping);
            } else {
                changes.gl_inserts.push(mapping);
            }
        } else if rule.presence != SlotPresence::Optional && !existing.contains_key(rule.parameter) {
            errors.required(rule.parameter);
        }
    }

    changes.gl_deletes = snapshot
        .gl_mappings
        .iter()
        .filter(|row| !plan.contains(row.slot))
        .map(|row| row.slot)
        .collect();

    tracker.extend(changed);
}

/// Reconciles every advanced collection present in the payload
fn plan_advanced(
    snapshot: &ConfigurationSnapshot,
    payload: &ConfigurationPayload,
    changes: &mut MappingChangeSet,
    tracker: &mut ChangeTracker,
) -> Result<(), MappingError> {
    if let Some(entries) = &payload.payment_channels {
        let ops = AdvancedMappingHandler::reconcile_payment_channels(snapshot, entries, PAYMENT_CHANNEL_MAPPINGS)?;
        if !ops.is_empty() {
            changes.channel_deletes.extend(ops.to_delete.iter().copied());
            changes
                .channel_updates
                .extend(AdvancedMappingHandler::payment_channel_rows(&ops.to_update));
            changes
                .channel_inserts
                .extend(AdvancedMappingHandler::payment_channel_rows(&ops.to_insert));
            tracker.record(PAYMENT_CHANNEL_MAPPINGS, entries);
        }
    }

    for kind in [ChargeKind::Fee, ChargeKind::Penalty] {
        let Some(entries) = payload.charge_entries(kind) else {
            continue;
        };
        let parameter = charge_collection_parameter(kind);
        let ops = AdvancedMappingHandler::reconcile_charges(snapshot, kind, entries, parameter)?;
        if !ops.is_empty() {
            changes.charge_deletes.extend(ops.to_delete.iter().copied());
            changes
                .charge_updates
                .extend(AdvancedMappingHandler::charge_rows(kind, &ops.to_update));
            changes
                .charge_inserts
                .extend(AdvancedMappingHandler::charge_rows(kind, &ops.to_insert));
            tracker.record(parameter, &entries);
        }
    }

    Ok(())
}

fn accepted_categories(primary: GlAccountCategory, alternate: Option<GlAccountCategory>) -> String {
    match alternate {
        Some(alternate) => format!("{} or {}", primary, alternate),
        None => primary.to_string(),
    }
}
