//! Mapping assembly
//!
//! Turns a parsed payload and a resolved slot plan into GL mapping records.
//! Categories always come from the rule table; the payload only supplies
//! account ids.

use crate::error::ValidationErrors;
use crate::model::GlAccountMapping;
use crate::payload::ConfigurationPayload;
use crate::product::ProductRef;
use crate::rule_table::SlotPlan;

/// Builds mapping records from payload values
pub struct MappingAssembler;

impl MappingAssembler {
    /// Assembles one record per required slot plus one per supplied optional slot
    ///
    /// Every missing required slot is reported in the returned batch; the
    /// first missing slot does not stop the scan.
    pub fn assemble(
        product: ProductRef,
        payload: &ConfigurationPayload,
        plan: &SlotPlan,
    ) -> Result<Vec<GlAccountMapping>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut mappings = Vec::with_capacity(plan.required.len() + plan.optional.len());

        for rule in &plan.required {
            match payload.account(rule.parameter) {
                Some(gl_account_id) => mappings.push(GlAccountMapping {
                    product,
                    slot: rule.slot,
                    gl_account_id,
                    category: rule.category,
                }),
                None => errors.required(rule.parameter),
            }
        }

        for rule in &plan.optional {
            if let Some(gl_account_id) = payload.account(rule.parameter) {
                mappings.push(GlAccountMapping {
                    product,
                    slot: rule.slot,
                    gl_account_id,
                    category: rule.category,
                });
            }
        }

        errors.into_result().map(|_| mappings)
    }
}
