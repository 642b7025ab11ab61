//! Declarative slot requirements
//!
//! Each entry maps a (product type, accounting method, sub-type) combination
//! to the ordered list of slots a configured product binds. Adding a method
//! or a slot is an edit to the tables below; the lookup code never branches
//! on product or method.

use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::product::{AccountingMethod, DepositAccountType, ProductType};
use crate::slot::{GlAccountCategory, MappingSlot, PostingBasis};

use GlAccountCategory::{Asset, Equity, Expense, Income, Liability};
use MappingSlot::*;

/// When a slot must be bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPresence {
    /// Always bound for the combination
    Required,
    /// Bound only when the payload supplies it
    Optional,
    /// Required for savings products with dormancy tracking switched on
    WhenDormancyTracked,
}

/// One row of the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRule {
    pub slot: MappingSlot,
    /// Canonical payload parameter carrying the GL account id
    pub parameter: &'static str,
    /// Category recorded on the mapping row
    pub category: GlAccountCategory,
    /// Second category the referenced account may carry
    pub alternate_category: Option<GlAccountCategory>,
    pub basis: PostingBasis,
    pub presence: SlotPresence,
}

impl SlotRule {
    const fn required(slot: MappingSlot, parameter: &'static str, category: GlAccountCategory) -> Self {
        Self {
            slot,
            parameter,
            category,
            alternate_category: None,
            basis: PostingBasis::Cash,
            presence: SlotPresence::Required,
        }
    }

    const fn optional(slot: MappingSlot, parameter: &'static str, category: GlAccountCategory) -> Self {
        let mut rule = Self::required(slot, parameter, category);
        rule.presence = SlotPresence::Optional;
        rule
    }

    const fn accrual(mut self) -> Self {
        self.basis = PostingBasis::Accrual;
        self
    }

    const fn or(mut self, alternate: GlAccountCategory) -> Self {
        self.alternate_category = Some(alternate);
        self
    }

    const fn when_dormancy_tracked(mut self) -> Self {
        self.presence = SlotPresence::WhenDormancyTracked;
        self
    }

    /// Returns true if an account of `category` may be bound to this slot
    pub fn accepts(&self, category: GlAccountCategory) -> bool {
        self.category == category || self.alternate_category == Some(category)
    }

    fn applies(&self, flags: SlotFlags) -> bool {
        match self.presence {
            SlotPresence::Required | SlotPresence::Optional => true,
            SlotPresence::WhenDormancyTracked => flags.dormancy_tracking,
        }
    }
}

/// Flags on the configuration that switch conditional slots on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotFlags {
    pub dormancy_tracking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubTypeMatch {
    Any,
    Standard,
    TermDeposit,
}

impl SubTypeMatch {
    fn matches(&self, deposit_type: DepositAccountType) -> bool {
        match self {
            SubTypeMatch::Any => true,
            SubTypeMatch::Standard => !deposit_type.is_term_deposit(),
            SubTypeMatch::TermDeposit => deposit_type.is_term_deposit(),
        }
    }
}

struct RuleEntry {
    product_type: ProductType,
    method: AccountingMethod,
    sub_type: SubTypeMatch,
    slots: &'static [SlotRule],
}

// ============================================================================
// Loan
// ============================================================================

const LOAN_CASH: &[SlotRule] = &[
    SlotRule::required(FundSource, "fundSourceAccountId", Asset).or(Liability),
    SlotRule::required(LoanPortfolio, "loanPortfolioAccountId", Asset),
    SlotRule::required(TransfersInSuspense, "transfersInSuspenseAccountId", Asset),
    SlotRule::required(InterestOnLoans, "interestOnLoanAccountId", Income),
    SlotRule::required(IncomeFromFees, "incomeFromFeeAccountId", Income),
    SlotRule::required(IncomeFromPenalties, "incomeFromPenaltyAccountId", Income),
    SlotRule::required(IncomeFromRecovery, "incomeFromRecoveryAccountId", Income),
    SlotRule::required(IncomeFromChargeOffInterest, "incomeFromChargeOffInterestAccountId", Income),
    SlotRule::required(IncomeFromChargeOffFees, "incomeFromChargeOffFeesAccountId", Income),
    SlotRule::required(IncomeFromGoodwillCreditInterest, "incomeFromGoodwillCreditInterestAccountId", Income),
    SlotRule::required(IncomeFromGoodwillCreditFees, "incomeFromGoodwillCreditFeesAccountId", Income),
    SlotRule::required(LossesWrittenOff, "writeOffAccountId", Expense),
    SlotRule::required(GoodwillCredit, "goodwillCreditAccountId", Expense),
    SlotRule::required(OverpaymentLiability, "overpaymentLiabilityAccountId", Liability),
    SlotRule::optional(IncomeFromChargeOffPenalty, "incomeFromChargeOffPenaltyAccountId", Income),
    SlotRule::optional(IncomeFromGoodwillCreditPenalty, "incomeFromGoodwillCreditPenaltyAccountId", Income),
    SlotRule::optional(ChargeOffExpense, "chargeOffExpenseAccountId", Expense),
    SlotRule::optional(ChargeOffFraudExpense, "chargeOffFraudExpenseAccountId", Expense),
];

const LOAN_ACCRUAL: &[SlotRule] = &[
    SlotRule::required(FundSource, "fundSourceAccountId", Asset).or(Liability),
    SlotRule::required(LoanPortfolio, "loanPortfolioAccountId", Asset).accrual(),
    SlotRule::required(TransfersInSuspense, "transfersInSuspenseAccountId", Asset).accrual(),
    SlotRule::required(InterestOnLoans, "interestOnLoanAccountId", Income).accrual(),
    SlotRule::required(IncomeFromFees, "incomeFromFeeAccountId", Income).accrual(),
    SlotRule::required(IncomeFromPenalties, "incomeFromPenaltyAccountId", Income).accrual(),
    SlotRule::required(IncomeFromRecovery, "incomeFromRecoveryAccountId", Income),
    SlotRule::required(IncomeFromChargeOffInterest, "incomeFromChargeOffInterestAccountId", Income),
    SlotRule::required(IncomeFromChargeOffFees, "incomeFromChargeOffFeesAccountId", Income),
    SlotRule::required(IncomeFromGoodwillCreditInterest, "incomeFromGoodwillCreditInterestAccountId", Income),
    SlotRule::required(IncomeFromGoodwillCreditFees, "incomeFromGoodwillCreditFeesAccountId", Income),
    SlotRule::required(LossesWrittenOff, "writeOffAccountId", Expense),
    SlotRule::required(GoodwillCredit, "goodwillCreditAccountId", Expense),
    SlotRule::required(OverpaymentLiability, "overpaymentLiabilityAccountId", Liability),
    SlotRule::required(InterestReceivable, "receivableInterestAccountId", Asset).accrual(),
    SlotRule::required(FeesReceivable, "receivableFeeAccountId", Asset).accrual(),
    SlotRule::required(PenaltiesReceivable, "receivablePenaltyAccountId", Asset).accrual(),
    SlotRule::optional(IncomeFromChargeOffPenalty, "incomeFromChargeOffPenaltyAccountId", Income),
    SlotRule::optional(IncomeFromGoodwillCreditPenalty, "incomeFromGoodwillCreditPenaltyAccountId", Income),
    SlotRule::optional(ChargeOffExpense, "chargeOffExpenseAccountId", Expense),
    SlotRule::optional(ChargeOffFraudExpense, "chargeOffFraudExpenseAccountId", Expense),
];

// ============================================================================
// Savings
// ============================================================================

const SAVINGS_CASH_STANDARD: &[SlotRule] = &[
    SlotRule::required(SavingsReference, "savingsReferenceAccountId", Asset),
    SlotRule::required(OverdraftPortfolioControl, "overdraftPortfolioControlId", Asset),
    SlotRule::required(IncomeFromFees, "incomeFromFeeAccountId", Income),
    SlotRule::required(IncomeFromPenalties, "incomeFromPenaltyAccountId", Income),
    SlotRule::required(IncomeFromInterest, "incomeFromInterestId", Income),
    SlotRule::required(InterestOnSavings, "interestOnSavingsAccountId", Expense),
    SlotRule::required(LossesWrittenOff, "writeOffAccountId", Expense),
    SlotRule::required(SavingsControl, "savingsControlAccountId", Liability),
    SlotRule::required(TransfersInSuspense, "transfersInSuspenseAccountId", Liability),
    SlotRule::required(EscheatLiability, "escheatLiabilityId", Liability).when_dormancy_tracked(),
];

const SAVINGS_CASH_TERM_DEPOSIT: &[SlotRule] = &[
    SlotRule::required(SavingsReference, "savingsReferenceAccountId", Asset),
    SlotRule::required(IncomeFromFees, "incomeFromFeeAccountId", Income),
    SlotRule::required(IncomeFromPenalties, "incomeFromPenaltyAccountId", Income),
    SlotRule::required(InterestOnSavings, "interestOnSavingsAccountId", Expense),
    SlotRule::required(SavingsControl, "savingsControlAccountId", Liability),
    SlotRule::required(TransfersInSuspense, "transfersInSuspenseAccountId", Liability),
    SlotRule::required(EscheatLiability, "escheatLiabilityId", Liability).when_dormancy_tracked(),
];

const SAVINGS_ACCRUAL_STANDARD: &[SlotRule] = &[
    SlotRule::required(SavingsReference, "savingsReferenceAccountId", Asset),
    SlotRule::required(OverdraftPortfolioControl, "overdraftPortfolioControlId", Asset),
    SlotRule::required(IncomeFromFees, "incomeFromFeeAccountId", Income),
    SlotRule::required(IncomeFromPenalties, "incomeFromPenaltyAccountId", Income),
    SlotRule::required(IncomeFromInterest, "incomeFromInterestId", Income),
    SlotRule::required(InterestOnSavings, "interestOnSavingsAccountId", Expense),
    SlotRule::required(LossesWrittenOff, "writeOffAccountId", Expense),
    SlotRule::required(SavingsControl, "savingsControlAccountId", Liability),
    SlotRule::required(TransfersInSuspense, "transfersInSuspenseAccountId", Liability),
    SlotRule::required(EscheatLiability, "escheatLiabilityId", Liability).when_dormancy_tracked(),
    SlotRule::required(FeesReceivable, "feesReceivableAccountId", Asset).accrual(),
    SlotRule::required(PenaltiesReceivable, "penaltiesReceivableAccountId", Asset).accrual(),
    SlotRule::required(InterestPayable, "interestPayableAccountId", Liability).accrual(),
];

const SAVINGS_ACCRUAL_TERM_DEPOSIT: &[SlotRule] = &[
    SlotRule::required(SavingsReference, "savingsReferenceAccountId", Asset),
    SlotRule::required(IncomeFromFees, "incomeFromFeeAccountId", Income),
    SlotRule::required(IncomeFromPenalties, "incomeFromPenaltyAccountId", Income),
    SlotRule::required(InterestOnSavings, "interestOnSavingsAccountId", Expense),
    SlotRule::required(SavingsControl, "savingsControlAccountId", Liability),
    SlotRule::required(TransfersInSuspense, "transfersInSuspenseAccountId", Liability),
    SlotRule::required(EscheatLiability, "escheatLiabilityId", Liability).when_dormancy_tracked(),
    SlotRule::required(FeesReceivable, "feesReceivableAccountId", Asset).accrual(),
    SlotRule::required(PenaltiesReceivable, "penaltiesReceivableAccountId", Asset).accrual(),
    SlotRule::required(InterestPayable, "interestPayableAccountId", Liability).accrual(),
];

// ============================================================================
// Shares
// ============================================================================

const SHARE_CASH: &[SlotRule] = &[
    SlotRule::required(SharesReference, "shareReferenceId", Asset),
    SlotRule::required(IncomeFromFees, "incomeFromFeeAccountId", Income),
    SlotRule::required(SharesEquity, "shareEquityId", Equity),
    SlotRule::required(SharesSuspense, "shareSuspenseId", Liability),
];

static RULES: &[RuleEntry] = &[
    RuleEntry { product_type: ProductType::Loan, method: AccountingMethod::CashBased, sub_type: SubTypeMatch::Any, slots: LOAN_CASH },
    RuleEntry { product_type: ProductType::Loan, method: AccountingMethod::AccrualPeriodic, sub_type: SubTypeMatch::Any, slots: LOAN_ACCRUAL },
    RuleEntry { product_type: ProductType::Loan, method: AccountingMethod::AccrualUpfront, sub_type: SubTypeMatch::Any, slots: LOAN_ACCRUAL },
    RuleEntry { product_type: ProductType::Savings, method: AccountingMethod::CashBased, sub_type: SubTypeMatch::Standard, slots: SAVINGS_CASH_STANDARD },
    RuleEntry { product_type: ProductType::Savings, method: AccountingMethod::CashBased, sub_type: SubTypeMatch::TermDeposit, slots: SAVINGS_CASH_TERM_DEPOSIT },
    RuleEntry { product_type: ProductType::Savings, method: AccountingMethod::AccrualPeriodic, sub_type: SubTypeMatch::Standard, slots: SAVINGS_ACCRUAL_STANDARD },
    RuleEntry { product_type: ProductType::Savings, method: AccountingMethod::AccrualPeriodic, sub_type: SubTypeMatch::TermDeposit, slots: SAVINGS_ACCRUAL_TERM_DEPOSIT },
    RuleEntry { product_type: ProductType::Share, method: AccountingMethod::CashBased, sub_type: SubTypeMatch::Any, slots: SHARE_CASH },
];

/// The accounting method has no rule set for the product type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Accounting method {method} is not supported for {product_type} products")]
pub struct UnsupportedMethod {
    pub product_type: ProductType,
    pub method: AccountingMethod,
}

/// Slots resolved for one configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotPlan {
    pub required: Vec<SlotRule>,
    pub optional: Vec<SlotRule>,
}

impl SlotPlan {
    /// Required slots followed by optional slots, in table order
    pub fn rules(&self) -> impl Iterator<Item = &SlotRule> {
        self.required.iter().chain(self.optional.iter())
    }

    pub fn rule_for(&self, slot: MappingSlot) -> Option<&SlotRule> {
        self.rules().find(|rule| rule.slot == slot)
    }

    pub fn contains(&self, slot: MappingSlot) -> bool {
        self.rule_for(slot).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }

    /// Position of the slot in table order, used to sort persisted rows
    pub fn position(&self, slot: MappingSlot) -> Option<usize> {
        self.rules().position(|rule| rule.slot == slot)
    }
}

/// Lookup over the static rule tables
pub struct RuleTable;

impl RuleTable {
    /// Resolves the slot plan for a configuration
    ///
    /// `NONE` resolves to an empty plan for every product type. Combinations
    /// without a table entry, such as share products on accrual accounting,
    /// are rejected.
    pub fn plan(
        product_type: ProductType,
        method: AccountingMethod,
        deposit_type: DepositAccountType,
        flags: SlotFlags,
    ) -> Result<SlotPlan, UnsupportedMethod> {
        if method.is_none() {
            return Ok(SlotPlan::default());
        }

        let entry = RULES
            .iter()
            .find(|entry| {
                entry.product_type == product_type
                    && entry.method == method
                    && entry.sub_type.matches(deposit_type)
            })
            .ok_or(UnsupportedMethod { product_type, method })?;

        let mut plan = SlotPlan::default();
        for rule in entry.slots.iter().filter(|rule| rule.applies(flags)) {
            match rule.presence {
                SlotPresence::Optional => plan.optional.push(*rule),
                SlotPresence::Required | SlotPresence::WhenDormancyTracked => plan.required.push(*rule),
            }
        }
        Ok(plan)
    }

    /// Ordered required slots for a configuration
    pub fn required_slots(
        product_type: ProductType,
        method: AccountingMethod,
        deposit_type: DepositAccountType,
        flags: SlotFlags,
    ) -> Result<Vec<SlotRule>, UnsupportedMethod> {
        Self::plan(product_type, method, deposit_type, flags).map(|plan| plan.required)
    }

    /// Returns true if the product type has a rule set for the method
    pub fn supports(product_type: ProductType, method: AccountingMethod) -> bool {
        method.is_none()
            || RULES
                .iter()
                .any(|entry| entry.product_type == product_type && entry.method == method)
    }

    /// Every slot parameter any rule set of the product type reads
    pub fn parameters_for(product_type: ProductType) -> BTreeSet<&'static str> {
        RULES
            .iter()
            .filter(|entry| entry.product_type == product_type)
            .flat_map(|entry| entry.slots.iter().map(|rule| rule.parameter))
            .collect()
    }
}
