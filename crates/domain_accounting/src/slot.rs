//! Mapping slots and GL account categories
//!
//! A slot is a named binding point ("fund source", "interest receivable")
//! that must point at exactly one GL account once a product is configured.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::CoreError;

/// Top-level classification of a GL account in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlAccountCategory {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl GlAccountCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlAccountCategory::Asset => "ASSET",
            GlAccountCategory::Liability => "LIABILITY",
            GlAccountCategory::Equity => "EQUITY",
            GlAccountCategory::Income => "INCOME",
            GlAccountCategory::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for GlAccountCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlAccountCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASSET" => Ok(GlAccountCategory::Asset),
            "LIABILITY" => Ok(GlAccountCategory::Liability),
            "EQUITY" => Ok(GlAccountCategory::Equity),
            "INCOME" => Ok(GlAccountCategory::Income),
            "EXPENSE" => Ok(GlAccountCategory::Expense),
            other => Err(CoreError::validation(format!("Unknown GL account category '{}'", other))),
        }
    }
}

/// Whether a slot posts on a cash or an accrual basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostingBasis {
    Cash,
    Accrual,
}

macro_rules! define_slots {
    ($($variant:ident => $code:literal),+ $(,)?) => {
        /// Logical binding point between a product and a GL account
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum MappingSlot {
            $($variant),+
        }

        impl MappingSlot {
            pub const ALL: &'static [MappingSlot] = &[$(MappingSlot::$variant),+];

            /// Stable storage code for the slot
            pub fn code(&self) -> &'static str {
                match self {
                    $(MappingSlot::$variant => $code),+
                }
            }
        }

        impl FromStr for MappingSlot {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(MappingSlot::$variant),)+
                    other => Err(CoreError::validation(format!("Unknown mapping slot '{}'", other))),
                }
            }
        }
    };
}

define_slots! {
    // Loan
    FundSource => "fund_source",
    LoanPortfolio => "loan_portfolio",
    TransfersInSuspense => "transfers_in_suspense",
    InterestOnLoans => "interest_on_loans",
    IncomeFromFees => "income_from_fees",
    IncomeFromPenalties => "income_from_penalties",
    IncomeFromRecovery => "income_from_recovery",
    IncomeFromChargeOffInterest => "income_from_charge_off_interest",
    IncomeFromChargeOffFees => "income_from_charge_off_fees",
    IncomeFromChargeOffPenalty => "income_from_charge_off_penalty",
    IncomeFromGoodwillCreditInterest => "income_from_goodwill_credit_interest",
    IncomeFromGoodwillCreditFees => "income_from_goodwill_credit_fees",
    IncomeFromGoodwillCreditPenalty => "income_from_goodwill_credit_penalty",
    LossesWrittenOff => "losses_written_off",
    GoodwillCredit => "goodwill_credit",
    ChargeOffExpense => "charge_off_expense",
    ChargeOffFraudExpense => "charge_off_fraud_expense",
    OverpaymentLiability => "overpayment_liability",
    InterestReceivable => "interest_receivable",
    FeesReceivable => "fees_receivable",
    PenaltiesReceivable => "penalties_receivable",
    // Savings
    SavingsReference => "savings_reference",
    OverdraftPortfolioControl => "overdraft_portfolio_control",
    IncomeFromInterest => "income_from_interest",
    InterestOnSavings => "interest_on_savings",
    SavingsControl => "savings_control",
    EscheatLiability => "escheat_liability",
    InterestPayable => "interest_payable",
    // Shares
    SharesReference => "shares_reference",
    SharesEquity => "shares_equity",
    SharesSuspense => "shares_suspense",
}

impl MappingSlot {
    /// Receivable and payable slots only exist under accrual accounting
    pub fn is_accrual_only(&self) -> bool {
        matches!(
            self,
            MappingSlot::InterestReceivable
                | MappingSlot::FeesReceivable
                | MappingSlot::PenaltiesReceivable
                | MappingSlot::InterestPayable
        )
    }
}

impl fmt::Display for MappingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
