//! Product classification
//!
//! The accounting engine does not own products; it only needs to know what
//! kind of product it is configuring, which accounting method applies, and
//! for savings products which deposit sub-type narrows the slot set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CoreError, ProductId};

/// Kind of financial product whose GL bindings are being configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Loan,
    Savings,
    Share,
}

impl ProductType {
    pub const ALL: [ProductType; 3] = [ProductType::Loan, ProductType::Savings, ProductType::Share];

    /// Returns the lowercase storage and routing name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Loan => "loan",
            ProductType::Savings => "savings",
            ProductType::Share => "share",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "loan" | "loans" => Ok(ProductType::Loan),
            "savings" => Ok(ProductType::Savings),
            "share" | "shares" => Ok(ProductType::Share),
            other => Err(CoreError::validation(format!("Unknown product type '{}'", other))),
        }
    }
}

/// Accounting method governing which GL slots a product must bind
///
/// The integer codes are the wire representation of the `accountingRule`
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountingMethod {
    None,
    CashBased,
    AccrualPeriodic,
    AccrualUpfront,
}

impl AccountingMethod {
    /// Resolves a wire code, returning `None` for codes outside the enumeration
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(AccountingMethod::None),
            2 => Some(AccountingMethod::CashBased),
            3 => Some(AccountingMethod::AccrualPeriodic),
            4 => Some(AccountingMethod::AccrualUpfront),
            _ => None,
        }
    }

    pub fn code(&self) -> i16 {
        match self {
            AccountingMethod::None => 1,
            AccountingMethod::CashBased => 2,
            AccountingMethod::AccrualPeriodic => 3,
            AccountingMethod::AccrualUpfront => 4,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, AccountingMethod::None)
    }
}

impl fmt::Display for AccountingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountingMethod::None => "NONE",
            AccountingMethod::CashBased => "CASH_BASED",
            AccountingMethod::AccrualPeriodic => "ACCRUAL_PERIODIC",
            AccountingMethod::AccrualUpfront => "ACCRUAL_UPFRONT",
        };
        f.write_str(name)
    }
}

/// Savings deposit sub-type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositAccountType {
    #[default]
    Standard,
    FixedDeposit,
    RecurringDeposit,
}

impl DepositAccountType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            100 => Some(DepositAccountType::Standard),
            200 => Some(DepositAccountType::FixedDeposit),
            300 => Some(DepositAccountType::RecurringDeposit),
            _ => None,
        }
    }

    pub fn code(&self) -> i16 {
        match self {
            DepositAccountType::Standard => 100,
            DepositAccountType::FixedDeposit => 200,
            DepositAccountType::RecurringDeposit => 300,
        }
    }

    /// Fixed and recurring deposits are term deposits with a reduced slot set
    pub fn is_term_deposit(&self) -> bool {
        !matches!(self, DepositAccountType::Standard)
    }
}

/// Reference to the product whose accounting is being configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub product_type: ProductType,
}

impl ProductRef {
    pub fn new(id: ProductId, product_type: ProductType) -> Self {
        Self { id, product_type }
    }

    pub fn loan(id: i64) -> Self {
        Self::new(ProductId::new(id), ProductType::Loan)
    }

    pub fn savings(id: i64) -> Self {
        Self::new(ProductId::new(id), ProductType::Savings)
    }

    pub fn share(id: i64) -> Self {
        Self::new(ProductId::new(id), ProductType::Share)
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.product_type, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accounting_method_codes() {
        for method in [
            AccountingMethod::None,
            AccountingMethod::CashBased,
            AccountingMethod::AccrualPeriodic,
            AccountingMethod::AccrualUpfront,
        ] {
            assert_eq!(AccountingMethod::from_code(method.code() as i64), Some(method));
        }
        assert_eq!(AccountingMethod::from_code(0), None);
        assert_eq!(AccountingMethod::from_code(5), None);
    }

    #[test]
    fn test_product_type_parsing() {
        assert_eq!("LOAN".parse::<ProductType>().unwrap(), ProductType::Loan);
        assert_eq!("shares".parse::<ProductType>().unwrap(), ProductType::Share);
        assert!("mortgage".parse::<ProductType>().is_err());
    }

    #[test]
    fn test_deposit_type_term_deposit() {
        assert!(!DepositAccountType::Standard.is_term_deposit());
        assert!(DepositAccountType::FixedDeposit.is_term_deposit());
        assert!(DepositAccountType::RecurringDeposit.is_term_deposit());
        assert_eq!(DepositAccountType::from_code(400), None);
    }

    #[test]
    fn test_product_ref_display() {
        assert_eq!(ProductRef::savings(3).to_string(), "savings:PRD-3");
    }
}
