//! Strongly-typed identifiers for domain entities
//!
//! Products, GL accounts, payment types and charges are all keyed by
//! positive 64-bit integers in the ledger. Wrapping each in its own newtype
//! prevents a charge id from being bound where a GL account id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from its raw numeric value
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Creates an identifier, rejecting zero and negative values
            pub fn try_new(value: i64) -> Result<Self, CoreError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(CoreError::validation(format!(
                        "{} must be a positive integer, got {}",
                        stringify!($name),
                        value
                    )))
                }
            }

            /// Returns the underlying numeric value
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                let value = raw.trim().parse::<i64>().map_err(|_| {
                    CoreError::validation(format!("'{}' is not a valid {}", s, stringify!($name)))
                })?;
                Self::try_new(value)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Product catalogue
define_id!(ProductId, "PRD");

// Chart of accounts
define_id!(GlAccountId, "GL");

// Reference data used by advanced mappings
define_id!(PaymentTypeId, "PT");
define_id!(ChargeId, "CHG");
