//! Pre-built Test Fixtures
//!
//! A small, predictable chart of accounts and reference data set. Account ids
//! are grouped in blocks of one hundred per category, so any id tells you its
//! category at a glance.

use domain_accounting::{ChargeKind, GlAccountCategory, MockReferenceDirectory, ProductRef};

/// Products known to the fixture reference data
pub struct ProductFixtures;

impl ProductFixtures {
    pub fn loan() -> ProductRef {
        ProductRef::loan(1)
    }

    pub fn savings() -> ProductRef {
        ProductRef::savings(2)
    }

    pub fn share() -> ProductRef {
        ProductRef::share(3)
    }

    /// A product the reference data does not contain
    pub fn unknown_loan() -> ProductRef {
        ProductRef::loan(999)
    }

    pub fn all() -> [ProductRef; 3] {
        [Self::loan(), Self::savings(), Self::share()]
    }
}

/// Fixture chart of accounts
///
/// | Ids     | Category  |
/// |---------|-----------|
/// | 100-199 | ASSET     |
/// | 200-299 | LIABILITY |
/// | 300-399 | EQUITY    |
/// | 400-499 | INCOME    |
/// | 500-599 | EXPENSE   |
pub struct ChartOfAccounts;

impl ChartOfAccounts {
    pub const CATEGORIES: [GlAccountCategory; 5] = [
        GlAccountCategory::Asset,
        GlAccountCategory::Liability,
        GlAccountCategory::Equity,
        GlAccountCategory::Income,
        GlAccountCategory::Expense,
    ];

    /// First account id of a category block
    pub fn block(category: GlAccountCategory) -> i64 {
        match category {
            GlAccountCategory::Asset => 100,
            GlAccountCategory::Liability => 200,
            GlAccountCategory::Equity => 300,
            GlAccountCategory::Income => 400,
            GlAccountCategory::Expense => 500,
        }
    }

    /// The `offset`-th account of a category
    pub fn account(category: GlAccountCategory, offset: i64) -> i64 {
        Self::block(category) + offset
    }

    /// Every account id of a category
    pub fn accounts(category: GlAccountCategory) -> std::ops::Range<i64> {
        let start = Self::block(category);
        start..start + 100
    }

    /// An account id outside every block
    pub fn missing_account() -> i64 {
        9_999
    }
}

/// Payment types and charges known to the fixture reference data
pub struct ReferenceFixtures;

impl ReferenceFixtures {
    pub const PAYMENT_TYPES: [i64; 3] = [1, 2, 3];
    pub const FEE_CHARGES: [i64; 2] = [11, 12];
    pub const PENALTY_CHARGES: [i64; 1] = [21];

    pub fn charges() -> Vec<(i64, ChargeKind)> {
        Self::FEE_CHARGES
            .iter()
            .map(|id| (*id, ChargeKind::Fee))
            .chain(Self::PENALTY_CHARGES.iter().map(|id| (*id, ChargeKind::Penalty)))
            .collect()
    }
}

/// In-memory reference directory populated with every fixture
pub fn fixture_directory() -> MockReferenceDirectory {
    let mut directory = MockReferenceDirectory::new();
    for product in ProductFixtures::all() {
        directory = directory.with_product(product);
    }
    for category in ChartOfAccounts::CATEGORIES {
        directory = directory.with_gl_accounts(ChartOfAccounts::accounts(category), category);
    }
    for payment_type in ReferenceFixtures::PAYMENT_TYPES {
        directory = directory.with_payment_type(payment_type);
    }
    for (charge, kind) in ReferenceFixtures::charges() {
        directory = directory.with_charge(charge, kind);
    }
    directory
}
