//! Database Test Utilities
//!
//! Provides a PostgreSQL testcontainer with the schema migrated and the
//! fixture reference data seeded.

use sqlx::PgPool;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

use domain_accounting::GlAccountCategory;
use infra_db::repositories::mapping::{ChargeKind, ProductType};
use infra_db::repositories::ReferenceRepository;
use infra_db::{create_pool, run_migrations, DatabaseConfig};

use crate::fixtures::{ChartOfAccounts, ProductFixtures, ReferenceFixtures};

const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "accounting_test";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A wrapper around a PostgreSQL test container
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a PostgreSQL container and applies the migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or a migration fails
    pub async fn new() -> Result<Self, BoxError> {
        let container = Postgres::default()
            .with_db_name(POSTGRES_DB)
            .with_user(POSTGRES_USER)
            .with_password(POSTGRES_PASSWORD)
            .with_tag(POSTGRES_TAG)
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432.tcp()).await?;
        let host = container.get_host().await?.to_string();

        let config = TestDatabaseConfig {
            host,
            port,
            ..Default::default()
        };

        let pool = create_pool(DatabaseConfig::new(config.connection_url()).max_connections(5)).await?;
        run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            config,
            pool,
        })
    }

    /// Starts a database with the fixture reference data already inserted
    pub async fn seeded() -> Result<Self, BoxError> {
        let db = Self::new().await?;
        db.seed_reference_data().await?;
        Ok(db)
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts the fixture products, chart of accounts, payment types and charges
    pub async fn seed_reference_data(&self) -> Result<(), BoxError> {
        let reference = ReferenceRepository::new(self.pool.clone());

        for product in ProductFixtures::all() {
            reference
                .insert_product(
                    product.id.value(),
                    ProductType::from(product.product_type),
                    &format!("Fixture {}", product),
                )
                .await?;
        }

        for category in ChartOfAccounts::CATEGORIES {
            for id in ChartOfAccounts::accounts(category) {
                reference
                    .insert_gl_account(
                        id,
                        &id.to_string(),
                        &format!("{} account {}", category, id),
                        category_row(category),
                    )
                    .await?;
            }
        }

        for payment_type in ReferenceFixtures::PAYMENT_TYPES {
            reference
                .insert_payment_type(payment_type, &format!("Payment type {}", payment_type))
                .await?;
        }

        for (charge, kind) in ReferenceFixtures::charges() {
            reference
                .insert_charge(charge, &format!("Charge {}", charge), ChargeKind::from(kind))
                .await?;
        }

        Ok(())
    }
}

fn category_row(category: GlAccountCategory) -> infra_db::repositories::mapping::GlAccountCategory {
    category.into()
}

/// Creates an isolated, seeded test database for a single test
pub async fn create_isolated_test_database() -> Result<TestDatabase, BoxError> {
    TestDatabase::seeded().await
}
