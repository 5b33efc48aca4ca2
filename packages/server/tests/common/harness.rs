//! Test harness with testcontainers for integration testing.
//!
//! Uses one shared Postgres container per test binary. The container and
//! migrations are initialized on the first test, then reused; every test
//! creates its own rows, so tests never depend on each other's data.

use std::sync::Arc;

use anyhow::{Context, Result};
use community_core::kernel::{RecordingNotifier, ServerDeps, TestDependencies};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared test infrastructure that persists across all tests in a binary.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=community_core=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Per-test context: a fresh pool against the shared database.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let (deps, notifier) = ctx.deps();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        // Enough connections for the concurrency tests to actually overlap
        let db_pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self { db_pool })
    }

    /// Default ServerDeps plus the recorder receiving its notifications.
    pub fn deps(&self) -> (ServerDeps, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let deps = TestDependencies::new()
            .notifier(notifier.clone())
            .into_server_deps(self.db_pool.clone());
        (deps, notifier)
    }

    /// ServerDeps built from a customized `TestDependencies`.
    pub fn deps_with(&self, test_deps: TestDependencies) -> ServerDeps {
        test_deps.into_server_deps(self.db_pool.clone())
    }
}
