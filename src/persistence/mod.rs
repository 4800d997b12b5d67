// ============================================================================
// Persistence - SQLite access through sqlx
// ============================================================================
//
// - Database / UnitOfWork: pool handle and the one-transaction-per-call
//   boundary every service method runs in
// - Repositories: stateless statement sets, one per table family
// - Association state and query accounting shared by the query strategies
//
// ============================================================================

mod association;
mod fetch_plan;
mod item_repository;
mod member_repository;
mod order_repository;
mod query_log;
mod rows;
mod schema;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::config::Config;

pub use association::{Assoc, NotLoaded};
pub use fetch_plan::{InvalidPage, OrderFetchPlan, Page, Paged, ToOneShape, Unpaged, WithOrderItems, MAX_PAGE_LIMIT};
pub use item_repository::ItemRepository;
pub use member_repository::MemberRepository;
pub use order_repository::{OrderRepository, OrderSearch, SEARCH_LIMIT};
pub use query_log::{QueryKind, QueryLog};

/// Shared pool handle, cloned into every service at startup
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let url = config.database_url.as_str();
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to `:memory:` opens its own database, so the pool
        // must hold exactly one connection for its whole lifetime.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;

        tracing::info!(
            database_url = %url,
            in_memory = in_memory,
            "Connected to database"
        );

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        schema::apply(&self.pool).await
    }

    /// Open the transaction a single service call runs in
    pub async fn begin(&self) -> Result<UnitOfWork, sqlx::Error> {
        Ok(UnitOfWork {
            tx: self.pool.begin().await?,
            log: QueryLog::default(),
        })
    }

    /// Open a transaction that takes the write lock up front. Commands read
    /// before they write, and a deferred transaction whose snapshot went
    /// stale in between fails with SQLITE_BUSY instead of waiting.
    pub async fn begin_write(&self) -> Result<UnitOfWork, sqlx::Error> {
        Ok(UnitOfWork {
            tx: self.pool.begin_with("BEGIN IMMEDIATE").await?,
            log: QueryLog::default(),
        })
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    #[cfg(test)]
    pub(crate) async fn in_memory() -> Self {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            ..Config::default()
        };
        let db = Self::connect(&config).await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    /// File database with a multi-connection pool, for tests that race writers
    #[cfg(test)]
    pub(crate) async fn temp_file(dir: &tempfile::TempDir) -> Self {
        let config = Config {
            database_url: format!("sqlite:{}", dir.path().join("shop.db").display()),
            max_connections: 5,
            ..Config::default()
        };
        let db = Self::connect(&config).await.unwrap();
        db.migrate().await.unwrap();
        db
    }
}

// ============================================================================
// Unit of Work
// ============================================================================
//
// Wraps one transaction plus the log of statements issued through it.
// Dropping a unit of work without `commit` rolls the transaction back.
//
// ============================================================================

pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    log: QueryLog,
}

impl UnitOfWork {
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    pub fn record(&mut self, kind: QueryKind) {
        self.log.record(kind);
    }

    pub fn log(&self) -> &QueryLog {
        &self.log
    }

    pub async fn commit(self) -> Result<QueryLog, sqlx::Error> {
        self.tx.commit().await?;
        Ok(self.log)
    }
}
