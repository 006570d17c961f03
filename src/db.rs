//! Database module
//!
//! SQLite pool setup, schema creation and demo seed data.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::domain::{Balance, Pin};
use crate::error::AppResult;
use crate::ledger::Ledger;

/// Demo accounts created on first start
pub const DEMO_CUSTOMERS: [(&str, &str, i64); 3] = [
    ("Avi Cohen", "1234", 1000),
    ("Yossi Cohen", "6543", 500),
    ("Yuri Levi", "5852", 800),
];

const CREATE_CUSTOMERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE COLLATE NOCASE,
        pin_hash TEXT NOT NULL,
        balance INTEGER NOT NULL CHECK (balance >= 0)
    )
"#;

/// Open a pool, creating the database file if needed
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Private in-memory database on a single long-lived connection.
/// Every SQLite `:memory:` connection is its own database, so the pool must
/// never open a second one or drop the first.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
}

/// Simple connectivity check
pub async fn verify_connection(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Create tables that don't exist yet
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_CUSTOMERS_TABLE).execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &SqlitePool) -> Result<bool, sqlx::Error> {
    let required_tables = ["customers"];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Insert the demo customers when the table is empty.
/// Returns the number of customers created.
pub async fn seed_demo_customers(ledger: &Ledger) -> AppResult<usize> {
    if ledger.count_customers().await? > 0 {
        return Ok(0);
    }

    for (name, pin, balance) in DEMO_CUSTOMERS {
        let pin = Pin::new(pin)?;
        ledger.create_customer(name, &pin, Balance::new(balance)?).await?;
    }

    tracing::info!(count = DEMO_CUSTOMERS.len(), "Seeded demo customers");
    Ok(DEMO_CUSTOMERS.len())
}

/// Schema plus seed data, as done on startup
pub async fn initialize(pool: &SqlitePool) -> AppResult<()> {
    init_schema(pool).await?;
    seed_demo_customers(&Ledger::new(pool.clone())).await?;
    Ok(())
}
