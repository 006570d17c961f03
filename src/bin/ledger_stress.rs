//! Ledger stress driver
//!
//! Fires concurrent deposits and withdrawals at one customer and checks the
//! balance stays consistent and never negative.
//!
//! Run with: cargo run --bin ledger_stress --release -- --ops 1000

use std::time::Instant;

use atm_simulator::{db, Amount, AppError, Balance, DomainError, Ledger, Pin};

const OPENING_BALANCE: i64 = 100;
const DEPOSIT: i64 = 20;
const WITHDRAWAL: i64 = 50;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let ops: u64 = args
        .iter()
        .position(|a| a == "--ops")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    let pool = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            println!("Using database {}", url);
            db::connect(&url, 5).await?
        }
        Err(_) => {
            println!("Using in-memory database");
            db::connect_in_memory().await?
        }
    };
    db::init_schema(&pool).await?;

    let ledger = Ledger::new(pool.clone());
    let name = format!("Stress {}", uuid::Uuid::new_v4());
    let customer = ledger
        .create_customer(&name, &Pin::new("0000")?, Balance::new(OPENING_BALANCE)?)
        .await?;

    println!("Stress test - {} concurrent operations on {}", ops, customer.name);

    let deposit = Amount::new(DEPOSIT)?;
    let withdrawal = Amount::new(WITHDRAWAL)?;

    let start = Instant::now();
    let mut tasks = Vec::with_capacity(ops as usize);

    for i in 0..ops {
        let ledger = ledger.clone();
        let customer_id = customer.id;
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                ledger.deposit(customer_id, &deposit).await.map(|_| (true, true))
            } else {
                match ledger.withdraw(customer_id, &withdrawal).await {
                    Ok(_) => Ok((false, true)),
                    Err(AppError::Domain(DomainError::InsufficientFunds { .. })) => Ok((false, false)),
                    Err(e) => Err(e),
                }
            }
        }));
    }

    let mut deposits = 0i64;
    let mut withdrawals = 0i64;
    let mut refused = 0u64;
    let mut errors = 0u64;

    for task in tasks {
        match task.await? {
            Ok((true, _)) => deposits += 1,
            Ok((false, true)) => withdrawals += 1,
            Ok((false, false)) => refused += 1,
            Err(e) => {
                errors += 1;
                eprintln!("Operation failed: {}", e);
            }
        }
    }

    let elapsed = start.elapsed();
    let final_balance = ledger.get_balance(customer.id).await?.value();
    let expected = OPENING_BALANCE + deposits * DEPOSIT - withdrawals * WITHDRAWAL;

    println!("\n=== Stress Test Results ===");
    println!("Deposits: {}", deposits);
    println!("Withdrawals: {}", withdrawals);
    println!("Refused (insufficient funds): {}", refused);
    println!("Errors: {}", errors);
    println!("Final balance: {} (expected {})", final_balance, expected);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} ops/sec", ops as f64 / elapsed.as_secs_f64());

    if final_balance != expected || final_balance < 0 {
        return Err(anyhow::anyhow!("ledger inconsistent"));
    }

    pool.close().await;
    Ok(())
}
