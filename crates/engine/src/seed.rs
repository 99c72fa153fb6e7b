//! Synthetic dataset used when no transaction file is configured.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde_json::{Map, Value};

use crate::{Currency, Money, ResultEngine, Transaction, TransactionStatus, TransactionStore};

pub const GATEWAYS: [&str; 7] = [
    "UPI",
    "Razorpay",
    "Paytm",
    "PayU",
    "CCAvenue",
    "Instamojo",
    "Cashfree",
];

/// Days before `now` covered by generated transactions.
pub const SPAN_DAYS: i64 = 30;

const CURRENCY: &str = "INR";
const VENDORS: u32 = 10;
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn random_token<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(ALPHANUMERIC[rng.random_range(0..ALPHANUMERIC.len())]))
        .collect()
}

/// Generates `count` transactions dated in the [`SPAN_DAYS`] days before
/// `now`, at `now`'s time of day.
///
/// Amounts are uniform in `[0.00, 999.99]`. The output only depends on the
/// state of `rng`, so a seeded generator gives a reproducible dataset.
pub fn generate<R: Rng>(count: usize, now: DateTime<Utc>, rng: &mut R) -> Vec<Transaction> {
    let currency = Currency::try_from(CURRENCY).unwrap_or_default();
    let window_start = now - Duration::days(SPAN_DAYS);

    (0..count)
        .map(|i| {
            let occurred_at = window_start + Duration::days(rng.random_range(0..SPAN_DAYS));
            let gateway = GATEWAYS[rng.random_range(0..GATEWAYS.len())];
            let status = TransactionStatus::ALL[rng.random_range(0..TransactionStatus::ALL.len())];
            let amount = Money::new(rng.random_range(0..100_000));

            let mut metadata = Map::new();
            metadata.insert(
                "reference".to_string(),
                Value::String(format!("ref_{}", random_token(&mut *rng, 6))),
            );

            Transaction {
                id: format!("tx_{}{i:05}", random_token(&mut *rng, 9)),
                occurred_at,
                gateway: gateway.to_string(),
                amount,
                currency: currency.clone(),
                vendor: Some(format!("Vendor {}", rng.random_range(1..=VENDORS))),
                status: Some(status),
                metadata: Some(metadata),
            }
        })
        .collect()
}

/// Builds a store holding `count` generated transactions.
pub fn seeded_store<R: Rng>(
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> ResultEngine<TransactionStore> {
    TransactionStore::from_transactions(generate(count, now, rng))
}
