//! Aggregations over a filtered set of transactions.
//!
//! Every function here is pure: the same input yields the same output. Sums
//! are exact because amounts are integer micro-units ([`Money`]); reported
//! totals are rounded to two decimals only once the sum is complete. Any
//! accumulator overflow is reported as [`EngineError::Internal`].

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    str::FromStr,
};

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, Money, ResultEngine, Transaction};

/// Name reported as top gateway when there is no transaction.
pub const NO_GATEWAY: &str = "N/A";

/// Width of a time-series bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Day,
    Week,
    Month,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Bucket key of `at`.
    ///
    /// - `day`: `YYYY-MM-DD`
    /// - `week`: `YYYY-MM-DD` of the Monday on or before the date (a Sunday
    ///   belongs to the week that started six days earlier)
    /// - `month`: `YYYY-MM`
    ///
    /// Keys are zero-padded, so lexicographic order is chronological order.
    pub fn bucket_key(self, at: DateTime<Utc>) -> String {
        let date = at.date_naive();
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let offset = i64::from(date.weekday().num_days_from_monday());
                (date - Duration::days(offset)).format("%Y-%m-%d").to_string()
            }
            Self::Month => date.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid interval: \"{other}\" (expected day, week or month)"
            ))),
        }
    }
}

/// Revenue of one non-empty bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub bucket_key: String,
    pub total: Money,
}

/// Totals of one gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTotal {
    pub gateway: String,
    pub amount: Money,
    pub count: u64,
    /// Currency of the last transaction seen for this gateway.
    pub currency: Currency,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TopGateway {
    pub name: String,
    pub amount: Money,
}

impl Default for TopGateway {
    fn default() -> Self {
        Self {
            name: NO_GATEWAY.to_string(),
            amount: Money::ZERO,
        }
    }
}

/// Headline figures of a query window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_revenue: Money,
    pub average_transaction_value: Money,
    pub total_transactions: u64,
    pub top_gateway: TopGateway,
    /// Currency of the first transaction, [`Currency::DEFAULT_CODE`] if none.
    pub currency: Currency,
}

fn add(acc: Money, amount: Money, what: &str) -> ResultEngine<Money> {
    acc.checked_add(amount)
        .ok_or_else(|| EngineError::Internal(format!("{what} overflow")))
}

/// Sums revenue per bucket, sorted ascending by bucket key.
///
/// Buckets without transactions are not emitted.
pub fn aggregate_time_series<'a, I>(
    transactions: I,
    interval: Interval,
) -> ResultEngine<Vec<TimeSeriesPoint>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut buckets: BTreeMap<String, Money> = BTreeMap::new();
    for tx in transactions {
        let total = buckets.entry(interval.bucket_key(tx.occurred_at)).or_default();
        *total = add(*total, tx.amount, "bucket total")?;
    }

    Ok(buckets
        .into_iter()
        .map(|(bucket_key, total)| TimeSeriesPoint {
            bucket_key,
            total: total.round_to_minor(),
        })
        .collect())
}

/// Running per-gateway totals in first-seen order.
#[derive(Default)]
struct GatewayTotals {
    totals: Vec<GatewayTotal>,
    index: HashMap<String, usize>,
}

impl GatewayTotals {
    fn add(&mut self, tx: &Transaction) -> ResultEngine<()> {
        let slot = match self.index.get(&tx.gateway) {
            Some(&slot) => slot,
            None => {
                self.index.insert(tx.gateway.clone(), self.totals.len());
                self.totals.push(GatewayTotal {
                    gateway: tx.gateway.clone(),
                    amount: Money::ZERO,
                    count: 0,
                    currency: tx.currency.clone(),
                });
                self.totals.len() - 1
            }
        };

        let entry = &mut self.totals[slot];
        entry.amount = add(entry.amount, tx.amount, "gateway total")?;
        entry.count += 1;
        entry.currency = tx.currency.clone();
        Ok(())
    }

    /// Totals with amounts rounded to two decimals.
    fn finish(self) -> Vec<GatewayTotal> {
        self.totals
            .into_iter()
            .map(|mut total| {
                total.amount = total.amount.round_to_minor();
                total
            })
            .collect()
    }
}

/// First gateway holding the maximum amount.
fn top_gateway(totals: &[GatewayTotal]) -> TopGateway {
    let mut top: Option<&GatewayTotal> = None;
    for total in totals {
        if top.is_none_or(|best| total.amount > best.amount) {
            top = Some(total);
        }
    }
    top.map(|t| TopGateway {
        name: t.gateway.clone(),
        amount: t.amount,
    })
    .unwrap_or_default()
}

/// Sums amount and count per distinct gateway.
///
/// Gateways are grouped by exact name and listed in order of first
/// appearance; callers should not depend on that order.
pub fn aggregate_by_gateway<'a, I>(transactions: I) -> ResultEngine<Vec<GatewayTotal>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals = GatewayTotals::default();
    for tx in transactions {
        totals.add(tx)?;
    }
    Ok(totals.finish())
}

/// Computes the KPI summary of `transactions`.
///
/// Revenue and the average are rounded half away from zero to two decimals;
/// the average is taken over the exact sum and is zero for an empty input.
pub fn compute_kpis<'a, I>(transactions: I) -> ResultEngine<DashboardSummary>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut gateways = GatewayTotals::default();
    let mut total_revenue = Money::ZERO;
    let mut total_transactions = 0u64;
    let mut currency = None;

    for tx in transactions {
        gateways.add(tx)?;
        total_revenue = add(total_revenue, tx.amount, "revenue")?;
        total_transactions += 1;
        if currency.is_none() {
            currency = Some(tx.currency.clone());
        }
    }

    Ok(DashboardSummary {
        total_revenue: total_revenue.round_to_minor(),
        average_transaction_value: total_revenue.div_round(total_transactions),
        total_transactions,
        top_gateway: top_gateway(&gateways.finish()),
        currency: currency.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn tx(id: &str, gateway: &str, minor: i64, y: i32, m: u32, d: u32) -> Transaction {
        Transaction::new(
            id,
            Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap(),
            gateway,
            Money::new(minor),
            Currency::try_from("INR").unwrap(),
        )
        .unwrap()
    }

    fn example() -> Vec<Transaction> {
        vec![
            tx("1", "A", 10_000, 2024, 1, 1),
            tx("2", "B", 5_000, 2024, 1, 1),
            tx("3", "A", 2_500, 2024, 1, 2),
        ]
    }

    #[test]
    fn daily_series_of_the_reference_example() {
        let series = aggregate_time_series(&example(), Interval::Day).unwrap();
        assert_eq!(
            series,
            vec![
                TimeSeriesPoint {
                    bucket_key: "2024-01-01".to_string(),
                    total: Money::new(15_000)
                },
                TimeSeriesPoint {
                    bucket_key: "2024-01-02".to_string(),
                    total: Money::new(2_500)
                },
            ]
        );
    }

    #[test]
    fn gateway_totals_of_the_reference_example() {
        let totals = aggregate_by_gateway(&example()).unwrap();
        assert_eq!(totals.len(), 2);
        let a = totals.iter().find(|t| t.gateway == "A").unwrap();
        assert_eq!((a.amount, a.count), (Money::new(12_500), 2));
        let b = totals.iter().find(|t| t.gateway == "B").unwrap();
        assert_eq!((b.amount, b.count), (Money::new(5_000), 1));
    }

    #[test]
    fn kpis_of_the_reference_example() {
        let kpis = compute_kpis(&example()).unwrap();
        assert_eq!(kpis.total_revenue, Money::new(17_500));
        assert_eq!(kpis.average_transaction_value, Money::new(5_833));
        assert_eq!(kpis.total_transactions, 3);
        assert_eq!(
            kpis.top_gateway,
            TopGateway {
                name: "A".to_string(),
                amount: Money::new(12_500)
            }
        );
        assert_eq!(kpis.currency.code(), "INR");
    }

    #[test]
    fn empty_input_yields_empty_aggregates() {
        let none: Vec<Transaction> = Vec::new();
        assert!(aggregate_time_series(&none, Interval::Week).unwrap().is_empty());
        assert!(aggregate_by_gateway(&none).unwrap().is_empty());
        let kpis = compute_kpis(&none).unwrap();
        assert_eq!(kpis.total_revenue, Money::ZERO);
        assert_eq!(kpis.average_transaction_value, Money::ZERO);
        assert_eq!(kpis.total_transactions, 0);
        assert_eq!(kpis.top_gateway, TopGateway::default());
        assert_eq!(kpis.top_gateway.name, "N/A");
        assert_eq!(kpis.currency.code(), "USD");
    }

    #[test]
    fn sunday_belongs_to_the_previous_monday() {
        // 2024-01-07 is a Sunday, 2024-01-08 a Monday.
        let sunday = Utc.with_ymd_and_hms(2024, 1, 7, 23, 59, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        assert_eq!(Interval::Week.bucket_key(sunday), "2024-01-01");
        assert_eq!(Interval::Week.bucket_key(monday), "2024-01-08");
    }

    #[test]
    fn weekly_buckets_cross_month_and_year_boundaries() {
        let txs = vec![
            tx("1", "A", 100, 2024, 12, 31),
            tx("2", "A", 200, 2025, 1, 5),
            tx("3", "A", 400, 2025, 1, 6),
        ];
        let series = aggregate_time_series(&txs, Interval::Week).unwrap();
        let keys: Vec<_> = series.iter().map(|p| p.bucket_key.as_str()).collect();
        assert_eq!(keys, ["2024-12-30", "2025-01-06"]);
        assert_eq!(series[0].total, Money::new(300));
    }

    #[test]
    fn monthly_buckets_are_sorted_and_sparse() {
        let txs = vec![
            tx("1", "A", 100, 2024, 11, 3),
            tx("2", "A", 200, 2024, 2, 29),
            tx("3", "A", 400, 2024, 11, 30),
        ];
        let series = aggregate_time_series(&txs, Interval::Month).unwrap();
        let keys: Vec<_> = series.iter().map(|p| p.bucket_key.as_str()).collect();
        assert_eq!(keys, ["2024-02", "2024-11"]);
        assert_eq!(series[1].total, Money::new(500));
    }

    #[test]
    fn gateway_currency_is_the_last_seen() {
        let mut usd = tx("2", "A", 100, 2024, 1, 1);
        usd.currency = Currency::try_from("USD").unwrap();
        let txs = vec![tx("1", "A", 100, 2024, 1, 1), usd, tx("3", "B", 100, 2024, 1, 1)];
        let totals = aggregate_by_gateway(&txs).unwrap();
        assert_eq!(totals[0].gateway, "A");
        assert_eq!(totals[0].currency.code(), "USD");
        assert_eq!(totals[1].currency.code(), "INR");
    }

    #[test]
    fn gateways_group_by_exact_name() {
        let txs = vec![tx("1", "UPI", 100, 2024, 1, 1), tx("2", "upi", 100, 2024, 1, 1)];
        assert_eq!(aggregate_by_gateway(&txs).unwrap().len(), 2);
    }

    #[test]
    fn top_gateway_ties_go_to_the_first_encountered() {
        let txs = vec![
            tx("1", "B", 300, 2024, 1, 1),
            tx("2", "A", 300, 2024, 1, 1),
            tx("3", "C", 100, 2024, 1, 1),
        ];
        let kpis = compute_kpis(&txs).unwrap();
        assert_eq!(kpis.top_gateway.name, "B");
    }

    #[test]
    fn overflow_is_an_internal_error() {
        let txs = vec![
            tx("1", "A", i64::MAX, 2024, 1, 1),
            tx("2", "A", 1, 2024, 1, 1),
        ];
        assert!(matches!(
            compute_kpis(&txs),
            Err(EngineError::Internal(_))
        ));
        assert!(matches!(
            aggregate_time_series(&txs, Interval::Day),
            Err(EngineError::Internal(_))
        ));
    }

    fn tx_micros(id: &str, gateway: &str, micros: i64, d: u32) -> Transaction {
        let mut tx = tx(id, gateway, 0, 2024, 3, d);
        tx.amount = Money::from_micros(micros);
        tx
    }

    fn exact_sum(txs: &[Transaction]) -> i64 {
        txs.iter().map(|t| t.amount.micros()).sum()
    }

    #[test]
    fn sub_cent_amounts_are_summed_before_rounding() {
        // 0.005 + 0.005 on one day
        let txs = vec![tx_micros("1", "A", 5_000, 4), tx_micros("2", "A", 5_000, 4)];

        let series = aggregate_time_series(&txs, Interval::Day).unwrap();
        assert_eq!(series[0].total, Money::new(1));
        let gateways = aggregate_by_gateway(&txs).unwrap();
        assert_eq!(gateways[0].amount, Money::new(1));
        let kpis = compute_kpis(&txs).unwrap();
        assert_eq!(kpis.total_revenue, Money::new(1));
        assert_eq!(kpis.average_transaction_value, Money::new(1));
        assert_eq!(kpis.top_gateway.amount, Money::new(1));
    }

    #[test]
    fn each_reported_total_is_rounded_on_its_own() {
        let txs = vec![
            tx_micros("1", "A", 10_005_000, 4),
            tx_micros("2", "B", 5_000_000, 4),
            tx_micros("3", "A", 1_333_000, 5),
            tx_micros("4", "C", 2_222_000, 5),
        ];
        let series = aggregate_time_series(&txs, Interval::Day).unwrap();
        let series_sum: i64 = series.iter().map(|p| p.total.micros()).sum();
        let kpis = compute_kpis(&txs).unwrap();
        // 15.005 -> 15.01 and 3.555 -> 3.56, while the exact total is 18.56
        assert_eq!(series_sum, Money::new(1_857).micros());
        assert!((series_sum - exact_sum(&txs)).abs() <= 2 * 5_000);
        assert_eq!(kpis.total_revenue, Money::new(1_856));
        assert_eq!(
            kpis.total_revenue,
            Money::from_micros(exact_sum(&txs)).round_to_minor()
        );
        assert_eq!(kpis.average_transaction_value, Money::new(464));
    }

    #[test]
    fn interval_parses_case_insensitively() {
        assert_eq!("Week".parse::<Interval>().unwrap(), Interval::Week);
        assert_eq!(Interval::default(), Interval::Day);
        assert!("quarter".parse::<Interval>().is_err());
    }

    #[test]
    fn aggregations_are_idempotent() {
        let txs = example();
        assert_eq!(
            aggregate_time_series(&txs, Interval::Day).unwrap(),
            aggregate_time_series(&txs, Interval::Day).unwrap()
        );
        assert_eq!(compute_kpis(&txs).unwrap(), compute_kpis(&txs).unwrap());
    }
}
