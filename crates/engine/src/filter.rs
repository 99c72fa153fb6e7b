//! Transaction selection by date window, gateway and limit.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::{EngineError, ResultEngine, Transaction};

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Which side of the window a date string bounds.
///
/// A bare `YYYY-MM-DD` expands to the first instant of the day for
/// [`Edge::Start`] and to the last instant for [`Edge::End`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

impl Edge {
    fn label(self) -> &'static str {
        match self {
            Edge::Start => "startDate",
            Edge::End => "endDate",
        }
    }
}

/// Parses an ISO-8601 date or timestamp into a UTC instant.
///
/// Accepted forms: RFC 3339 (`2024-01-01T10:00:00+02:00`), a naive timestamp
/// read as UTC (`2024-01-01T10:00:00`) and a bare date (`2024-01-01`).
pub fn parse_bound(value: &str, edge: Edge) -> ResultEngine<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day_edge(date, edge));
    }

    Err(EngineError::InvalidArgument(format!(
        "invalid {}: \"{value}\" is not an ISO-8601 date",
        edge.label()
    )))
}

/// First (`Start`) or last (`End`) instant of `date` in UTC.
pub fn day_edge(date: NaiveDate, edge: Edge) -> DateTime<Utc> {
    let time = match edge {
        Edge::Start => NaiveTime::MIN,
        Edge::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN),
    };
    date.and_time(time).and_utc()
}

/// Selection criteria for transactions.
///
/// Both bounds are inclusive and independent. `gateway` matches
/// case-insensitively. `limit` keeps the first `limit` matches in store order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub gateway: Option<String>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    /// Builds a filter from raw request strings.
    pub fn parse(
        start: Option<&str>,
        end: Option<&str>,
        gateway: Option<&str>,
        limit: Option<usize>,
    ) -> ResultEngine<Self> {
        Ok(Self {
            start: start.map(|s| parse_bound(s, Edge::Start)).transpose()?,
            end: end.map(|s| parse_bound(s, Edge::End)).transpose()?,
            gateway: gateway.map(str::to_owned),
            limit,
        })
    }

    /// Returns `true` if `tx` falls in the window and matches the gateway.
    ///
    /// `limit` is not considered here; see [`TransactionFilter::apply`].
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.start.is_some_and(|start| tx.occurred_at < start) {
            return false;
        }
        if self.end.is_some_and(|end| tx.occurred_at > end) {
            return false;
        }
        match &self.gateway {
            Some(gateway) => tx.gateway.to_lowercase() == gateway.to_lowercase(),
            None => true,
        }
    }

    /// Selects the matching transactions, preserving their relative order.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let matching = transactions.iter().filter(|tx| self.matches(tx));
        match self.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{Currency, Money};

    fn tx(id: &str, gateway: &str, y: i32, m: u32, d: u32, h: u32) -> Transaction {
        Transaction::new(
            id,
            Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            gateway,
            Money::new(100),
            Currency::default(),
        )
        .unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("t1", "UPI", 2024, 1, 1, 0),
            tx("t2", "Razorpay", 2024, 1, 2, 13),
            tx("t3", "upi", 2024, 1, 3, 23),
            tx("t4", "Paytm", 2024, 1, 4, 8),
        ]
    }

    fn ids(selected: &[&Transaction]) -> Vec<String> {
        selected.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn bounds_are_inclusive() {
        let txs = sample();
        let filter = TransactionFilter::parse(
            Some("2024-01-01T00:00:00Z"),
            Some("2024-01-03T23:00:00Z"),
            None,
            None,
        )
        .unwrap();
        assert_eq!(ids(&filter.apply(&txs)), ["t1", "t2", "t3"]);
    }

    #[test]
    fn bare_end_date_covers_the_whole_day() {
        let txs = sample();
        let filter = TransactionFilter::parse(Some("2024-01-02"), Some("2024-01-03"), None, None)
            .unwrap();
        assert_eq!(ids(&filter.apply(&txs)), ["t2", "t3"]);
    }

    #[test]
    fn bounds_are_independent() {
        let txs = sample();
        let only_start = TransactionFilter::parse(Some("2024-01-03"), None, None, None).unwrap();
        assert_eq!(ids(&only_start.apply(&txs)), ["t3", "t4"]);
        let only_end = TransactionFilter::parse(None, Some("2024-01-01"), None, None).unwrap();
        assert_eq!(ids(&only_end.apply(&txs)), ["t1"]);
    }

    #[test]
    fn gateway_match_is_case_insensitive_and_exact() {
        let txs = sample();
        let filter = TransactionFilter::parse(None, None, Some("UpI"), None).unwrap();
        assert_eq!(ids(&filter.apply(&txs)), ["t1", "t3"]);
        let partial = TransactionFilter::parse(None, None, Some("Pay"), None).unwrap();
        assert!(partial.apply(&txs).is_empty());
    }

    #[test]
    fn limit_applies_after_filtering() {
        let txs = sample();
        let filter = TransactionFilter::parse(Some("2024-01-02"), None, None, Some(2)).unwrap();
        assert_eq!(ids(&filter.apply(&txs)), ["t2", "t3"]);
        let zero = TransactionFilter::parse(None, None, None, Some(0)).unwrap();
        assert!(zero.apply(&txs).is_empty());
    }

    #[test]
    fn inverted_window_matches_nothing() {
        let txs = sample();
        let filter = TransactionFilter::parse(Some("2024-01-04"), Some("2024-01-01"), None, None)
            .unwrap();
        assert!(filter.apply(&txs).is_empty());
    }

    #[test]
    fn malformed_dates_are_invalid_arguments() {
        let err = TransactionFilter::parse(Some("01/02/2024"), None, None, None).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidArgument(
                "invalid startDate: \"01/02/2024\" is not an ISO-8601 date".to_string()
            )
        );
        assert!(TransactionFilter::parse(None, Some("2024-02-30"), None, None).is_err());
        assert!(TransactionFilter::parse(None, Some(""), None, None).is_err());
    }

    #[test]
    fn parse_bound_accepts_offsets_and_naive_timestamps() {
        let with_offset = parse_bound("2024-01-01T02:00:00+02:00", Edge::Start).unwrap();
        assert_eq!(with_offset, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let naive = parse_bound("2024-01-01T02:00:00", Edge::End).unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap());
        let fractional = parse_bound("2024-01-01T02:00:00.250", Edge::End).unwrap();
        assert_eq!(fractional.timestamp_subsec_millis(), 250);
    }
}
