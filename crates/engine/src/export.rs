//! CSV export of query results.

use std::io::Write;

use serde::Serialize;

use crate::{GatewayTotal, ResultEngine, TimeSeriesPoint, Transaction};

/// Writes `rows` as CSV with a header row taken from the row's field names.
///
/// Row types must be flat (no nested structs or maps).
pub fn write_csv<W, T, I>(writer: W, rows: I) -> ResultEngine<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Flat CSV view of a [`Transaction`]; metadata is kept as a JSON string.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow<'a> {
    pub id: &'a str,
    pub occurred_at: String,
    pub gateway: &'a str,
    pub amount: String,
    pub currency: &'a str,
    pub vendor: &'a str,
    pub status: &'a str,
    pub metadata: String,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: &tx.id,
            occurred_at: tx.occurred_at.to_rfc3339(),
            gateway: &tx.gateway,
            amount: tx.amount.to_string(),
            currency: tx.currency.code(),
            vendor: tx.vendor.as_deref().unwrap_or_default(),
            status: tx.status.map(|s| s.as_str()).unwrap_or_default(),
            metadata: tx
                .metadata
                .as_ref()
                .map(|m| serde_json::Value::Object(m.clone()).to_string())
                .unwrap_or_default(),
        }
    }
}

/// CSV row of a revenue time series.
#[derive(Debug, Serialize)]
pub struct TimeSeriesRow<'a> {
    pub date: &'a str,
    pub value: String,
}

impl<'a> From<&'a TimeSeriesPoint> for TimeSeriesRow<'a> {
    fn from(point: &'a TimeSeriesPoint) -> Self {
        Self {
            date: &point.bucket_key,
            value: point.total.to_string(),
        }
    }
}

/// CSV row of a gateway comparison.
#[derive(Debug, Serialize)]
pub struct GatewayRow<'a> {
    pub gateway: &'a str,
    pub amount: String,
    pub count: u64,
    pub currency: &'a str,
}

impl<'a> From<&'a GatewayTotal> for GatewayRow<'a> {
    fn from(total: &'a GatewayTotal) -> Self {
        Self {
            gateway: &total.gateway,
            amount: total.amount.to_string(),
            count: total.count,
            currency: total.currency.code(),
        }
    }
}
