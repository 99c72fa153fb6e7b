//! Request and response bodies of the HTTP API.
//!
//! Field names are camelCase on the wire. Money values are JSON numbers in
//! major units (`12.5` means twelve and a half).

use serde::{Deserialize, Serialize};

pub mod transaction {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::{Map, Value};

    /// Query string of `GET /transactions`.
    ///
    /// Values are kept as strings so malformed input can be reported with a
    /// useful message instead of a generic extractor rejection.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionList {
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        pub gateway: Option<String>,
        pub limit: Option<String>,
        pub format: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: String,
        /// RFC3339 timestamp in UTC.
        pub occurred_at: DateTime<Utc>,
        pub gateway: String,
        pub amount: f64,
        pub currency: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub vendor: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub status: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub metadata: Option<Map<String, Value>>,
    }

    /// Body of `POST /transactions`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        /// Generated when absent.
        pub id: Option<String>,
        /// ISO-8601 date or timestamp. A bare date is midnight UTC and a
        /// timestamp without offset is read as UTC.
        pub occurred_at: String,
        pub gateway: String,
        /// Major units.
        pub amount: f64,
        pub currency: String,
        pub vendor: Option<String>,
        pub status: Option<String>,
        pub metadata: Option<Map<String, Value>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: String,
    }
}

pub mod stats {
    use super::*;

    /// Query string of the gateway and KPI endpoints.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RangeQuery {
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        pub format: Option<String>,
    }

    /// Query string of the time-series and dashboard endpoints.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TimeSeriesQuery {
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        /// `day` (default), `week` or `month`.
        pub interval: Option<String>,
        pub format: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TimeSeriesPoint {
        /// Bucket key: `YYYY-MM-DD` for days and weeks, `YYYY-MM` for months.
        pub date: String,
        pub value: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct GatewayComparison {
        pub gateway: String,
        pub amount: f64,
        pub count: u64,
        pub currency: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TopGateway {
        pub name: String,
        pub amount: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardKpis {
        pub total_revenue: f64,
        pub average_invoice_value: f64,
        pub total_transactions: u64,
        pub top_gateway: TopGateway,
        pub currency: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Dashboard {
        pub time_series: Vec<TimeSeriesPoint>,
        pub gateways: Vec<GatewayComparison>,
        pub kpis: DashboardKpis,
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        pub transactions: usize,
    }
}
