//! Transaction primitives.
//!
//! A `Transaction` is one immutable payment event observed on a gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{
    Currency, EngineError, Money, ResultEngine,
    filter::{Edge, parse_bound},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 4] = [
        Self::Completed,
        Self::Pending,
        Self::Failed,
        Self::Refunded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

fn deserialize_occurred_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Transaction::parse_occurred_at(&raw).map_err(serde::de::Error::custom)
}

/// A payment event.
///
/// Deserialisation also accepts the field names used by the dashboard feed
/// (`transactionId`, `invoiceDate`, `paymentGatewaySource`) and the date forms
/// of [`Transaction::parse_occurred_at`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "transactionId")]
    pub id: String,
    #[serde(alias = "invoiceDate", deserialize_with = "deserialize_occurred_at")]
    pub occurred_at: DateTime<Utc>,
    #[serde(alias = "paymentGatewaySource")]
    pub gateway: String,
    pub amount: Money,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Transaction {
    /// Builds a validated transaction with no optional fields set.
    pub fn new(
        id: impl Into<String>,
        occurred_at: DateTime<Utc>,
        gateway: impl Into<String>,
        amount: Money,
        currency: Currency,
    ) -> ResultEngine<Self> {
        let tx = Self {
            id: id.into(),
            occurred_at,
            gateway: gateway.into(),
            amount,
            currency,
            vendor: None,
            status: None,
            metadata: None,
        };
        tx.validate()?;
        Ok(tx)
    }

    /// Parses an event time: RFC 3339, a naive timestamp read as UTC, or a
    /// bare `YYYY-MM-DD` meaning midnight UTC.
    pub fn parse_occurred_at(value: &str) -> ResultEngine<DateTime<Utc>> {
        parse_bound(value, Edge::Start).map_err(|_| {
            EngineError::InvalidArgument(format!(
                "invalid occurredAt: \"{value}\" is not an ISO-8601 date"
            ))
        })
    }

    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Checks the record invariants: non-empty id and gateway, `amount >= 0`.
    ///
    /// Deserialised records bypass [`Transaction::new`], so the store calls
    /// this on every append.
    pub fn validate(&self) -> ResultEngine<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidArgument(
                "transaction id must not be empty".to_string(),
            ));
        }
        if self.gateway.trim().is_empty() {
            return Err(EngineError::InvalidArgument(format!(
                "transaction {}: gateway must not be empty",
                self.id
            )));
        }
        if self.amount.is_negative() {
            return Err(EngineError::InvalidArgument(format!(
                "transaction {}: amount must be >= 0",
                self.id
            )));
        }
        Ok(())
    }
}
