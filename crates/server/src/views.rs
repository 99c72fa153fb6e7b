//! Conversions from engine results to the wire types of `api_types`.
//!
//! Shared by the HTTP handlers and the command-line reports so both print the
//! same shapes.

use api_types::{
    stats::{Dashboard, DashboardKpis, GatewayComparison, TimeSeriesPoint, TopGateway},
    transaction::TransactionView,
};
use engine::Transaction;

pub fn transaction_view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        occurred_at: tx.occurred_at,
        gateway: tx.gateway,
        amount: tx.amount.to_major(),
        currency: tx.currency.code().to_string(),
        vendor: tx.vendor,
        status: tx.status.map(|s| s.as_str().to_string()),
        metadata: tx.metadata,
    }
}

pub fn point_view(point: engine::TimeSeriesPoint) -> TimeSeriesPoint {
    TimeSeriesPoint {
        date: point.bucket_key,
        value: point.total.to_major(),
    }
}

pub fn gateway_view(total: engine::GatewayTotal) -> GatewayComparison {
    GatewayComparison {
        gateway: total.gateway,
        amount: total.amount.to_major(),
        count: total.count,
        currency: total.currency.code().to_string(),
    }
}

pub fn kpi_view(summary: engine::DashboardSummary) -> DashboardKpis {
    DashboardKpis {
        total_revenue: summary.total_revenue.to_major(),
        average_invoice_value: summary.average_transaction_value.to_major(),
        total_transactions: summary.total_transactions,
        top_gateway: TopGateway {
            name: summary.top_gateway.name,
            amount: summary.top_gateway.amount.to_major(),
        },
        currency: summary.currency.code().to_string(),
    }
}

pub fn dashboard_view(dashboard: engine::Dashboard) -> Dashboard {
    Dashboard {
        time_series: dashboard.time_series.into_iter().map(point_view).collect(),
        gateways: dashboard.gateways.into_iter().map(gateway_view).collect(),
        kpis: kpi_view(dashboard.kpis),
    }
}
