//! Aggregation API endpoints

use api_types::stats::{Dashboard, DashboardKpis, RangeQuery, TimeSeriesQuery};
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use engine::{
    DateRange, Interval,
    export::{GatewayRow, TimeSeriesRow},
};

use crate::{
    ServerError,
    export::{self, Format},
    server::ServerState,
    views::{dashboard_view, gateway_view, kpi_view, point_view},
};

fn range(start_date: Option<String>, end_date: Option<String>) -> DateRange {
    DateRange {
        start_date: export::non_empty(start_date),
        end_date: export::non_empty(end_date),
    }
}

fn interval(value: Option<String>) -> Result<Interval, ServerError> {
    match export::non_empty(value) {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(Interval::default()),
    }
}

/// Revenue time series. `startDate` and `endDate` are required.
pub async fn time_series(
    State(state): State<ServerState>,
    Query(params): Query<TimeSeriesQuery>,
) -> Result<Response, ServerError> {
    let format = Format::parse(params.format.as_deref())?;
    let interval = interval(params.interval)?;
    let range = range(params.start_date, params.end_date);
    tracing::debug!(
        "time series: start={:?} end={:?} interval={interval}",
        range.start_date,
        range.end_date
    );

    let series = state.engine.revenue_time_series(&range, interval)?;
    match format {
        Format::Json => {
            let points: Vec<_> = series.into_iter().map(point_view).collect();
            Ok(Json(points).into_response())
        }
        Format::Csv => export::csv("revenue", series.iter().map(TimeSeriesRow::from)),
    }
}

/// Per-gateway totals, trailing window by default.
pub async fn gateways(
    State(state): State<ServerState>,
    Query(params): Query<RangeQuery>,
) -> Result<Response, ServerError> {
    let format = Format::parse(params.format.as_deref())?;
    let range = range(params.start_date, params.end_date);
    tracing::debug!(
        "gateway comparison: start={:?} end={:?}",
        range.start_date,
        range.end_date
    );

    let totals = state.engine.gateway_comparison(&range)?;
    match format {
        Format::Json => {
            let views: Vec<_> = totals.into_iter().map(gateway_view).collect();
            Ok(Json(views).into_response())
        }
        Format::Csv => export::csv("gateways", totals.iter().map(GatewayRow::from)),
    }
}

/// KPI summary, trailing window by default.
pub async fn kpis(
    State(state): State<ServerState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<DashboardKpis>, ServerError> {
    let range = range(params.start_date, params.end_date);
    tracing::debug!("kpis: start={:?} end={:?}", range.start_date, range.end_date);

    let summary = state.engine.dashboard_kpis(&range)?;
    Ok(Json(kpi_view(summary)))
}

/// Time series, gateway comparison and KPIs of one window in one response.
pub async fn dashboard(
    State(state): State<ServerState>,
    Query(params): Query<TimeSeriesQuery>,
) -> Result<Json<Dashboard>, ServerError> {
    let interval = interval(params.interval)?;
    let range = range(params.start_date, params.end_date);
    tracing::debug!(
        "dashboard: start={:?} end={:?} interval={interval}",
        range.start_date,
        range.end_date
    );

    let dashboard = state.engine.dashboard(&range, interval)?;
    Ok(Json(dashboard_view(dashboard)))
}
