use std::{fmt, sync::Arc};

use arc_swap::ArcSwap;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub use aggregate::{
    DashboardSummary, GatewayTotal, Interval, NO_GATEWAY, TimeSeriesPoint, TopGateway,
    aggregate_by_gateway, aggregate_time_series, compute_kpis,
};
pub use currency::Currency;
pub use error::EngineError;
pub use filter::{Edge, TransactionFilter, day_edge, parse_bound};
pub use money::Money;
pub use store::TransactionStore;
pub use transactions::{Transaction, TransactionStatus};

pub mod aggregate;
mod currency;
mod error;
pub mod export;
pub mod filter;
mod money;
pub mod seed;
mod store;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

/// Default length of the window used when a summary query omits its dates.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Parameters of the transactions query. Dates are ISO-8601 strings.
#[derive(Clone, Debug, Default)]
pub struct TransactionQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gateway: Option<String>,
    pub limit: Option<usize>,
}

/// Query window. Dates are ISO-8601 strings, both bounds inclusive.
#[derive(Clone, Debug, Default)]
pub struct DateRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
        }
    }
}

/// Time series, gateway comparison and KPIs of one window, all computed from
/// the same filtered snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub time_series: Vec<TimeSeriesPoint>,
    pub gateways: Vec<GatewayTotal>,
    pub kpis: DashboardSummary,
}

/// Query service over a transaction store.
///
/// Queries read an immutable snapshot of the store and never block each
/// other; [`Engine::ingest`] publishes a new snapshot atomically, so a query
/// that is already running keeps seeing the data it started with.
pub struct Engine {
    store: ArcSwap<TransactionStore>,
    clock: Clock,
    window_days: u32,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("transactions", &self.store.load().len())
            .field("window_days", &self.window_days)
            .finish()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Current snapshot of the store.
    pub fn snapshot(&self) -> Arc<TransactionStore> {
        self.store.load_full()
    }

    /// Validates and appends one transaction.
    ///
    /// Fails with [`EngineError::ExistingKey`] when the id is already stored.
    pub fn ingest(&self, tx: Transaction) -> ResultEngine<()> {
        tx.validate()?;
        let mut outcome = Ok(());
        self.store.rcu(|current| {
            if current.contains(&tx.id) {
                outcome = Err(EngineError::ExistingKey(tx.id.clone()));
                return Arc::clone(current);
            }
            let mut next = TransactionStore::clone(current);
            outcome = next.append(tx.clone());
            Arc::new(next)
        });
        outcome
    }

    /// Lists the transactions matching `query`, in store order.
    pub fn transactions(&self, query: &TransactionQuery) -> ResultEngine<Vec<Transaction>> {
        let filter = TransactionFilter::parse(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            query.gateway.as_deref(),
            query.limit,
        )?;
        let store = self.store.load();
        Ok(filter
            .apply(store.as_slice())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Revenue per `interval` bucket in `range`.
    ///
    /// Both dates are required.
    pub fn revenue_time_series(
        &self,
        range: &DateRange,
        interval: Interval,
    ) -> ResultEngine<Vec<TimeSeriesPoint>> {
        let (Some(start), Some(end)) = (range.start_date.as_deref(), range.end_date.as_deref())
        else {
            return Err(EngineError::InvalidArgument(
                "startDate and endDate are required".to_string(),
            ));
        };
        let filter = TransactionFilter::parse(Some(start), Some(end), None, None)?;
        let store = self.store.load();
        aggregate_time_series(filter.apply(store.as_slice()), interval)
    }

    /// Per-gateway totals in `range`, defaulting to the trailing window.
    pub fn gateway_comparison(&self, range: &DateRange) -> ResultEngine<Vec<GatewayTotal>> {
        let filter = self.window(range)?;
        let store = self.store.load();
        aggregate_by_gateway(filter.apply(store.as_slice()))
    }

    /// KPI summary of `range`, defaulting to the trailing window.
    pub fn dashboard_kpis(&self, range: &DateRange) -> ResultEngine<DashboardSummary> {
        let filter = self.window(range)?;
        let store = self.store.load();
        compute_kpis(filter.apply(store.as_slice()))
    }

    /// All three dashboard aggregates for `range`, defaulting to the trailing
    /// window.
    pub fn dashboard(&self, range: &DateRange, interval: Interval) -> ResultEngine<Dashboard> {
        let filter = self.window(range)?;
        let store = self.store.load();
        let selected = filter.apply(store.as_slice());

        Ok(Dashboard {
            time_series: aggregate_time_series(selected.iter().copied(), interval)?,
            gateways: aggregate_by_gateway(selected.iter().copied())?,
            kpis: compute_kpis(selected.iter().copied())?,
        })
    }

    /// Resolves `range`, filling each missing bound from the trailing window
    /// `[today - window_days, today]` (whole UTC days).
    fn window(&self, range: &DateRange) -> ResultEngine<TransactionFilter> {
        let today = (self.clock)().date_naive();
        let start = match range.start_date.as_deref() {
            Some(start) => parse_bound(start, Edge::Start)?,
            None => day_edge(
                today - Duration::days(i64::from(self.window_days)),
                Edge::Start,
            ),
        };
        let end = match range.end_date.as_deref() {
            Some(end) => parse_bound(end, Edge::End)?,
            None => day_edge(today, Edge::End),
        };

        Ok(TransactionFilter {
            start: Some(start),
            end: Some(end),
            ..TransactionFilter::default()
        })
    }
}

pub struct EngineBuilder {
    store: TransactionStore,
    clock: Clock,
    window_days: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            store: TransactionStore::default(),
            clock: Arc::new(Utc::now),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl EngineBuilder {
    /// Pass the transactions to query
    pub fn store(mut self, store: TransactionStore) -> EngineBuilder {
        self.store = store;
        self
    }

    /// Override the source of "now" used for default windows
    pub fn clock<F>(mut self, clock: F) -> EngineBuilder
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Length in days of the default query window
    pub fn window_days(mut self, days: u32) -> EngineBuilder {
        self.window_days = days;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            store: ArcSwap::from_pointee(self.store),
            clock: self.clock,
            window_days: self.window_days,
        }
    }
}
