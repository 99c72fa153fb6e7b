//! Transactions API endpoints

use api_types::transaction::{TransactionCreated, TransactionList, TransactionNew};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::{
    Currency, Money, Transaction, TransactionQuery, TransactionStatus, export::TransactionRow,
};
use uuid::Uuid;

use crate::{
    ServerError,
    export::{self, Format},
    server::ServerState,
    views::transaction_view,
};

fn parse_limit(limit: Option<String>) -> Result<Option<usize>, ServerError> {
    export::non_empty(limit)
        .map(|raw| {
            raw.trim().parse::<usize>().map_err(|_| {
                ServerError::Generic(format!(
                    "invalid limit: \"{raw}\" (expected a non-negative integer)"
                ))
            })
        })
        .transpose()
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<TransactionList>,
) -> Result<Response, ServerError> {
    let format = Format::parse(params.format.as_deref())?;
    let query = TransactionQuery {
        start_date: export::non_empty(params.start_date),
        end_date: export::non_empty(params.end_date),
        gateway: export::non_empty(params.gateway),
        limit: parse_limit(params.limit)?,
    };
    tracing::debug!(
        "listing transactions: start={:?} end={:?} gateway={:?} limit={:?}",
        query.start_date,
        query.end_date,
        query.gateway,
        query.limit
    );

    let transactions = state.engine.transactions(&query)?;
    match format {
        Format::Json => {
            let views: Vec<_> = transactions.into_iter().map(transaction_view).collect();
            Ok(Json(views).into_response())
        }
        Format::Csv => export::csv("transactions", transactions.iter().map(TransactionRow::from)),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let Json(payload) = payload?;
    let id = export::non_empty(payload.id).unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut tx = Transaction::new(
        id,
        Transaction::parse_occurred_at(&payload.occurred_at)?,
        payload.gateway,
        Money::from_major(payload.amount)?,
        Currency::try_from(payload.currency.as_str())?,
    )?;
    if let Some(vendor) = payload.vendor {
        tx = tx.with_vendor(vendor);
    }
    if let Some(status) = payload.status {
        tx = tx.with_status(TransactionStatus::try_from(status.as_str())?);
    }
    if let Some(metadata) = payload.metadata {
        tx = tx.with_metadata(metadata);
    }

    let id = tx.id.clone();
    state.engine.ingest(tx)?;
    tracing::info!("transaction {id} ingested");

    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}
