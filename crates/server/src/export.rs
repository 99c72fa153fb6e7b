//! CSV responses and query-string helpers shared by the endpoints.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::ServerError;

/// Output encoding requested with `format=`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Csv,
}

impl Format {
    pub fn parse(value: Option<&str>) -> Result<Self, ServerError> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            Some(other) => Err(ServerError::Generic(format!(
                "invalid format: \"{other}\" (expected json or csv)"
            ))),
        }
    }
}

/// `text/csv` attachment named `<name>.csv`.
pub fn csv<T, I>(name: &str, rows: I) -> Result<Response, ServerError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut body = Vec::new();
    engine::export::write_csv(&mut body, rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}.csv\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Empty query-string values count as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
