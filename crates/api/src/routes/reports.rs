//! Report routes: trial balance, dimensional summary, and projections.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::middleware::Caller;
use crate::routes::{bad_request, error_response};
use crate::AppState;
use ledgra_db::repositories::report::{ReportError, ReportRepository};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/trial-balance", get(trial_balance))
        .route("/reports/dimensional-summary", get(dimensional_summary))
        .route("/reports/profit-loss", get(profit_loss))
        .route("/reports/balance-sheet", get(balance_sheet))
}

/// Query parameters for the trial balance.
#[derive(Debug, Deserialize)]
pub struct TrialBalanceQuery {
    /// As-of date (YYYY-MM-DD).
    pub as_of: NaiveDate,
    /// Dimension value filter (repeatable, comma-separated).
    pub dimensions: Option<String>,
    /// Report mode: "live" (default) or "materialized".
    pub mode: Option<String>,
}

/// Query parameters for the dimensional summary.
#[derive(Debug, Deserialize)]
pub struct DimensionalSummaryQuery {
    /// Period start (YYYY-MM-DD).
    pub from: NaiveDate,
    /// Period end (YYYY-MM-DD).
    pub to: NaiveDate,
    /// The dimension type to group by.
    pub dimension_type: Uuid,
    /// Include lines without a tag of this type as a trailing bucket.
    #[serde(default)]
    pub include_untagged: bool,
}

/// Query parameters for period reports.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// Period start (YYYY-MM-DD).
    pub from: NaiveDate,
    /// Period end (YYYY-MM-DD).
    pub to: NaiveDate,
}

/// Query parameters for as-of reports.
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    /// As-of date (YYYY-MM-DD).
    pub as_of: NaiveDate,
}

/// GET `/reports/trial-balance` - Trial balance at a date.
///
/// The materialized mode reads precomputed running totals and answers the
/// current state only; it rejects dimension filters.
async fn trial_balance(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<TrialBalanceQuery>,
) -> Response {
    let dimension_values = match parse_dimension_filter(query.dimensions.as_deref()) {
        Ok(values) => values,
        Err(message) => return bad_request(message),
    };

    let repo = ReportRepository::new((*state.db).clone());
    let result = match query.mode.as_deref() {
        None | Some("live") => repo.trial_balance_live(query.as_of, &dimension_values).await,
        Some("materialized") => {
            if !dimension_values.is_empty() {
                return bad_request(
                    "The materialized mode does not support dimension filters".to_string(),
                );
            }
            repo.trial_balance_materialized(query.as_of).await
        }
        Some(other) => return bad_request(format!("Unknown report mode: {other}")),
    };

    match result {
        Ok(balance) => (StatusCode::OK, Json(balance)).into_response(),
        Err(e) => report_error(&e),
    }
}

/// GET `/reports/dimensional-summary` - Totals grouped by one dimension.
async fn dimensional_summary(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<DimensionalSummaryQuery>,
) -> Response {
    let repo = ReportRepository::new((*state.db).clone());
    match repo
        .dimensional_summary(
            query.from,
            query.to,
            query.dimension_type,
            query.include_untagged,
        )
        .await
    {
        Ok(rows) => (StatusCode::OK, Json(json!({ "rows": rows }))).into_response(),
        Err(e) => report_error(&e),
    }
}

/// GET `/reports/profit-loss` - Profit & loss over a period.
async fn profit_loss(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let repo = ReportRepository::new((*state.db).clone());
    match repo.profit_loss(query.from, query.to).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => report_error(&e),
    }
}

/// GET `/reports/balance-sheet` - Balance sheet as of a date.
async fn balance_sheet(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<AsOfQuery>,
) -> Response {
    let repo = ReportRepository::new((*state.db).clone());
    match repo.balance_sheet(query.as_of).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => report_error(&e),
    }
}

fn parse_dimension_filter(raw: Option<&str>) -> Result<Vec<Uuid>, String> {
    let Some(raw) = raw else {
        return Ok(vec![]);
    };
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| Uuid::parse_str(s.trim()).map_err(|_| format!("Invalid dimension value ID: {s}")))
        .collect()
}

fn report_error(e: &ReportError) -> Response {
    match e {
        ReportError::InvalidDateRange { .. } => {
            error_response(400, "INVALID_DATE_RANGE", e.to_string())
        }
        ReportError::DimensionTypeNotFound(id) => error_response(
            404,
            "DIMENSION_TYPE_NOT_FOUND",
            format!("Dimension type not found: {id}"),
        ),
        ReportError::Database(err) => {
            error!(error = %err, "report repository failure");
            error_response(500, "DATABASE_ERROR", "An error occurred".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimension_filter() {
        assert_eq!(parse_dimension_filter(None).unwrap(), Vec::<Uuid>::new());

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!("{a},{b}");
        assert_eq!(parse_dimension_filter(Some(&raw)).unwrap(), vec![a, b]);

        assert!(parse_dimension_filter(Some("not-a-uuid")).is_err());
    }
}
