//! Journal entry routes: posting, listing, and reversal.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::Caller;
use crate::routes::{bad_request, error_response, forbidden};
use crate::AppState;
use ledgra_core::dimension::TagSet;
use ledgra_core::ledger::{
    EntrySource, EntryStatus, JournalEntryInput, JournalLineInput, PostingError,
};
use ledgra_db::repositories::journal::{EntryFilter, JournalRepository, PostedEntry};
use ledgra_shared::types::{Currency, PageRequest, PageResponse};

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal-entries", get(list_entries))
        .route("/journal-entries", post(post_entry))
        .route("/journal-entries/{entry_id}", get(get_entry))
        .route("/journal-entries/{entry_id}/reverse", post(reverse_entry))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing entries.
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by source.
    pub source: Option<String>,
    /// Filter by posting date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by posting date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for posting a journal entry.
#[derive(Debug, Deserialize, Validate)]
pub struct PostEntryRequest {
    /// Posting date (YYYY-MM-DD).
    pub posting_date: NaiveDate,
    /// Description.
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    /// Business event source.
    pub source: String,
    /// Entry currency (ISO 4217).
    pub currency: String,
    /// Optional reference (e.g. invoice number).
    pub reference: Option<String>,
    /// Optional idempotency key; retries with the same key return the
    /// originally committed entry.
    pub idempotency_key: Option<String>,
    /// Journal lines.
    #[validate(length(min = 1))]
    pub lines: Vec<PostLineRequest>,
}

/// Request body for a single journal line.
#[derive(Debug, Deserialize, Serialize)]
pub struct PostLineRequest {
    /// Account ID.
    pub account_id: Uuid,
    /// Debit amount as a decimal string (omit or "0" for credit lines).
    pub debit: Option<String>,
    /// Credit amount as a decimal string (omit or "0" for debit lines).
    pub credit: Option<String>,
    /// Optional memo.
    pub memo: Option<String>,
    /// Dimension tags: dimension type ID -> dimension value ID.
    #[serde(default)]
    pub tags: BTreeMap<Uuid, Uuid>,
}

/// Response for a journal entry.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Entry number (monotonic, assigned at commit).
    pub entry_number: i64,
    /// Posting date.
    pub posting_date: String,
    /// Description.
    pub description: String,
    /// Source.
    pub source: String,
    /// Currency.
    pub currency: String,
    /// Reference.
    pub reference: Option<String>,
    /// Status.
    pub status: String,
    /// The entry this one reverses, if any.
    pub reversal_of: Option<Uuid>,
    /// The entry that reversed this one, if any.
    pub reversed_by: Option<Uuid>,
    /// Creating caller.
    pub created_by: Uuid,
    /// Created at timestamp.
    pub created_at: String,
    /// Lines in order.
    pub lines: Vec<LineResponse>,
    /// Total debits.
    pub total_debit: String,
    /// Total credits.
    pub total_credit: String,
}

/// Response for a journal line.
#[derive(Debug, Serialize)]
pub struct LineResponse {
    /// Line ID.
    pub id: Uuid,
    /// Position within the entry.
    pub line_no: i16,
    /// Account ID.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: String,
    /// Credit amount.
    pub credit: String,
    /// Memo.
    pub memo: Option<String>,
    /// Dimension tags.
    pub tags: TagSet,
}

/// Response for an entry list item (header only).
#[derive(Debug, Serialize)]
pub struct EntryListItem {
    /// Entry ID.
    pub id: Uuid,
    /// Entry number.
    pub entry_number: i64,
    /// Posting date.
    pub posting_date: String,
    /// Description.
    pub description: String,
    /// Source.
    pub source: String,
    /// Status.
    pub status: String,
}

fn entry_response(posted: PostedEntry) -> EntryResponse {
    let total_debit: Decimal = posted.lines.iter().map(|l| l.line.debit).sum();
    let total_credit: Decimal = posted.lines.iter().map(|l| l.line.credit).sum();

    EntryResponse {
        id: posted.entry.id,
        entry_number: posted.entry.entry_number,
        posting_date: posted.entry.posting_date.to_string(),
        description: posted.entry.description,
        source: ledgra_core::ledger::EntrySource::from(posted.entry.source).as_str().to_string(),
        currency: posted.entry.currency,
        reference: posted.entry.reference,
        status: ledgra_core::ledger::EntryStatus::from(posted.entry.status).as_str().to_string(),
        reversal_of: posted.entry.reversal_of,
        reversed_by: posted.entry.reversed_by,
        created_by: posted.entry.created_by,
        created_at: posted.entry.created_at.to_rfc3339(),
        lines: posted
            .lines
            .into_iter()
            .map(|l| LineResponse {
                id: l.line.id,
                line_no: l.line.line_no,
                account_id: l.line.account_id,
                debit: l.line.debit.to_string(),
                credit: l.line.credit.to_string(),
                memo: l.line.memo,
                tags: l.tags,
            })
            .collect(),
        total_debit: total_debit.to_string(),
        total_credit: total_credit.to_string(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/journal-entries` - Validate and commit a journal entry.
async fn post_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<PostEntryRequest>,
) -> Response {
    if !caller.can_post() {
        return forbidden("Caller may not post journal entries");
    }
    if let Err(e) = request.validate() {
        return bad_request(e.to_string());
    }
    let Ok(source) = EntrySource::from_str(&request.source) else {
        return bad_request(format!("Unknown entry source: {}", request.source));
    };
    let Ok(currency) = Currency::from_str(&request.currency) else {
        return bad_request(format!("Unknown currency: {}", request.currency));
    };

    let mut lines = Vec::with_capacity(request.lines.len());
    for (index, line) in request.lines.into_iter().enumerate() {
        let Some(debit) = parse_amount(line.debit.as_deref()) else {
            return bad_request(format!("Line {index}: debit is not a valid decimal"));
        };
        let Some(credit) = parse_amount(line.credit.as_deref()) else {
            return bad_request(format!("Line {index}: credit is not a valid decimal"));
        };
        lines.push(JournalLineInput {
            account_id: line.account_id,
            debit,
            credit,
            currency,
            memo: line.memo,
            tags: line.tags,
        });
    }

    let input = JournalEntryInput {
        posting_date: request.posting_date,
        description: request.description,
        source,
        currency,
        reference: request.reference,
        idempotency_key: request.idempotency_key,
        lines,
        created_by: caller.caller_id,
    };

    let repo = JournalRepository::new((*state.db).clone());
    match repo.post_entry(input).await {
        Ok(posted) => {
            info!(
                entry_number = posted.entry.entry_number,
                caller = %caller.caller_id,
                "journal entry posted"
            );
            (StatusCode::CREATED, Json(entry_response(posted))).into_response()
        }
        Err(e) => posting_error(&e),
    }
}

/// GET `/journal-entries` - List entry headers with filters.
async fn list_entries(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<ListEntriesQuery>,
) -> Response {
    let status = match query.status.as_deref() {
        None => None,
        Some("draft") => Some(EntryStatus::Draft),
        Some("posted") => Some(EntryStatus::Posted),
        Some("reversed") => Some(EntryStatus::Reversed),
        Some(other) => return bad_request(format!("Unknown status: {other}")),
    };
    let source = match query.source.as_deref() {
        None => None,
        Some(s) => match EntrySource::from_str(s) {
            Ok(source) => Some(source),
            Err(e) => return bad_request(e),
        },
    };

    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(50).min(100),
    };
    let filter = EntryFilter {
        status,
        source,
        date_from: query.from,
        date_to: query.to,
    };

    let repo = JournalRepository::new((*state.db).clone());
    match repo
        .list_entries(filter, u64::from(page.page), page.limit())
        .await
    {
        Ok((models, total)) => {
            let items: Vec<EntryListItem> = models
                .into_iter()
                .map(|m| EntryListItem {
                    id: m.id,
                    entry_number: m.entry_number,
                    posting_date: m.posting_date.to_string(),
                    description: m.description,
                    source: ledgra_core::ledger::EntrySource::from(m.source).as_str().to_string(),
                    status: ledgra_core::ledger::EntryStatus::from(m.status).as_str().to_string(),
                })
                .collect();
            let body = PageResponse::new(items, page.page, page.per_page, total);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => posting_error(&e),
    }
}

/// GET `/journal-entries/{entry_id}` - Get one entry with lines.
async fn get_entry(
    State(state): State<AppState>,
    _caller: Caller,
    Path(entry_id): Path<Uuid>,
) -> Response {
    let repo = JournalRepository::new((*state.db).clone());
    match repo.get_entry(entry_id).await {
        Ok(posted) => (StatusCode::OK, Json(entry_response(posted))).into_response(),
        Err(e) => posting_error(&e),
    }
}

/// POST `/journal-entries/{entry_id}/reverse` - Reverse a posted entry.
async fn reverse_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(entry_id): Path<Uuid>,
) -> Response {
    if !caller.can_reverse() {
        return forbidden("Caller may not reverse journal entries");
    }

    let repo = JournalRepository::new((*state.db).clone());
    match repo.reverse_entry(entry_id, caller.caller_id).await {
        Ok(reversal) => {
            info!(
                entry_number = reversal.entry.entry_number,
                reversal_of = ?reversal.entry.reversal_of,
                caller = %caller.caller_id,
                "journal entry reversed"
            );
            (StatusCode::CREATED, Json(entry_response(reversal))).into_response()
        }
        Err(e) => posting_error(&e),
    }
}

fn parse_amount(raw: Option<&str>) -> Option<Decimal> {
    match raw {
        None => Some(Decimal::ZERO),
        Some(s) => Decimal::from_str(s).ok(),
    }
}

/// Maps posting errors onto the JSON error envelope.
fn posting_error(e: &PostingError) -> Response {
    if let PostingError::StorageUnavailable(message) = e {
        error!(error = %message, "journal repository failure");
        return error_response(503, e.error_code(), "Storage unavailable".to_string());
    }
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, Some(Decimal::ZERO))]
    #[case(Some("0"), Some(Decimal::ZERO))]
    #[case(Some("1000.00"), Some(Decimal::new(100_000, 2)))]
    #[case(Some("-1"), Some(Decimal::new(-1, 0)))]
    #[case(Some("abc"), None)]
    #[case(Some(""), None)]
    fn test_parse_amount(#[case] raw: Option<&str>, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_amount(raw), expected);
    }
}
