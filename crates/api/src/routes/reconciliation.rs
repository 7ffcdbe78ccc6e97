//! Bank account and reconciliation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::Caller;
use crate::routes::{bad_request, error_response, forbidden};
use crate::AppState;
use ledgra_db::repositories::reconciliation::{
    CreateBankAccountInput, ImportTransactionInput, ReconciliationError,
    ReconciliationRepository, ReconciliationWithItems,
};

/// Creates the reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-accounts", post(create_bank_account))
        .route(
            "/bank-accounts/{bank_account_id}/transactions/import",
            post(import_transactions),
        )
        .route("/bank-accounts/{bank_account_id}/reconcile", post(reconcile))
        .route("/reconciliations/{reconciliation_id}", get(get_reconciliation))
        .route(
            "/reconciliations/items/{item_id}/confirm",
            post(confirm_item),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a bank account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBankAccountRequest {
    /// Unique bank account code.
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// The GL account this bank account's money moves through.
    pub gl_account_id: Uuid,
    /// Account currency (ISO 4217).
    pub currency: String,
    /// Expected dimension tags on lines for this bank account.
    #[serde(default)]
    pub default_tags: BTreeMap<Uuid, Uuid>,
}

/// One statement line to import.
#[derive(Debug, Deserialize, Serialize)]
pub struct ImportTransactionRequest {
    /// Statement date (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Signed amount as a decimal string: positive in, negative out.
    pub amount: String,
    /// Statement description.
    pub description: String,
    /// Statement reference, if any.
    pub reference: Option<String>,
}

/// Request body for a statement import.
#[derive(Debug, Deserialize, Validate)]
pub struct ImportRequest {
    /// The statement lines.
    #[validate(length(min = 1))]
    pub transactions: Vec<ImportTransactionRequest>,
}

/// Request body for a reconciliation run.
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    /// Statement period start (YYYY-MM-DD).
    pub statement_start: NaiveDate,
    /// Statement period end (YYYY-MM-DD).
    pub statement_end: NaiveDate,
}

/// Response for a reconciliation item.
#[derive(Debug, Serialize)]
pub struct ReconciliationItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// The bank transaction.
    pub bank_transaction_id: Uuid,
    /// The paired ledger line, if any.
    pub journal_line_id: Option<Uuid>,
    /// Match kind ("exact"/"fuzzy"), if paired.
    pub match_kind: Option<String>,
    /// Confidence score, if paired.
    pub confidence: Option<String>,
    /// Whether the pairing is confirmed.
    pub matched: bool,
    /// Whether the line's tags differ from the expected mapping.
    pub dimension_mismatch: bool,
    /// Tied candidate line IDs for human review, if ambiguous.
    pub ambiguous_candidates: Option<serde_json::Value>,
}

/// Response for a reconciliation.
#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    /// Reconciliation ID.
    pub id: Uuid,
    /// Bank account.
    pub bank_account_id: Uuid,
    /// Statement period start.
    pub statement_start: String,
    /// Statement period end.
    pub statement_end: String,
    /// Opening balance.
    pub opening_balance: String,
    /// Closing balance.
    pub closing_balance: String,
    /// Items: matched first, then exceptions.
    pub items: Vec<ReconciliationItemResponse>,
}

fn reconciliation_response(result: ReconciliationWithItems) -> ReconciliationResponse {
    ReconciliationResponse {
        id: result.reconciliation.id,
        bank_account_id: result.reconciliation.bank_account_id,
        statement_start: result.reconciliation.statement_start.to_string(),
        statement_end: result.reconciliation.statement_end.to_string(),
        opening_balance: result.reconciliation.opening_balance.to_string(),
        closing_balance: result.reconciliation.closing_balance.to_string(),
        items: result
            .items
            .into_iter()
            .map(|item| ReconciliationItemResponse {
                id: item.id,
                bank_transaction_id: item.bank_transaction_id,
                journal_line_id: item.journal_line_id,
                match_kind: item.match_kind.map(|k| {
                    ledgra_core::reconciliation::MatchKind::from(k).as_str().to_string()
                }),
                confidence: item.confidence.map(|c| c.to_string()),
                matched: item.matched,
                dimension_mismatch: item.dimension_mismatch,
                ambiguous_candidates: item.ambiguous_candidates,
            })
            .collect(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/bank-accounts` - Create a bank account.
async fn create_bank_account(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<CreateBankAccountRequest>,
) -> Response {
    if !caller.can_manage_directory() {
        return forbidden("Caller may not manage bank accounts");
    }
    if let Err(e) = request.validate() {
        return bad_request(e.to_string());
    }

    let repo = ReconciliationRepository::new((*state.db).clone());
    match repo
        .create_bank_account(CreateBankAccountInput {
            code: request.code,
            name: request.name,
            gl_account_id: request.gl_account_id,
            currency: request.currency,
            default_tags: request.default_tags,
        })
        .await
    {
        Ok(model) => (
            StatusCode::CREATED,
            Json(json!({
                "id": model.id,
                "code": model.code,
                "name": model.name,
                "gl_account_id": model.gl_account_id,
                "currency": model.currency,
            })),
        )
            .into_response(),
        Err(e) => reconciliation_error(&e),
    }
}

/// POST `/bank-accounts/{id}/transactions/import` - Import statement lines.
async fn import_transactions(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(bank_account_id): Path<Uuid>,
    Json(request): Json<ImportRequest>,
) -> Response {
    if !caller.can_reconcile() {
        return forbidden("Caller may not import bank statements");
    }
    if let Err(e) = request.validate() {
        return bad_request(e.to_string());
    }

    let mut inputs = Vec::with_capacity(request.transactions.len());
    for (index, txn) in request.transactions.into_iter().enumerate() {
        let Ok(amount) = txn.amount.parse::<rust_decimal::Decimal>() else {
            return bad_request(format!("Transaction {index}: amount is not a valid decimal"));
        };
        inputs.push(ImportTransactionInput {
            date: txn.date,
            amount,
            description: txn.description,
            reference: txn.reference,
        });
    }

    let repo = ReconciliationRepository::new((*state.db).clone());
    match repo.import_transactions(bank_account_id, inputs).await {
        Ok(models) => {
            info!(
                bank_account = %bank_account_id,
                count = models.len(),
                "bank statement imported"
            );
            (
                StatusCode::CREATED,
                Json(json!({ "imported": models.len() })),
            )
                .into_response()
        }
        Err(e) => reconciliation_error(&e),
    }
}

/// POST `/bank-accounts/{id}/reconcile` - Run the matcher over a period.
async fn reconcile(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(bank_account_id): Path<Uuid>,
    Json(request): Json<ReconcileRequest>,
) -> Response {
    if !caller.can_reconcile() {
        return forbidden("Caller may not run reconciliation");
    }

    let repo = ReconciliationRepository::new((*state.db).clone());
    match repo
        .reconcile(
            bank_account_id,
            request.statement_start,
            request.statement_end,
            &state.config.reconciliation,
        )
        .await
    {
        Ok(result) => {
            info!(
                bank_account = %bank_account_id,
                matched = result.items.iter().filter(|i| i.matched).count(),
                exceptions = result.items.iter().filter(|i| !i.matched).count(),
                "reconciliation run complete"
            );
            (StatusCode::CREATED, Json(reconciliation_response(result))).into_response()
        }
        Err(e) => reconciliation_error(&e),
    }
}

/// GET `/reconciliations/{id}` - Get a reconciliation with items.
async fn get_reconciliation(
    State(state): State<AppState>,
    _caller: Caller,
    Path(reconciliation_id): Path<Uuid>,
) -> Response {
    let repo = ReconciliationRepository::new((*state.db).clone());
    match repo.get_reconciliation(reconciliation_id).await {
        Ok(result) => (StatusCode::OK, Json(reconciliation_response(result))).into_response(),
        Err(e) => reconciliation_error(&e),
    }
}

/// POST `/reconciliations/items/{id}/confirm` - Confirm a fuzzy match.
async fn confirm_item(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(item_id): Path<Uuid>,
) -> Response {
    if !caller.can_reconcile() {
        return forbidden("Caller may not confirm reconciliation matches");
    }

    let repo = ReconciliationRepository::new((*state.db).clone());
    match repo.confirm_item(item_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => reconciliation_error(&e),
    }
}

fn reconciliation_error(e: &ReconciliationError) -> Response {
    match e {
        ReconciliationError::BankAccountNotFound(id) => error_response(
            404,
            "BANK_ACCOUNT_NOT_FOUND",
            format!("Bank account not found: {id}"),
        ),
        ReconciliationError::InvalidStatementPeriod { .. } => {
            error_response(400, "INVALID_STATEMENT_PERIOD", e.to_string())
        }
        ReconciliationError::ReconciliationNotFound(id) => error_response(
            404,
            "RECONCILIATION_NOT_FOUND",
            format!("Reconciliation not found: {id}"),
        ),
        ReconciliationError::ItemNotFound(id) => error_response(
            404,
            "RECONCILIATION_ITEM_NOT_FOUND",
            format!("Reconciliation item not found: {id}"),
        ),
        ReconciliationError::NotConfirmable(_) => {
            error_response(409, "NOT_CONFIRMABLE", e.to_string())
        }
        ReconciliationError::Database(err) => {
            error!(error = %err, "reconciliation repository failure");
            error_response(500, "DATABASE_ERROR", "An error occurred".to_string())
        }
    }
}
