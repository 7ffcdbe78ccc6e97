//! Chart-of-accounts routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::Caller;
use crate::routes::{bad_request, error_response, forbidden};
use crate::AppState;
use ledgra_core::account::{AccountKind, AccountRecord};
use ledgra_db::repositories::account::{AccountError, AccountRepository, CreateAccountInput};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/deactivate", post(deactivate_account))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Unique account code.
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    /// Account name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Account kind: asset, liability, equity, revenue, or expense.
    pub kind: String,
    /// Dimension types required on every line posted to this account.
    #[serde(default)]
    pub required_dimensions: Vec<Uuid>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account kind.
    pub kind: String,
    /// Normal balance side.
    pub normal_balance: String,
    /// Required dimension types.
    pub required_dimensions: Vec<Uuid>,
    /// Whether the account accepts new postings.
    pub is_active: bool,
}

impl From<AccountRecord> for AccountResponse {
    fn from(record: AccountRecord) -> Self {
        let normal_balance = match record.normal_balance() {
            ledgra_core::account::NormalBalance::Debit => "debit",
            ledgra_core::account::NormalBalance::Credit => "credit",
        };
        Self {
            id: record.id,
            code: record.code,
            name: record.name,
            kind: record.kind.to_string(),
            normal_balance: normal_balance.to_string(),
            required_dimensions: record.required_dimensions,
            is_active: record.is_active,
        }
    }
}

/// GET `/accounts` - List accounts ordered by code.
async fn list_accounts(State(state): State<AppState>, _caller: Caller) -> Response {
    let repo = AccountRepository::new((*state.db).clone());
    match repo.list_accounts().await {
        Ok(records) => {
            let accounts: Vec<AccountResponse> =
                records.into_iter().map(AccountResponse::from).collect();
            (StatusCode::OK, Json(serde_json::json!({ "accounts": accounts }))).into_response()
        }
        Err(e) => account_error(&e),
    }
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<CreateAccountRequest>,
) -> Response {
    if !caller.can_manage_directory() {
        return forbidden("Caller may not manage the chart of accounts");
    }
    if let Err(e) = request.validate() {
        return bad_request(e.to_string());
    }
    let Ok(kind) = AccountKind::from_str(&request.kind) else {
        return bad_request(format!("Unknown account kind: {}", request.kind));
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo
        .create_account(CreateAccountInput {
            code: request.code,
            name: request.name,
            kind,
            required_dimensions: request.required_dimensions,
        })
        .await
    {
        Ok(record) => {
            (StatusCode::CREATED, Json(AccountResponse::from(record))).into_response()
        }
        Err(e) => account_error(&e),
    }
}

/// GET `/accounts/{account_id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    _caller: Caller,
    Path(account_id): Path<Uuid>,
) -> Response {
    let repo = AccountRepository::new((*state.db).clone());
    match repo.get_account(account_id).await {
        Ok(record) => (StatusCode::OK, Json(AccountResponse::from(record))).into_response(),
        Err(e) => account_error(&e),
    }
}

/// POST `/accounts/{account_id}/deactivate` - Deactivate an account.
async fn deactivate_account(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(account_id): Path<Uuid>,
) -> Response {
    if !caller.can_manage_directory() {
        return forbidden("Caller may not manage the chart of accounts");
    }
    let repo = AccountRepository::new((*state.db).clone());
    match repo.deactivate_account(account_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => account_error(&e),
    }
}

fn account_error(e: &AccountError) -> Response {
    match e {
        AccountError::DuplicateCode(code) => {
            error_response(409, "DUPLICATE_CODE", format!("Account code '{code}' already exists"))
        }
        AccountError::NotFound(id) => {
            error_response(404, "ACCOUNT_NOT_FOUND", format!("Account not found: {id}"))
        }
        AccountError::Database(err) => {
            error!(error = %err, "account repository failure");
            error_response(500, "DATABASE_ERROR", "An error occurred".to_string())
        }
    }
}
