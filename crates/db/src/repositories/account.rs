//! Account repository for chart-of-accounts database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{account_required_dimensions, accounts};
use ledgra_core::account::{AccountKind, AccountRecord};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account code already exists.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Unique account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account classification.
    pub kind: AccountKind,
    /// Dimension types required on every line posted to this account.
    pub required_dimensions: Vec<Uuid>,
}

/// Account repository for chart-of-accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with its required dimension types.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is already taken or the write fails.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<AccountRecord, AccountError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AccountError::DuplicateCode(input.code));
        }

        let now = chrono::Utc::now().into();
        let account_id = Uuid::new_v4();

        let txn = self.db.begin().await?;

        let account = accounts::ActiveModel {
            id: Set(account_id),
            code: Set(input.code),
            name: Set(input.name),
            kind: Set(input.kind.into()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = account.insert(&txn).await?;

        for dimension_type_id in &input.required_dimensions {
            let required = account_required_dimensions::ActiveModel {
                account_id: Set(account_id),
                dimension_type_id: Set(*dimension_type_id),
            };
            required.insert(&txn).await?;
        }

        txn.commit().await?;

        Ok(to_record(model, input.required_dimensions))
    }

    /// Lists all accounts ordered by code, with their required dimensions.
    ///
    /// One query for accounts, one for the requirement rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_accounts(&self) -> Result<Vec<AccountRecord>, AccountError> {
        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        let requirements = account_required_dimensions::Entity::find()
            .all(&self.db)
            .await?;
        let mut by_account: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in requirements {
            by_account
                .entry(row.account_id)
                .or_default()
                .push(row.dimension_type_id);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let required = by_account.remove(&m.id).unwrap_or_default();
                to_record(m, required)
            })
            .collect())
    }

    /// Gets one account by ID with its required dimensions.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn get_account(&self, account_id: Uuid) -> Result<AccountRecord, AccountError> {
        let model = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;

        let required = account_required_dimensions::Entity::find()
            .filter(account_required_dimensions::Column::AccountId.eq(account_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| r.dimension_type_id)
            .collect();

        Ok(to_record(model, required))
    }

    /// Deactivates an account. Existing lines are untouched; new postings
    /// to it are rejected by validation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn deactivate_account(&self, account_id: Uuid) -> Result<(), AccountError> {
        let model = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;

        let mut active: accounts::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;

        Ok(())
    }
}

fn to_record(model: accounts::Model, required_dimensions: Vec<Uuid>) -> AccountRecord {
    let kind: AccountKind = model.kind.into();
    AccountRecord {
        id: model.id,
        code: model.code,
        name: model.name,
        kind,
        required_dimensions,
        is_active: model.is_active,
    }
}
