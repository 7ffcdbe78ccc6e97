//! Database seeder for Ledgra development and testing.
//!
//! Seeds a small standard chart of accounts, the four standard dimension
//! types with sample values, and one demo bank account.
//!
//! Usage: cargo run --bin seeder

use ledgra_core::account::AccountKind;
use ledgra_core::dimension::TagSet;
use ledgra_db::repositories::account::{AccountRepository, CreateAccountInput};
use ledgra_db::repositories::dimension::{
    CreateDimensionTypeInput, CreateDimensionValueInput, DimensionRepository,
};
use ledgra_db::repositories::reconciliation::{CreateBankAccountInput, ReconciliationRepository};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = ledgra_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding dimension types...");
    let dimensions = DimensionRepository::new(db.clone());
    let mut cost_center_id = None;
    for (code, name, sort_order) in [
        ("CC", "Cost Center", 1),
        ("PRJ", "Project", 2),
        ("DEPT", "Department", 3),
        ("LOC", "Location", 4),
    ] {
        match dimensions
            .create_dimension_type(CreateDimensionTypeInput {
                code: code.to_string(),
                name: name.to_string(),
                sort_order,
            })
            .await
        {
            Ok(model) => {
                println!("  {code} -> {}", model.id);
                if code == "CC" {
                    cost_center_id = Some(model.id);
                }
            }
            Err(e) => println!("  {code} skipped: {e}"),
        }
    }

    println!("Seeding dimension values...");
    let mut cc01_id = None;
    if let Some(cost_center) = cost_center_id {
        for (code, name) in [("CC-01", "Head Office"), ("CC-02", "Warehouse")] {
            match dimensions
                .create_dimension_value(CreateDimensionValueInput {
                    dimension_type_id: cost_center,
                    code: code.to_string(),
                    name: name.to_string(),
                })
                .await
            {
                Ok(model) => {
                    println!("  {code} -> {}", model.id);
                    if code == "CC-01" {
                        cc01_id = Some(model.id);
                    }
                }
                Err(e) => println!("  {code} skipped: {e}"),
            }
        }
    }

    println!("Seeding chart of accounts...");
    let accounts = AccountRepository::new(db.clone());
    let mut bank_gl_id = None;
    for (code, name, kind) in [
        ("1000", "Cash", AccountKind::Asset),
        ("1010", "Bank - Operating", AccountKind::Asset),
        ("1200", "Accounts Receivable", AccountKind::Asset),
        ("2000", "Accounts Payable", AccountKind::Liability),
        ("2100", "VAT Payable", AccountKind::Liability),
        ("3000", "Owner's Equity", AccountKind::Equity),
        ("4000", "Sales Revenue", AccountKind::Revenue),
        ("5000", "Cost of Goods Sold", AccountKind::Expense),
        ("5100", "Operating Expenses", AccountKind::Expense),
    ] {
        match accounts
            .create_account(CreateAccountInput {
                code: code.to_string(),
                name: name.to_string(),
                kind,
                required_dimensions: vec![],
            })
            .await
        {
            Ok(record) => {
                println!("  {code} {name} -> {}", record.id);
                if code == "1010" {
                    bank_gl_id = Some(record.id);
                }
            }
            Err(e) => println!("  {code} skipped: {e}"),
        }
    }

    println!("Seeding demo bank account...");
    if let Some(gl_account_id) = bank_gl_id {
        let reconciliation = ReconciliationRepository::new(db.clone());
        let mut default_tags = TagSet::new();
        if let (Some(cost_center), Some(cc01)) = (cost_center_id, cc01_id) {
            default_tags.insert(cost_center, cc01);
        }
        match reconciliation
            .create_bank_account(CreateBankAccountInput {
                code: "BANK-OPS".to_string(),
                name: "Operating Account".to_string(),
                gl_account_id,
                currency: "USD".to_string(),
                default_tags,
            })
            .await
        {
            Ok(model) => println!("  BANK-OPS -> {}", model.id),
            Err(e) => println!("  BANK-OPS skipped: {e}"),
        }
    }

    println!("Seeding complete.");
}
