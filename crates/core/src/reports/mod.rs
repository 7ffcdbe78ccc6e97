//! Thin read-side report projections.
//!
//! Profit & loss and balance sheet are projections over trial-balance rows;
//! no new aggregation happens here, and this is the only place column
//! totals are netted.

pub mod service;
pub mod types;

pub use service::ReportService;
pub use types::{BalanceSheetReport, BalanceSheetSection, ProfitLossReport, ProfitLossSection};
