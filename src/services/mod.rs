//! Business services for Foilpress.

mod ledger;

pub use ledger::{balance, AccountSummary, AccountTotals, DashboardStats, LedgerService};
