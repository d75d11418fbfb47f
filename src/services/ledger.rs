//! Balance aggregation over the customer ledger.
//!
//! The invariant throughout: for a customer,
//! `balance = sum(job prices) - sum(payment amounts)`.
//! Positive means money owed to the shop, negative means overpayment.
//! Both are valid, displayed states; nothing here treats a negative
//! balance as an error.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use tracing::warn;

use crate::db::{self, DbPool};
use crate::models::{JobStatus, Money};
use crate::Result;

/// Job and payment totals for one account, with the derived balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct AccountTotals {
    pub total_jobs: Money,
    pub total_payments: Money,
    pub balance: Money,
}

/// Account totals attributed to a named customer.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub customer_id: String,
    pub customer_name: String,
    #[serde(flatten)]
    pub totals: AccountTotals,
}

/// Aggregate figures for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_customers: i64,
    pub pending_jobs: i64,
    pub payments_this_month: Money,
    /// Sum of positive balances only; overpaid accounts don't offset it.
    pub outstanding_total: Money,
    /// Up to five customers with the largest outstanding balance.
    pub top_outstanding: Vec<AccountSummary>,
}

/// Compute account totals from job and payment amounts.
///
/// Empty inputs are fine: an empty job list contributes 0, an empty
/// payment list contributes 0, and a customer with neither balances at 0.
pub fn balance(job_totals: &[Money], payment_totals: &[Money]) -> AccountTotals {
    let total_jobs: Money = job_totals.iter().copied().sum();
    let total_payments: Money = payment_totals.iter().copied().sum();

    AccountTotals {
        total_jobs,
        total_payments,
        balance: total_jobs - total_payments,
    }
}

/// Balance aggregation and dashboard read-model service.
#[derive(Clone)]
pub struct LedgerService {
    db: DbPool,
}

impl LedgerService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Account totals for one customer. The customer must exist; a
    /// customer with no jobs or payments summarizes to zero.
    pub async fn account_summary(&self, customer_id: &str) -> Result<AccountSummary> {
        let customer = db::get_customer(&self.db, customer_id).await?;

        let jobs = db::list_jobs_by_customer(&self.db, customer_id).await?;
        let payments = db::list_payments_by_customer(&self.db, customer_id).await?;

        let job_totals = jobs
            .iter()
            .map(|j| j.price_money())
            .collect::<Result<Vec<_>>>()?;
        let payment_totals = payments
            .iter()
            .map(|p| p.amount_money())
            .collect::<Result<Vec<_>>>()?;

        Ok(AccountSummary {
            customer_id: customer.id,
            customer_name: customer.name,
            totals: balance(&job_totals, &payment_totals),
        })
    }

    /// Account totals for every customer, including customers with no
    /// activity yet.
    pub async fn account_summaries(&self) -> Result<Vec<AccountSummary>> {
        let customers = db::list_customers(&self.db).await?;
        let jobs = db::list_jobs(&self.db).await?;
        let payments = db::list_payments(&self.db, None).await?;

        let mut job_totals: HashMap<String, Vec<Money>> = HashMap::new();
        for job in &jobs {
            job_totals
                .entry(job.customer_id.clone())
                .or_default()
                .push(job.price_money()?);
        }

        let mut payment_totals: HashMap<String, Vec<Money>> = HashMap::new();
        for payment in &payments {
            payment_totals
                .entry(payment.customer_id.clone())
                .or_default()
                .push(Money::from_storage(&payment.amount)?);
        }

        let summaries = customers
            .into_iter()
            .map(|customer| {
                let j = job_totals.remove(&customer.id).unwrap_or_default();
                let p = payment_totals.remove(&customer.id).unwrap_or_default();
                AccountSummary {
                    customer_id: customer.id,
                    customer_name: customer.name,
                    totals: balance(&j, &p),
                }
            })
            .collect();

        Ok(summaries)
    }

    /// Dashboard statistics for the month containing `today`.
    ///
    /// Each figure is non-critical: a failed sub-query degrades to a
    /// zero/default value and logs a warning rather than failing the
    /// whole dashboard.
    pub async fn dashboard_stats(&self, today: NaiveDate) -> DashboardStats {
        let total_customers = db::count_customers(&self.db).await.unwrap_or_else(|e| {
            warn!("Dashboard customer count failed: {}", e);
            0
        });

        let pending_jobs = db::count_jobs_by_status(&self.db, JobStatus::Pending)
            .await
            .unwrap_or_else(|e| {
                warn!("Dashboard pending job count failed: {}", e);
                0
            });

        let payments_this_month = match self.month_payments(today).await {
            Ok(total) => total,
            Err(e) => {
                warn!("Dashboard monthly payment total failed: {}", e);
                Money::ZERO
            }
        };

        let summaries = match self.account_summaries().await {
            Ok(s) => s,
            Err(e) => {
                warn!("Dashboard account summaries failed: {}", e);
                Vec::new()
            }
        };

        let outstanding_total: Money = summaries
            .iter()
            .map(|s| s.totals.balance)
            .filter(|b| *b > Money::ZERO)
            .sum();

        let mut top_outstanding: Vec<AccountSummary> = summaries
            .into_iter()
            .filter(|s| s.totals.balance > Money::ZERO)
            .collect();
        top_outstanding.sort_by(|a, b| b.totals.balance.cmp(&a.totals.balance));
        top_outstanding.truncate(5);

        DashboardStats {
            total_customers,
            pending_jobs,
            payments_this_month,
            outstanding_total,
            top_outstanding,
        }
    }

    /// Sum of payments dated within the calendar month of `today`.
    async fn month_payments(&self, today: NaiveDate) -> Result<Money> {
        let (start, end) = month_bounds(today);
        let payments = db::list_payments_in_range(
            &self.db,
            &start.format("%Y-%m-%d").to_string(),
            &end.format("%Y-%m-%d").to_string(),
        )
        .await?;

        let mut total = Money::ZERO;
        for payment in &payments {
            total += payment.amount_money()?;
        }
        Ok(total)
    }
}

/// First and last day of the month containing `date`.
fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).expect("day 1 always valid");
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
    .expect("first of month always valid");
    let end = next_month
        .checked_sub_days(Days::new(1))
        .expect("previous day always valid");
    (start, end)
}
