//! API Routes for Foilpress
//!
//! This module combines all API routes into a single router.
//! Routes are organized by domain.

mod customers;
mod dashboard;
mod jobs;
mod payments;
pub mod status;

use axum::Router;
use serde::{Deserialize, Deserializer};

use crate::AppState;

/// Build the complete API router.
///
/// Route structure:
/// - /health, /status - Health checks
/// - /customers/* - Customer CRUD and account summaries
/// - /jobs/* - Job CRUD and completion
/// - /payments/* - Payment CRUD with optional summary
/// - /dashboard - Aggregate statistics
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .nest("/customers", customers::routes())
        .nest("/jobs", jobs::routes())
        .nest("/payments", payments::routes())
        .nest("/dashboard", dashboard::routes())
}

/// Deserialize helper distinguishing an absent field from an explicit
/// null, so PATCH-style updates can clear optional columns.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
