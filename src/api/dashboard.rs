//! Dashboard statistics route.
//!
//! A single read endpoint feeding the back-office landing page. Each
//! figure degrades independently to a zero/default on storage trouble;
//! the dashboard never fails as a whole.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::services::DashboardStats;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(stats))
}

async fn stats(State(state): State<AppState>) -> Json<DashboardStats> {
    let today = Utc::now().date_naive();
    Json(state.ledger.dashboard_stats(today).await)
}
