//! Customer routes.
//!
//! Routes:
//! - GET /customers - List all customers
//! - POST /customers - Create customer
//! - GET /customers/:id - Get customer details
//! - PUT /customers/:id - Update customer
//! - DELETE /customers/:id - Delete customer (jobs/payments cascade)
//! - GET /customers/:id/summary - Account totals and balance

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::{self, CreateCustomer, Customer, UpdateCustomer};
use crate::services::AccountSummary;
use crate::{AppState, Error, Result};

use super::double_option;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(delete))
        .route("/:id/summary", get(summary))
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_info: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Customer>>> {
    let customers = db::list_customers(&state.db).await?;
    Ok(Json(customers))
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("name is required".to_string()));
    }

    let customer = db::create_customer(
        &state.db,
        CreateCustomer {
            id: nanoid::nanoid!(),
            name: name.to_string(),
            contact_info: req.contact_info,
            notes: req.notes,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>> {
    let customer = db::get_customer(&state.db, &id).await?;
    Ok(Json(customer))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>> {
    if let Some(ref name) = req.name {
        if name.trim().is_empty() {
            return Err(Error::Validation("name must not be empty".to_string()));
        }
    }

    let customer = db::update_customer(
        &state.db,
        &id,
        UpdateCustomer {
            name: req.name.map(|n| n.trim().to_string()),
            contact_info: req.contact_info,
            notes: req.notes,
        },
    )
    .await?;

    Ok(Json(customer))
}

async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    db::delete_customer(&state.db, &id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountSummary>> {
    let summary = state.ledger.account_summary(&id).await?;
    Ok(Json(summary))
}
