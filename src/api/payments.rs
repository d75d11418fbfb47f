//! Payment routes - the full HTTP resource contract.
//!
//! Routes:
//! - GET /payments - List payments (newest payment date first)
//! - GET /payments?customer_id=X - Filter to one customer
//! - GET /payments?include_summary=true - Attach totals to the listing
//! - POST /payments - Record a payment
//! - GET /payments/:id - Get payment details
//! - PUT /payments/:id - Replace a payment
//! - DELETE /payments/:id - Delete a payment
//!
//! Create and update validate an explicit payload: customer_id, amount,
//! payment_method, and payment_date are required; job_id and notes are
//! optional. Amounts may be JSON numbers or strings but anything
//! non-numeric is rejected outright rather than coerced to zero.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::{self, CreatePayment, Payment, PaymentWithRefs, UpdatePayment};
use crate::models::{parse_iso_date, Money, PaymentMethod};
use crate::{AppState, Error, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(delete))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPaymentsQuery {
    pub customer_id: Option<String>,
    #[serde(default)]
    pub include_summary: bool,
}

/// Listing response: rows plus an optional summary block.
#[derive(Debug, Serialize)]
pub struct ListPaymentsResponse {
    pub data: Vec<PaymentWithRefs>,
    pub summary: Option<Value>,
}

/// Raw payment payload as received. Every field is optional here so the
/// handler can produce one descriptive validation error instead of a
/// generic deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentPayload {
    pub customer_id: Option<String>,
    pub job_id: Option<String>,
    pub amount: Option<Value>,
    pub payment_method: Option<String>,
    pub payment_date: Option<String>,
    pub notes: Option<String>,
}

/// A payload that passed validation.
struct ValidPayment {
    customer_id: String,
    job_id: Option<String>,
    amount: Money,
    payment_method: PaymentMethod,
    payment_date: String,
    notes: Option<String>,
}

impl PaymentPayload {
    fn validate(self) -> Result<ValidPayment> {
        let mut missing = Vec::new();
        if self.customer_id.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("customer_id");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        if self.payment_method.as_deref().map_or(true, |s| s.is_empty()) {
            missing.push("payment_method");
        }
        if self.payment_date.as_deref().map_or(true, |s| s.is_empty()) {
            missing.push("payment_date");
        }
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let amount = Money::non_negative_from_json("amount", &self.amount.unwrap_or(Value::Null))?;
        let payment_method: PaymentMethod = self.payment_method.unwrap_or_default().parse()?;
        let payment_date = self.payment_date.unwrap_or_default();
        parse_iso_date("payment_date", &payment_date)?;

        // The literal "none" is how the entry form says "no job".
        let job_id = self
            .job_id
            .filter(|id| !id.is_empty() && id != "none");

        Ok(ValidPayment {
            customer_id: self.customer_id.unwrap_or_default(),
            job_id,
            amount,
            payment_method,
            payment_date,
            notes: self.notes,
        })
    }
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<ListPaymentsResponse>> {
    let data = db::list_payments(&state.db, query.customer_id.as_deref()).await?;

    let summary = if query.include_summary {
        match query.customer_id.as_deref() {
            // Full account summary for one customer
            Some(customer_id) => {
                let account = state.ledger.account_summary(customer_id).await?;
                Some(serde_json::to_value(&account.totals)?)
            }
            // Across all customers only the payment total is meaningful
            None => {
                let mut total_payments = Money::ZERO;
                for row in &data {
                    total_payments += Money::from_storage(&row.amount)?;
                }
                Some(json!({ "total_payments": total_payments }))
            }
        }
    } else {
        None
    };

    Ok(Json(ListPaymentsResponse { data, summary }))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<PaymentPayload>,
) -> Result<(StatusCode, Json<Payment>)> {
    let valid = payload.validate()?;

    let payment = db::create_payment(
        &state.db,
        CreatePayment {
            id: nanoid::nanoid!(),
            customer_id: valid.customer_id,
            job_id: valid.job_id,
            amount: valid.amount,
            payment_method: valid.payment_method,
            payment_date: valid.payment_date,
            notes: valid.notes,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Payment>> {
    let payment = db::get_payment(&state.db, &id).await?;
    Ok(Json(payment))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentPayload>,
) -> Result<Json<Payment>> {
    let valid = payload.validate()?;

    let payment = db::update_payment(
        &state.db,
        &id,
        UpdatePayment {
            customer_id: valid.customer_id,
            job_id: valid.job_id,
            amount: valid.amount,
            payment_method: valid.payment_method,
            payment_date: valid.payment_date,
            notes: valid.notes,
        },
    )
    .await?;

    Ok(Json(payment))
}

async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    db::delete_payment(&state.db, &id).await?;
    Ok(Json(json!({ "success": true })))
}
