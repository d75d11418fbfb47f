//! Job routes.
//!
//! Routes:
//! - GET /jobs - List all jobs
//! - GET /jobs?customer_id=X - List a customer's jobs
//! - POST /jobs - Create job
//! - GET /jobs/:id - Get job details
//! - PUT /jobs/:id - Update job
//! - DELETE /jobs/:id - Delete job (payments detach)
//! - POST /jobs/:id/complete - Mark completed

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::{self, CreateJob, Job, UpdateJob};
use crate::models::{parse_iso_date, JobStatus, Money};
use crate::{AppState, Error, Result};

use super::double_option;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(delete))
        .route("/:id/complete", post(complete))
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub customer_id: Option<String>,
}

/// Job creation payload. `price` may arrive as a JSON number or string;
/// either way it must parse to a non-negative decimal.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub customer_id: Option<String>,
    pub job_name: Option<String>,
    pub price: Option<Value>,
    pub status: Option<String>,
    pub created_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub job_name: Option<String>,
    pub price: Option<Value>,
    pub status: Option<String>,
    pub created_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub completed_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteJobRequest {
    pub completed_date: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<Job>>> {
    let jobs = match query.customer_id.as_deref() {
        Some(customer_id) => db::list_jobs_by_customer(&state.db, customer_id).await?,
        None => db::list_jobs(&state.db).await?,
    };
    Ok(Json(jobs))
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>)> {
    let customer_id = req
        .customer_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::Validation("customer_id is required".to_string()))?;
    let job_name = req
        .job_name
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation("job_name is required".to_string()))?;
    let price_value = req
        .price
        .ok_or_else(|| Error::Validation("price is required".to_string()))?;
    let price = Money::non_negative_from_json("price", &price_value)?;

    let status = match req.status.as_deref() {
        Some(s) => s.parse::<JobStatus>()?,
        None => JobStatus::Pending,
    };

    let created_date = match req.created_date {
        Some(d) => parse_iso_date("created_date", &d)?
            .format("%Y-%m-%d")
            .to_string(),
        None => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
    };

    let job = db::create_job(
        &state.db,
        CreateJob {
            id: nanoid::nanoid!(),
            customer_id,
            job_name,
            price,
            status,
            created_date,
            notes: req.notes,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Job>> {
    let job = db::get_job(&state.db, &id).await?;
    Ok(Json(job))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<Job>> {
    let price = match req.price {
        Some(value) => Some(Money::non_negative_from_json("price", &value)?),
        None => None,
    };

    let status = match req.status.as_deref() {
        Some(s) => Some(s.parse::<JobStatus>()?),
        None => None,
    };

    let created_date = match req.created_date {
        Some(d) => Some(
            parse_iso_date("created_date", &d)?
                .format("%Y-%m-%d")
                .to_string(),
        ),
        None => None,
    };

    let completed_date = match req.completed_date {
        Some(Some(d)) => Some(Some(
            parse_iso_date("completed_date", &d)?
                .format("%Y-%m-%d")
                .to_string(),
        )),
        Some(None) => Some(None),
        None => None,
    };

    let job = db::update_job(
        &state.db,
        &id,
        UpdateJob {
            job_name: req.job_name,
            price,
            status,
            created_date,
            completed_date,
            notes: req.notes,
        },
    )
    .await?;

    Ok(Json(job))
}

async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    db::delete_job(&state.db, &id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CompleteJobRequest>,
) -> Result<Json<Job>> {
    let completed_date = match req.completed_date {
        Some(d) => parse_iso_date("completed_date", &d)?
            .format("%Y-%m-%d")
            .to_string(),
        None => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
    };

    let job = db::complete_job(&state.db, &id, &completed_date).await?;
    Ok(Json(job))
}
