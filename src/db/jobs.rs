//! Job database queries.
//!
//! A job is a billable unit of work for one customer. Prices are stored
//! as canonical decimal text and converted with [`Money`] at the edges.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{JobStatus, Money};
use crate::{Error, Result};

use super::DbPool;

/// Job record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub customer_id: String,
    pub job_name: String,
    pub price: String,
    pub status: String,
    pub created_date: String,
    pub completed_date: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl Job {
    pub fn price_money(&self) -> Result<Money> {
        Money::from_storage(&self.price)
    }

    pub fn status_enum(&self) -> JobStatus {
        self.status.parse().unwrap_or_default()
    }
}

/// Input for creating a new job.
#[derive(Debug, Clone)]
pub struct CreateJob {
    pub id: String,
    pub customer_id: String,
    pub job_name: String,
    pub price: Money,
    pub status: JobStatus,
    pub created_date: String,
    pub notes: Option<String>,
}

/// Input for updating a job. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateJob {
    pub job_name: Option<String>,
    pub price: Option<Money>,
    pub status: Option<JobStatus>,
    pub created_date: Option<String>,
    pub completed_date: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// Create a new job.
pub async fn create_job(pool: &DbPool, input: CreateJob) -> Result<Job> {
    sqlx::query_as::<_, Job>(
        r#"
        INSERT INTO jobs (id, customer_id, job_name, price, status, created_date, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.id)
    .bind(&input.customer_id)
    .bind(&input.job_name)
    .bind(input.price.to_storage())
    .bind(input.status.as_str())
    .bind(&input.created_date)
    .bind(&input.notes)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            Error::Validation(format!("Unknown customer: {}", input.customer_id))
        }
        _ => Error::Database(e),
    })
}

/// Get a job by ID.
pub async fn get_job(pool: &DbPool, id: &str) -> Result<Job> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Job not found: {}", id)))
}

/// Update a job.
pub async fn update_job(pool: &DbPool, id: &str, input: UpdateJob) -> Result<Job> {
    let mut updates = Vec::new();
    let mut bindings: Vec<Option<String>> = Vec::new();

    if let Some(job_name) = input.job_name {
        updates.push("job_name = ?");
        bindings.push(Some(job_name));
    }
    if let Some(price) = input.price {
        updates.push("price = ?");
        bindings.push(Some(price.to_storage()));
    }
    if let Some(status) = input.status {
        updates.push("status = ?");
        bindings.push(Some(status.as_str().to_string()));
    }
    if let Some(created_date) = input.created_date {
        updates.push("created_date = ?");
        bindings.push(Some(created_date));
    }
    if let Some(completed_date) = input.completed_date {
        updates.push("completed_date = ?");
        bindings.push(completed_date);
    }
    if let Some(notes) = input.notes {
        updates.push("notes = ?");
        bindings.push(notes);
    }

    if updates.is_empty() {
        return get_job(pool, id).await;
    }

    let query = format!(
        "UPDATE jobs SET {} WHERE id = ? RETURNING *",
        updates.join(", ")
    );

    let mut q = sqlx::query_as::<_, Job>(&query);
    for binding in &bindings {
        q = q.bind(binding);
    }
    q = q.bind(id);

    q.fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Job not found: {}", id)))
}

/// Mark a job completed, stamping the completion date.
pub async fn complete_job(pool: &DbPool, id: &str, completed_date: &str) -> Result<Job> {
    sqlx::query_as::<_, Job>(
        r#"
        UPDATE jobs
        SET status = 'completed', completed_date = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(completed_date)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Job not found: {}", id)))
}

/// Delete a job. Payments referencing it are detached, not deleted.
pub async fn delete_job(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Job not found: {}", id)));
    }

    Ok(())
}

/// List all jobs, newest first.
pub async fn list_jobs(pool: &DbPool) -> Result<Vec<Job>> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY created_date DESC, id")
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

/// List jobs for one customer, newest first.
pub async fn list_jobs_by_customer(pool: &DbPool, customer_id: &str) -> Result<Vec<Job>> {
    sqlx::query_as::<_, Job>(
        r#"
        SELECT * FROM jobs
        WHERE customer_id = ?
        ORDER BY created_date DESC, id
        "#,
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

/// Count jobs in a given status.
pub async fn count_jobs_by_status(pool: &DbPool, status: JobStatus) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE status = ?")
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;
    Ok(count)
}
