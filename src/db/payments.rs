//! Payment database queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{Money, PaymentMethod};
use crate::{Error, Result};

use super::DbPool;

/// Payment record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub customer_id: String,
    pub job_id: Option<String>,
    pub amount: String,
    pub payment_method: String,
    pub payment_date: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl Payment {
    pub fn amount_money(&self) -> Result<Money> {
        Money::from_storage(&self.amount)
    }
}

/// Payment row joined with the owning customer's and settled job's names,
/// for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentWithRefs {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub job_id: Option<String>,
    pub job_name: Option<String>,
    pub amount: String,
    pub payment_method: String,
    pub payment_date: String,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Input for creating a payment.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub id: String,
    pub customer_id: String,
    pub job_id: Option<String>,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_date: String,
    pub notes: Option<String>,
}

/// Input for replacing a payment's fields (full update, as the HTTP
/// contract requires every mandatory field on PUT).
#[derive(Debug, Clone)]
pub struct UpdatePayment {
    pub customer_id: String,
    pub job_id: Option<String>,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_date: String,
    pub notes: Option<String>,
}

fn map_payment_fk(e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            Error::Validation("customer_id or job_id references a missing record".to_string())
        }
        _ => Error::Database(e),
    }
}

/// Create a new payment.
pub async fn create_payment(pool: &DbPool, input: CreatePayment) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (id, customer_id, job_id, amount, payment_method, payment_date, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.id)
    .bind(&input.customer_id)
    .bind(&input.job_id)
    .bind(input.amount.to_storage())
    .bind(input.payment_method.as_str())
    .bind(&input.payment_date)
    .bind(&input.notes)
    .fetch_one(pool)
    .await
    .map_err(map_payment_fk)
}

/// Get a payment by ID.
pub async fn get_payment(pool: &DbPool, id: &str) -> Result<Payment> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Payment not found: {}", id)))
}

/// Replace a payment's fields.
pub async fn update_payment(pool: &DbPool, id: &str, input: UpdatePayment) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET customer_id = ?, job_id = ?, amount = ?, payment_method = ?, payment_date = ?, notes = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&input.customer_id)
    .bind(&input.job_id)
    .bind(input.amount.to_storage())
    .bind(input.payment_method.as_str())
    .bind(&input.payment_date)
    .bind(&input.notes)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(map_payment_fk)?
    .ok_or_else(|| Error::NotFound(format!("Payment not found: {}", id)))
}

/// Delete a payment.
pub async fn delete_payment(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM payments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Payment not found: {}", id)));
    }

    Ok(())
}

/// List payments with customer/job names, optionally filtered to one
/// customer, most recent payment date first.
pub async fn list_payments(
    pool: &DbPool,
    customer_id: Option<&str>,
) -> Result<Vec<PaymentWithRefs>> {
    const BASE: &str = r#"
        SELECT p.id, p.customer_id, c.name AS customer_name,
               p.job_id, j.job_name,
               p.amount, p.payment_method, p.payment_date, p.notes, p.created_at
        FROM payments p
        JOIN customers c ON c.id = p.customer_id
        LEFT JOIN jobs j ON j.id = p.job_id
    "#;

    match customer_id {
        Some(cid) => sqlx::query_as::<_, PaymentWithRefs>(&format!(
            "{} WHERE p.customer_id = ? ORDER BY p.payment_date DESC, p.id",
            BASE
        ))
        .bind(cid)
        .fetch_all(pool)
        .await
        .map_err(Error::Database),
        None => sqlx::query_as::<_, PaymentWithRefs>(&format!(
            "{} ORDER BY p.payment_date DESC, p.id",
            BASE
        ))
        .fetch_all(pool)
        .await
        .map_err(Error::Database),
    }
}

/// List bare payment rows for one customer, most recent first.
pub async fn list_payments_by_customer(pool: &DbPool, customer_id: &str) -> Result<Vec<Payment>> {
    sqlx::query_as::<_, Payment>(
        r#"
        SELECT * FROM payments
        WHERE customer_id = ?
        ORDER BY payment_date DESC, id
        "#,
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

/// List payments whose payment_date falls within [start, end] inclusive.
/// ISO dates compare correctly as text.
pub async fn list_payments_in_range(pool: &DbPool, start: &str, end: &str) -> Result<Vec<Payment>> {
    sqlx::query_as::<_, Payment>(
        r#"
        SELECT * FROM payments
        WHERE payment_date >= ? AND payment_date <= ?
        ORDER BY payment_date DESC, id
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}
