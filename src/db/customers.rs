//! Customer database queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{Error, Result};

use super::DbPool;

/// Customer record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Input for creating a new customer.
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub id: String,
    pub name: String,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating a customer. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub contact_info: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// Create a new customer.
pub async fn create_customer(pool: &DbPool, input: CreateCustomer) -> Result<Customer> {
    sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers (id, name, contact_info, notes)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.id)
    .bind(&input.name)
    .bind(&input.contact_info)
    .bind(&input.notes)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

/// Get a customer by ID.
pub async fn get_customer(pool: &DbPool, id: &str) -> Result<Customer> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Customer not found: {}", id)))
}

/// Update a customer.
pub async fn update_customer(pool: &DbPool, id: &str, input: UpdateCustomer) -> Result<Customer> {
    let mut updates = Vec::new();
    let mut bindings: Vec<Option<String>> = Vec::new();

    if let Some(name) = input.name {
        updates.push("name = ?");
        bindings.push(Some(name));
    }
    if let Some(contact_info) = input.contact_info {
        updates.push("contact_info = ?");
        bindings.push(contact_info);
    }
    if let Some(notes) = input.notes {
        updates.push("notes = ?");
        bindings.push(notes);
    }

    if updates.is_empty() {
        return get_customer(pool, id).await;
    }

    let query = format!(
        "UPDATE customers SET {} WHERE id = ? RETURNING *",
        updates.join(", ")
    );

    let mut q = sqlx::query_as::<_, Customer>(&query);
    for binding in &bindings {
        q = q.bind(binding);
    }
    q = q.bind(id);

    q.fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Customer not found: {}", id)))
}

/// Delete a customer. Jobs and payments cascade via foreign keys.
pub async fn delete_customer(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Customer not found: {}", id)));
    }

    Ok(())
}

/// List all customers, newest first.
pub async fn list_customers(pool: &DbPool) -> Result<Vec<Customer>> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY created_at DESC, id")
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

/// Count all customers.
pub async fn count_customers(pool: &DbPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
