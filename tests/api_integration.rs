//! API Integration Tests for the Foilpress server
//!
//! Tests the REST API endpoints using axum-test over an in-memory
//! SQLite database.

use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use foilpress::{api, db, AppState};
use serde_json::{json, Value};

/// Build a test server over a fresh in-memory database.
async fn setup_server() -> TestServer {
    let pool = db::init_pool(":memory:")
        .await
        .expect("Failed to create test database");
    db::initialize_schema(&pool)
        .await
        .expect("Failed to apply schema");

    let state = AppState::with_pool(pool);
    let app: Router = Router::new().merge(api::routes()).with_state(state);

    TestServer::new(app).expect("Failed to start test server")
}

/// Create a customer and return its id.
async fn create_customer(server: &TestServer, name: &str) -> String {
    let response = server
        .post("/customers")
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

async fn create_job(server: &TestServer, customer_id: &str, name: &str, price: &str) -> String {
    let response = server
        .post("/jobs")
        .json(&json!({
            "customer_id": customer_id,
            "job_name": name,
            "price": price,
            "created_date": "2025-03-01",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

async fn create_payment(server: &TestServer, customer_id: &str, amount: Value) -> Value {
    server
        .post("/payments")
        .json(&json!({
            "customer_id": customer_id,
            "amount": amount,
            "payment_method": "cash",
            "payment_date": "2025-03-05",
        }))
        .await
        .json::<Value>()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_status() {
    let server = setup_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");

    let response = server.get("/status").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["database"], "ok");
}

// ============================================================================
// Customers
// ============================================================================

#[tokio::test]
async fn test_customer_crud() {
    let server = setup_server().await;

    let id = create_customer(&server, "Atlas Printing").await;

    let response = server.get(&format!("/customers/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "Atlas Printing");

    let response = server
        .put(&format!("/customers/{}", id))
        .json(&json!({ "name": "Atlas Print & Foil", "contact_info": "atlas@example.com" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["name"], "Atlas Print & Foil");
    assert_eq!(body["contact_info"], "atlas@example.com");

    let response = server.get("/customers").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 1);

    let response = server.delete(&format!("/customers/{}", id)).await;
    response.assert_status_ok();

    let response = server.get(&format!("/customers/{}", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_requires_name() {
    let server = setup_server().await;

    let response = server.post("/customers").json(&json!({ "name": "  " })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_customer_summary() {
    let server = setup_server().await;
    let id = create_customer(&server, "Atlas").await;

    create_job(&server, &id, "Business cards", "100").await;
    create_payment(&server, &id, json!(40)).await;

    let response = server.get("/payments").await;
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 1);

    let response = server.get(&format!("/customers/{}/summary", id)).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total_jobs"], "100");
    assert_eq!(body["total_payments"], "40");
    assert_eq!(body["balance"], "60");
}

#[tokio::test]
async fn test_customer_summary_not_found() {
    let server = setup_server().await;
    let response = server.get("/customers/no-such-id/summary").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Jobs
// ============================================================================

#[tokio::test]
async fn test_job_crud_and_complete() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;

    let job_id = create_job(&server, &customer_id, "Foil stamped invitations", "1250.50").await;

    let response = server.get(&format!("/jobs/{}", job_id)).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["price"], "1250.5");

    let response = server
        .post(&format!("/jobs/{}/complete", job_id))
        .json(&json!({ "completed_date": "2025-03-10" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["completed_date"], "2025-03-10");

    let response = server.delete(&format!("/jobs/{}", job_id)).await;
    response.assert_status_ok();
    server
        .get(&format!("/jobs/{}", job_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_job_rejects_bad_price() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;

    let response = server
        .post("/jobs")
        .json(&json!({
            "customer_id": customer_id,
            "job_name": "Bad price",
            "price": "abc",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/jobs")
        .json(&json!({
            "customer_id": customer_id,
            "job_name": "Negative price",
            "price": "-10",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_job_rejects_unknown_customer() {
    let server = setup_server().await;

    let response = server
        .post("/jobs")
        .json(&json!({
            "customer_id": "ghost",
            "job_name": "Orphan job",
            "price": 100,
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Payments - the HTTP contract from the data model
// ============================================================================

#[tokio::test]
async fn test_payment_create_and_fetch() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;

    let response = server
        .post("/payments")
        .json(&json!({
            "customer_id": customer_id,
            "amount": "150.75",
            "payment_method": "wire_transfer",
            "payment_date": "2025-03-05",
            "notes": "deposit",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    assert_eq!(created["amount"], "150.75");
    assert_eq!(created["payment_method"], "wire_transfer");

    let id = created["id"].as_str().unwrap();
    let response = server.get(&format!("/payments/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["notes"], "deposit");
}

#[tokio::test]
async fn test_payment_amount_accepts_number_or_string() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;

    let as_number = create_payment(&server, &customer_id, json!(100)).await;
    let as_string = create_payment(&server, &customer_id, json!("100")).await;
    assert_eq!(as_number["amount"], as_string["amount"]);
}

#[tokio::test]
async fn test_payment_missing_amount_rejected_and_not_persisted() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;

    let response = server
        .post("/payments")
        .json(&json!({
            "customer_id": customer_id,
            "payment_method": "cash",
            "payment_date": "2025-03-05",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("amount"));

    // Nothing was persisted
    let response = server.get("/payments").await;
    assert!(response.json::<Value>()["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_non_numeric_amount_rejected() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;

    let response = server
        .post("/payments")
        .json(&json!({
            "customer_id": customer_id,
            "amount": "abc",
            "payment_method": "cash",
            "payment_date": "2025-03-05",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.get("/payments").await;
    assert!(response.json::<Value>()["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_unknown_method_rejected() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;

    let response = server
        .post("/payments")
        .json(&json!({
            "customer_id": customer_id,
            "amount": 50,
            "payment_method": "barter",
            "payment_date": "2025-03-05",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_job_id_none_normalizes_to_null() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;

    let response = server
        .post("/payments")
        .json(&json!({
            "customer_id": customer_id,
            "job_id": "none",
            "amount": 50,
            "payment_method": "check",
            "payment_date": "2025-03-05",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert!(response.json::<Value>()["job_id"].is_null());
}

#[tokio::test]
async fn test_payment_list_with_summary() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;
    let other_id = create_customer(&server, "Baseline Press").await;

    create_job(&server, &customer_id, "Cards", "100").await;
    create_payment(&server, &customer_id, json!(40)).await;
    create_payment(&server, &other_id, json!(25)).await;

    // Filtered with summary: the full account picture
    let response = server
        .get("/payments")
        .add_query_param("customer_id", &customer_id)
        .add_query_param("include_summary", "true")
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["summary"]["total_jobs"], "100");
    assert_eq!(body["summary"]["total_payments"], "40");
    assert_eq!(body["summary"]["balance"], "60");

    // Unfiltered with summary: payment total only
    let response = server
        .get("/payments")
        .add_query_param("include_summary", "true")
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["summary"]["total_payments"], "65");
    assert!(body["summary"]["balance"].is_null());

    // Without the flag there is no summary
    let response = server.get("/payments").await;
    assert!(response.json::<Value>()["summary"].is_null());
}

#[tokio::test]
async fn test_payment_update_and_delete() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;
    let created = create_payment(&server, &customer_id, json!(100)).await;
    let id = created["id"].as_str().unwrap();

    let response = server
        .put(&format!("/payments/{}", id))
        .json(&json!({
            "customer_id": customer_id,
            "amount": "75.50",
            "payment_method": "check",
            "payment_date": "2025-03-06",
        }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["amount"], "75.5");
    assert_eq!(body["payment_method"], "check");

    let response = server.delete(&format!("/payments/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["success"], true);

    server
        .get(&format!("/payments/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_update_requires_all_mandatory_fields() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;
    let created = create_payment(&server, &customer_id, json!(100)).await;
    let id = created["id"].as_str().unwrap();

    let response = server
        .put(&format!("/payments/{}", id))
        .json(&json!({ "amount": 50 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_not_found() {
    let server = setup_server().await;

    server
        .get("/payments/no-such-id")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/payments/no-such-id")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Cascade behavior
// ============================================================================

#[tokio::test]
async fn test_customer_delete_cascades() {
    let server = setup_server().await;
    let customer_id = create_customer(&server, "Atlas").await;
    let job_id = create_job(&server, &customer_id, "Cards", "100").await;
    create_payment(&server, &customer_id, json!(40)).await;

    let response = server.delete(&format!("/customers/{}", customer_id)).await;
    response.assert_status_ok();

    server
        .get(&format!("/jobs/{}", job_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server.get("/payments").await;
    assert!(response.json::<Value>()["data"].as_array().unwrap().is_empty());
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_dashboard_stats() {
    let server = setup_server().await;
    let a = create_customer(&server, "Owes").await;
    let b = create_customer(&server, "Paid up").await;

    create_job(&server, &a, "Big run", "1000").await;
    create_job(&server, &b, "Small run", "50").await;
    create_payment(&server, &b, json!(50)).await;

    let response = server.get("/dashboard").await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    assert_eq!(body["total_customers"], 2);
    assert_eq!(body["pending_jobs"], 2);
    assert_eq!(body["outstanding_total"], "1000");
    let top = body["top_outstanding"].as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["customer_id"], a);
    assert_eq!(top[0]["balance"], "1000");
}

#[tokio::test]
async fn test_dashboard_empty_database() {
    let server = setup_server().await;

    let response = server.get("/dashboard").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total_customers"], 0);
    assert_eq!(body["pending_jobs"], 0);
    assert_eq!(body["payments_this_month"], "0");
    assert_eq!(body["outstanding_total"], "0");
    assert!(body["top_outstanding"].as_array().unwrap().is_empty());
}
