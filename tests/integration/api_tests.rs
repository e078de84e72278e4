//! API integration tests
//!
//! These run against a live server with an empty-ish database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:7001/api/v1";

/// Suffix that keeps emails and titles unique between runs
fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{nanos}")
}

/// Register a fresh reader and return its id
async fn register_user(client: &Client, label: &str) -> i64 {
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "email": format!("{}-{}@library.test", label, unique_suffix()),
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse register response");
    body["user"]["id"].as_i64().expect("No user id in response")
}

/// Create a book through the admin endpoint and return it
async fn create_book(client: &Client, title: &str, total: i32, residual: i32) -> Value {
    let response = client
        .post(format!("{}/admin/books", BASE_URL))
        .json(&json!({
            "title": title,
            "author": "Integration",
            "total": total,
            "residual": residual
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse book")
}

async fn fetch_book(client: &Client, id: i64) -> Value {
    client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse book")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_email_conflicts() {
    let client = Client::new();
    let email = format!("dup-{}@library.test", unique_suffix());

    let first = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "email": email, "password": "secret" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "email": email.to_uppercase(), "password": "other" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 409);

    let listing: Value = client
        .get(format!("{}/admin/users", BASE_URL))
        .query(&[("search_email", email.as_str())])
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(listing["total_users"], 1);
}

#[tokio::test]
#[ignore]
async fn test_login_checks_password_and_role() {
    let client = Client::new();
    let email = format!("login-{}@library.test", unique_suffix());

    client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "email": email, "password": "secret" }))
        .send()
        .await
        .expect("Failed to send request");

    let ok = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(ok.status(), 200);
    let body: Value = ok.json().await.expect("Failed to parse response");
    assert_eq!(body["authed"], true);
    assert!(body["user"].get("password").is_none());

    let wrong = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "nope" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(wrong.status(), 401);

    let as_admin = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret", "role": "admin" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(as_admin.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_last_copy_goes_to_one_borrower() {
    let client = Client::new();
    let book = create_book(&client, &format!("Last copy {}", unique_suffix()), 3, 1).await;
    let book_id = book["id"].as_i64().expect("No book id");
    let first = register_user(&client, "first").await;
    let second = register_user(&client, "second").await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "user_id": first, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "user_id": second, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let book = fetch_book(&client, book_id).await;
    assert_eq!(book["residual"], 0);
    assert_eq!(book["total"], 3);
}

#[tokio::test]
#[ignore]
async fn test_borrow_then_return_restores_residual() {
    let client = Client::new();
    let book = create_book(&client, &format!("Round trip {}", unique_suffix()), 2, 2).await;
    let book_id = book["id"].as_i64().expect("No book id");
    let user_id = register_user(&client, "reader").await;

    let borrowed: Value = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let borrow_id = borrowed["record"]["borrow_id"]
        .as_str()
        .expect("No borrow id")
        .to_string();
    assert_eq!(fetch_book(&client, book_id).await["residual"], 1);

    let response = client
        .post(format!("{}/borrows/return", BASE_URL))
        .json(&json!({ "borrow_id": borrow_id, "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["record"]["returned"], true);
    assert_eq!(fetch_book(&client, book_id).await["residual"], 2);

    // A second return of the same borrow finds nothing left to close
    let again = client
        .post(format!("{}/borrows/return", BASE_URL))
        .json(&json!({ "borrow_id": borrow_id, "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(again.status(), 404);
    assert_eq!(fetch_book(&client, book_id).await["residual"], 2);
}

#[tokio::test]
#[ignore]
async fn test_return_unknown_borrow_is_not_found() {
    let client = Client::new();
    let book = create_book(&client, &format!("Unknown return {}", unique_suffix()), 1, 0).await;
    let book_id = book["id"].as_i64().expect("No book id");
    let user_id = register_user(&client, "ghost").await;

    let response = client
        .post(format!("{}/borrows/return", BASE_URL))
        .json(&json!({ "borrow_id": "19700101000", "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 4);
    assert_eq!(body["error"], "NoSuchData");
    assert_eq!(fetch_book(&client, book_id).await["residual"], 0);
}

#[tokio::test]
#[ignore]
async fn test_book_listing_pagination() {
    let client = Client::new();
    let marker = format!("Paged {}", unique_suffix());

    for n in 0..25 {
        create_book(&client, &format!("{} #{:02}", marker, n), 1, 1).await;
    }

    let first: Value = client
        .get(format!("{}/books", BASE_URL))
        .query(&[
            ("search_by", "title"),
            ("search_content", marker.as_str()),
            ("size", "10"),
        ])
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(first["page_count"], 3);
    assert_eq!(first["total_books"], 25);
    assert_eq!(first["books"].as_array().map(Vec::len), Some(10));

    let last: Value = client
        .get(format!("{}/books", BASE_URL))
        .query(&[
            ("search_by", "title"),
            ("search_content", marker.as_str()),
            ("size", "10"),
            ("page", "3"),
        ])
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(last["books"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
#[ignore]
async fn test_delete_book_with_open_borrow_conflicts() {
    let client = Client::new();
    let book = create_book(&client, &format!("Pinned {}", unique_suffix()), 1, 1).await;
    let book_id = book["id"].as_i64().expect("No book id");
    let user_id = register_user(&client, "pinner").await;

    client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .delete(format!("{}/admin/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_residual_override_cannot_cover_open_borrow() {
    let client = Client::new();
    let book = create_book(&client, &format!("Single copy {}", unique_suffix()), 1, 1).await;
    let book_id = book["id"].as_i64().expect("No book id");
    let user_id = register_user(&client, "holder").await;

    let borrowed: Value = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .put(format!("{}/admin/books/{}", BASE_URL, book_id))
        .json(&json!({ "residual": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    assert_eq!(fetch_book(&client, book_id).await["residual"], 0);

    // The loan can still be closed
    let response = client
        .post(format!("{}/borrows/return", BASE_URL))
        .json(&json!({
            "borrow_id": borrowed["record"]["borrow_id"],
            "user_id": user_id,
            "book_id": book_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    assert_eq!(fetch_book(&client, book_id).await["residual"], 1);
}

#[tokio::test]
#[ignore]
async fn test_out_of_range_page_is_bad_request() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .query(&[("page", i64::MAX.to_string())])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
#[ignore]
async fn test_return_without_borrow_id_is_bad_request() {
    let client = Client::new();

    let response = client
        .post(format!("{}/borrows/return", BASE_URL))
        .json(&json!({ "user_id": 7, "book_id": 3 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 7);
}
