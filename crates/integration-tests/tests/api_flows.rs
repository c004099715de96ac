//! Live API tests.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`pawgo-cli migrate`)
//! - The API server running (`cargo run -p pawgo-api`)
//!
//! Run with: `cargo test -p pawgo-integration-tests -- --ignored`

use chrono::{Duration, Utc};
use pawgo_integration_tests::{TestClient, TestUser};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

fn service_body() -> Value {
    json!({
        "category": "grooming",
        "name": "Suds & Snips",
        "description": "Full groom for dogs and cats",
        "location": "Portland",
        "packages": {
            "basic": { "price": "30.00", "duration_minutes": 45 },
            "premium": { "price": "50.00", "duration_minutes": 90, "inclusions": ["nail trim"] },
            "luxury": { "price": "80.00", "duration_minutes": 150, "inclusions": ["nail trim", "blueberry facial"] }
        }
    })
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_health() {
    let api = TestClient::new();
    let resp = api.send(Method::GET, "/health", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap_or_default(), "ok");
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_unauthenticated_requests_are_rejected() {
    let api = TestClient::new();
    let body = api
        .expect_json(Method::GET, "/api/users/profile", None, None, StatusCode::UNAUTHORIZED)
        .await;
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_self_registration_cannot_claim_admin() {
    let api = TestClient::new();
    let resp = api
        .send(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({
                "name": "Sneaky",
                "email": pawgo_integration_tests::unique_email("sneaky"),
                "password": "correct horse battery",
                "role": "admin",
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_non_owner_cannot_edit_pet() {
    let api = TestClient::new();
    let owner = api.register("pet_owner").await;
    let stranger = api.register("pet_owner").await;

    let pet = api
        .expect_json(
            Method::POST,
            "/api/users/pets",
            Some(&owner),
            Some(json!({ "name": "Biscuit", "species": "dog", "age_years": 3 })),
            StatusCode::CREATED,
        )
        .await;
    let path = format!("/api/users/pets/{}", pet["id"]);

    let resp = api
        .send(
            Method::PUT,
            &path,
            Some(&stranger),
            Some(json!({ "name": "Stolen", "species": "dog" })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let after = api
        .expect_json(Method::GET, &path, Some(&owner), None, StatusCode::OK)
        .await;
    assert_eq!(after["name"], "Biscuit");
    assert_eq!(after["age_years"], 3);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_order_over_stock_leaves_inventory_untouched() {
    let api = TestClient::new();
    let seller = api.register("service_provider").await;
    let buyer = api.register("pet_owner").await;

    let product = api
        .expect_json(
            Method::POST,
            "/api/products",
            Some(&seller),
            Some(json!({
                "name": "Salmon treats",
                "category": "food",
                "price": "12.50",
                "quantity": 2,
            })),
            StatusCode::CREATED,
        )
        .await;
    let product_path = format!("/api/products/{}", product["id"]);

    let resp = api
        .send(
            Method::POST,
            "/api/orders",
            Some(&buyer),
            Some(json!({
                "product_id": product["id"],
                "quantity": 3,
                "shipping_address": "1 Kibble Lane",
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let after = api
        .expect_json(Method::GET, &product_path, None, None, StatusCode::OK)
        .await;
    assert_eq!(after["quantity"], 2);

    // An order that fits succeeds and cancelling it restocks
    let order = api
        .expect_json(
            Method::POST,
            "/api/orders",
            Some(&buyer),
            Some(json!({
                "product_id": product["id"],
                "quantity": 2,
                "shipping_address": "1 Kibble Lane",
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(order["total"], "25.00");

    let sold_out = api
        .expect_json(Method::GET, &product_path, None, None, StatusCode::OK)
        .await;
    assert_eq!(sold_out["quantity"], 0);

    let cancelled = api
        .expect_json(
            Method::DELETE,
            &format!("/api/orders/{}", order["id"]),
            Some(&buyer),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(cancelled["status"], "cancelled");

    let restocked = api
        .expect_json(Method::GET, &product_path, None, None, StatusCode::OK)
        .await;
    assert_eq!(restocked["quantity"], 2);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_booking_confirmation_awards_points_once() {
    let api = TestClient::new();
    let provider = api.register("service_provider").await;
    let owner = api.register("pet_owner").await;

    let service = api
        .expect_json(
            Method::POST,
            "/api/services",
            Some(&provider),
            Some(service_body()),
            StatusCode::CREATED,
        )
        .await;
    let pet = api
        .expect_json(
            Method::POST,
            "/api/users/pets",
            Some(&owner),
            Some(json!({ "name": "Mochi", "species": "cat" })),
            StatusCode::CREATED,
        )
        .await;

    let appointment = api
        .expect_json(
            Method::POST,
            "/api/appointments",
            Some(&owner),
            Some(json!({
                "pet_id": pet["id"],
                "service_id": service["id"],
                "package_tier": "luxury",
                "start_time": Utc::now() + Duration::days(3),
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(appointment["status"], "pending");
    assert_eq!(appointment["total"], "80.00");
    let status_path = format!("/api/appointments/{}/status", appointment["id"]);

    // Owners cannot confirm their own booking
    let resp = api
        .send(Method::PATCH, &status_path, Some(&owner), Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    api.expect_json(
        Method::PATCH,
        &status_path,
        Some(&provider),
        Some(json!({ "status": "confirmed" })),
        StatusCode::OK,
    )
    .await;

    // A repeated confirmation is not a valid transition
    let resp = api
        .send(Method::PATCH, &status_path, Some(&provider), Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let loyalty = api
        .expect_json(Method::GET, "/api/users/loyalty", Some(&owner), None, StatusCode::OK)
        .await;
    assert_eq!(loyalty["points"], 25);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_payment_stores_only_card_summary() {
    let api = TestClient::new();
    let provider = api.register("service_provider").await;
    let owner = api.register("pet_owner").await;

    let service = api
        .expect_json(
            Method::POST,
            "/api/services",
            Some(&provider),
            Some(service_body()),
            StatusCode::CREATED,
        )
        .await;
    let pet = api
        .expect_json(
            Method::POST,
            "/api/users/pets",
            Some(&owner),
            Some(json!({ "name": "Pepper", "species": "dog" })),
            StatusCode::CREATED,
        )
        .await;
    let appointment = api
        .expect_json(
            Method::POST,
            "/api/appointments",
            Some(&owner),
            Some(json!({
                "pet_id": pet["id"],
                "service_id": service["id"],
                "package_tier": "basic",
                "start_time": Utc::now() + Duration::days(1),
            })),
            StatusCode::CREATED,
        )
        .await;

    let payment = api
        .expect_json(
            Method::POST,
            "/api/payments",
            Some(&owner),
            Some(json!({
                "appointment_id": appointment["id"],
                "card": {
                    "number": "4242 4242 4242 4242",
                    "expiry_month": 12,
                    "expiry_year": 2099,
                    "cvv": "123",
                    "holder_name": "Pat Owner",
                },
            })),
            StatusCode::CREATED,
        )
        .await;

    assert_eq!(payment["status"], "paid");
    assert_eq!(payment["card_brand"], "visa");
    assert_eq!(payment["card_last4"], "4242");
    let raw = payment.to_string();
    assert!(!raw.contains("4242424242424242"));
    assert!(payment.get("card_fingerprint").is_none());
}

// ============================================================================
// Ownership: a stranger's writes are refused and leave the record unchanged
// ============================================================================

async fn create_service(api: &TestClient, provider: &TestUser) -> Value {
    api.expect_json(
        Method::POST,
        "/api/services",
        Some(provider),
        Some(service_body()),
        StatusCode::CREATED,
    )
    .await
}

/// A pending appointment on a fresh grooming service.
async fn book(api: &TestClient, provider: &TestUser, owner: &TestUser) -> Value {
    let service = create_service(api, provider).await;
    let pet = api
        .expect_json(
            Method::POST,
            "/api/users/pets",
            Some(owner),
            Some(json!({ "name": "Juniper", "species": "dog" })),
            StatusCode::CREATED,
        )
        .await;
    api.expect_json(
        Method::POST,
        "/api/appointments",
        Some(owner),
        Some(json!({
            "pet_id": pet["id"],
            "service_id": service["id"],
            "package_tier": "basic",
            "start_time": Utc::now() + Duration::days(2),
            "notes": "Gentle with the paws",
        })),
        StatusCode::CREATED,
    )
    .await
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_stranger_cannot_edit_or_delete_service() {
    let api = TestClient::new();
    let provider = api.register("service_provider").await;
    let rival = api.register("service_provider").await;

    let service = create_service(&api, &provider).await;
    let path = format!("/api/services/{}", service["id"]);

    let mut hijacked = service_body();
    hijacked["name"] = json!("Rival Grooming");
    api.expect_forbidden(Method::PUT, &path, &rival, Some(hijacked)).await;
    api.expect_forbidden(Method::DELETE, &path, &rival, None).await;

    let after = api.expect_json(Method::GET, &path, None, None, StatusCode::OK).await;
    assert_eq!(after["name"], "Suds & Snips");
    assert_eq!(after["packages"]["basic"]["price"], "30.00");
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_stranger_cannot_edit_or_delete_product() {
    let api = TestClient::new();
    let seller = api.register("service_provider").await;
    let rival = api.register("service_provider").await;

    let product = api
        .expect_json(
            Method::POST,
            "/api/products",
            Some(&seller),
            Some(json!({
                "name": "Rope toy",
                "category": "toys",
                "price": "8.00",
                "quantity": 10,
            })),
            StatusCode::CREATED,
        )
        .await;
    let path = format!("/api/products/{}", product["id"]);

    api.expect_forbidden(
        Method::PUT,
        &path,
        &rival,
        Some(json!({ "name": "Rope toy", "category": "toys", "price": "0.01", "quantity": 0 })),
    )
    .await;
    api.expect_forbidden(Method::DELETE, &path, &rival, None).await;

    let after = api.expect_json(Method::GET, &path, None, None, StatusCode::OK).await;
    assert_eq!(after["price"], "8.00");
    assert_eq!(after["quantity"], 10);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_stranger_cannot_edit_or_delete_advertisement() {
    let api = TestClient::new();
    let provider = api.register("service_provider").await;
    let rival = api.register("service_provider").await;

    let body = json!({
        "title": "Spring grooming week",
        "image_url": "https://cdn.pawgo.pet/ads/spring.png",
        "starts_at": Utc::now() - Duration::days(1),
        "ends_at": Utc::now() + Duration::days(6),
    });
    let ad = api
        .expect_json(
            Method::POST,
            "/api/advertisements",
            Some(&provider),
            Some(body.clone()),
            StatusCode::CREATED,
        )
        .await;
    let path = format!("/api/advertisements/{}", ad["id"]);

    let mut hijacked = body;
    hijacked["title"] = json!("Rival sale");
    api.expect_forbidden(Method::PUT, &path, &rival, Some(hijacked)).await;
    api.expect_forbidden(Method::DELETE, &path, &rival, None).await;

    let after = api.expect_json(Method::GET, &path, None, None, StatusCode::OK).await;
    assert_eq!(after["title"], "Spring grooming week");
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_stranger_cannot_edit_or_delete_review() {
    let api = TestClient::new();
    let provider = api.register("service_provider").await;
    let author = api.register("pet_owner").await;
    let stranger = api.register("pet_owner").await;

    let service = create_service(&api, &provider).await;
    let review = api
        .expect_json(
            Method::POST,
            "/api/reviews",
            Some(&author),
            Some(json!({ "service_id": service["id"], "rating": 5, "comment": "Spotless" })),
            StatusCode::CREATED,
        )
        .await;
    let path = format!("/api/reviews/{}", review["id"]);

    let rewrite = json!({ "rating": 1, "comment": "Awful" });
    api.expect_forbidden(Method::PUT, &path, &stranger, Some(rewrite)).await;
    api.expect_forbidden(Method::DELETE, &path, &stranger, None).await;

    let after = api.expect_json(Method::GET, &path, None, None, StatusCode::OK).await;
    assert_eq!(after["rating"], 5);
    assert_eq!(after["comment"], "Spotless");
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_stranger_cannot_touch_appointment() {
    let api = TestClient::new();
    let provider = api.register("service_provider").await;
    let owner = api.register("pet_owner").await;
    let stranger = api.register("pet_owner").await;

    let appointment = book(&api, &provider, &owner).await;
    let path = format!("/api/appointments/{}", appointment["id"]);

    api.expect_forbidden(Method::PUT, &path, &stranger, Some(json!({ "notes": "Changed" })))
        .await;
    api.expect_forbidden(
        Method::PATCH,
        &format!("{path}/status"),
        &stranger,
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    api.expect_forbidden(Method::DELETE, &path, &stranger, None).await;

    let after = api.expect_json(Method::GET, &path, Some(&owner), None, StatusCode::OK).await;
    assert_eq!(after["status"], "pending");
    assert_eq!(after["notes"], "Gentle with the paws");
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_stranger_cannot_cancel_order() {
    let api = TestClient::new();
    let seller = api.register("service_provider").await;
    let buyer = api.register("pet_owner").await;
    let stranger = api.register("pet_owner").await;

    let product = api
        .expect_json(
            Method::POST,
            "/api/products",
            Some(&seller),
            Some(json!({ "name": "Catnip", "category": "toys", "price": "3.25", "quantity": 4 })),
            StatusCode::CREATED,
        )
        .await;
    let order = api
        .expect_json(
            Method::POST,
            "/api/orders",
            Some(&buyer),
            Some(json!({
                "product_id": product["id"],
                "quantity": 1,
                "shipping_address": "9 Whisker Way",
            })),
            StatusCode::CREATED,
        )
        .await;
    let path = format!("/api/orders/{}", order["id"]);

    api.expect_forbidden(Method::DELETE, &path, &stranger, None).await;
    api.expect_forbidden(
        Method::PATCH,
        &format!("{path}/status"),
        &stranger,
        Some(json!({ "status": "shipped" })),
    )
    .await;

    let after = api.expect_json(Method::GET, &path, Some(&buyer), None, StatusCode::OK).await;
    assert_eq!(after["status"], "pending");
    let product_path = format!("/api/products/{}", product["id"]);
    let stock = api
        .expect_json(Method::GET, &product_path, None, None, StatusCode::OK)
        .await;
    assert_eq!(stock["quantity"], 3);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_only_admins_change_payments() {
    let api = TestClient::new();
    let provider = api.register("service_provider").await;
    let owner = api.register("pet_owner").await;
    let stranger = api.register("pet_owner").await;

    let appointment = book(&api, &provider, &owner).await;
    let payment = api
        .expect_json(
            Method::POST,
            "/api/payments",
            Some(&owner),
            Some(json!({
                "appointment_id": appointment["id"],
                "card": {
                    "number": "5555 5555 5555 4444",
                    "expiry_month": 6,
                    "expiry_year": 2099,
                    "cvv": "321",
                    "holder_name": "Pat Owner",
                },
            })),
            StatusCode::CREATED,
        )
        .await;
    let path = format!("/api/payments/{}", payment["id"]);

    api.expect_forbidden(Method::GET, &path, &stranger, None).await;
    for user in [&owner, &stranger] {
        api.expect_forbidden(
            Method::PATCH,
            &format!("{path}/status"),
            user,
            Some(json!({ "status": "refunded" })),
        )
        .await;
        api.expect_forbidden(Method::DELETE, &path, user, None).await;
    }

    let after = api.expect_json(Method::GET, &path, Some(&owner), None, StatusCode::OK).await;
    assert_eq!(after["status"], "paid");
}

// ============================================================================
// Input bounds
// ============================================================================

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_malformed_path_and_query_are_json_bad_requests() {
    let api = TestClient::new();
    let owner = api.register("pet_owner").await;

    let body = api
        .expect_json(
            Method::GET,
            "/api/users/pets/abc",
            Some(&owner),
            None,
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(body["error"].is_string());

    let body = api
        .expect_json(
            Method::GET,
            "/api/services?category=astrology",
            None,
            None,
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_oversized_numbers_are_bad_requests() {
    let api = TestClient::new();
    let seller = api.register("service_provider").await;
    let owner = api.register("pet_owner").await;

    let resp = api
        .send(
            Method::POST,
            "/api/products",
            Some(&seller),
            Some(json!({
                "name": "Gold collar",
                "category": "accessories",
                "price": "1000000000000",
                "quantity": 1,
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = api
        .send(
            Method::POST,
            "/api/users/pets",
            Some(&owner),
            Some(json!({ "name": "Jumbo", "species": "elephant", "weight_kg": "100000" })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // A total past the order column is refused without touching stock
    let product = api
        .expect_json(
            Method::POST,
            "/api/products",
            Some(&seller),
            Some(json!({
                "name": "Kennel",
                "category": "housing",
                "price": "99999999.99",
                "quantity": 1000,
            })),
            StatusCode::CREATED,
        )
        .await;
    let resp = api
        .send(
            Method::POST,
            "/api/orders",
            Some(&owner),
            Some(json!({
                "product_id": product["id"],
                "quantity": 1000,
                "shipping_address": "1 Kibble Lane",
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let after = api
        .expect_json(
            Method::GET,
            &format!("/api/products/{}", product["id"]),
            None,
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(after["quantity"], 1000);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_schedule_must_match_service_and_open_booking() {
    let api = TestClient::new();
    let provider = api.register("service_provider").await;
    let owner = api.register("pet_owner").await;

    let appointment = book(&api, &provider, &owner).await;
    let path = format!("/api/appointments/{}", appointment["id"]);
    let start = Utc::now() + Duration::days(2);

    // The service is grooming, so a boarding slot is refused
    let resp = api
        .send(
            Method::POST,
            &format!("{path}/schedule"),
            Some(&owner),
            Some(json!({ "kind": "boarding", "duration": "overnight", "start_time": start })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    api.expect_json(
        Method::PATCH,
        &format!("{path}/status"),
        Some(&owner),
        Some(json!({ "status": "cancelled" })),
        StatusCode::OK,
    )
    .await;
    let resp = api
        .send(
            Method::POST,
            &format!("{path}/schedule"),
            Some(&owner),
            Some(json!({ "kind": "grooming", "duration": "spa", "start_time": start })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
