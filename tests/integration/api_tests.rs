//! API integration tests
//!
//! Run against a live server with a migrated, empty database.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000/api";
const ADMIN_TOKEN: &str = "admin-token";

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

async fn post(client: &Client, path: &str, role: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(ADMIN_TOKEN)
        .header("X-User-Role", role)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
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
async fn test_register_and_login() {
    let client = Client::new();
    let username = unique("nurse");

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "secret",
            "role": "equipmentManager"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": "secret" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("No token in response");
    assert!(body["user"].get("password").is_none());

    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(me["username"], username);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/beds", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_bed_lifecycle() {
    let client = Client::new();
    let patient = unique("patient");

    let response = post(&client, "/beds", "bedManager", json!({ "count": 1, "wardType": "icu" })).await;
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.expect("Failed to parse response");
    let bed_number = created["startNumber"].as_i64().expect("No start number");

    let response = post(
        &client,
        "/beds/allocate",
        "bedManager",
        json!({ "patientName": patient, "wardType": "icu" }),
    )
    .await;
    assert!(response.status().is_success());

    // Occupied beds cannot be removed
    let response = client
        .delete(format!("{}/beds/{}", BASE_URL, bed_number))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = post(&client, "/beds/discharge", "bedManager", json!({ "patientName": patient })).await;
    assert!(response.status().is_success());

    let history: Value = client
        .get(format!("{}/beds/history", BASE_URL))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let episode = history["history"]
        .as_array()
        .expect("History is not an array")
        .iter()
        .find(|entry| entry["patientName"] == patient.as_str())
        .expect("Episode not recorded");
    assert_eq!(episode["isActive"], false);
    assert!(episode["dischargedAt"].is_string());

    let response = post(
        &client,
        "/beds/maintenance",
        "bedManager",
        json!({ "bedNumber": bed_number.to_string() }),
    )
    .await;
    assert!(response.status().is_success());

    let response = post(
        &client,
        "/beds/return-from-maintenance",
        "bedManager",
        json!({ "bedNumber": bed_number }),
    )
    .await;
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/beds/{}", BASE_URL, bed_number))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_equipment_assignment() {
    let client = Client::new();
    let patient = unique("patient");

    let response = post(
        &client,
        "/equipment",
        "equipmentManager",
        json!({ "name": "Infusion pump", "type": "pump" }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["equipment"]["id"].as_i64().expect("No equipment id");
    assert!(body["equipment"]["serialNumber"]
        .as_str()
        .expect("No serial number")
        .starts_with("EQ-"));

    let response = post(
        &client,
        "/equipment/assign",
        "equipmentManager",
        json!({ "equipmentId": id, "patientName": patient }),
    )
    .await;
    assert!(response.status().is_success());

    let response = post(
        &client,
        "/equipment/assign",
        "equipmentManager",
        json!({ "equipmentId": id, "patientName": "Someone else" }),
    )
    .await;
    assert_eq!(response.status(), 400);

    let listed: Value = client
        .get(format!("{}/equipment/by-patient/{}", BASE_URL, patient))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(listed["count"], 1);

    let response = post(&client, "/equipment/return", "equipmentManager", json!({ "equipmentId": id })).await;
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_concurrent_allocations_get_distinct_beds() {
    let client = Client::new();

    let response = post(&client, "/beds", "bedManager", json!({ "count": 5 })).await;
    assert_eq!(response.status(), 201);

    let patients: Vec<String> = (0..5).map(|i| unique(&format!("rush{}", i))).collect();
    let handles: Vec<_> = patients
        .iter()
        .cloned()
        .map(|patient| {
            let client = client.clone();
            tokio::spawn(async move {
                post(&client, "/beds/allocate", "bedManager", json!({ "patientName": patient })).await
            })
        })
        .collect();

    let mut beds = Vec::new();
    for handle in handles {
        let response = handle.await.expect("Request task panicked");
        let status = response.status();
        let body: Value = response.json().await.expect("Failed to parse response");
        if status.is_success() {
            beds.push(body["bed"]["bedNumber"].as_i64().expect("No bed number"));
        } else {
            assert_eq!(status, 400, "unexpected failure: {}", body);
        }
    }
    let allocated = beds.len();
    beds.sort_unstable();
    beds.dedup();
    assert_eq!(beds.len(), allocated, "two patients were given the same bed");

    for patient in &patients {
        post(&client, "/beds/discharge", "bedManager", json!({ "patientName": patient })).await;
    }
}

#[tokio::test]
#[ignore]
async fn test_double_discharge_frees_bed_once() {
    let client = Client::new();
    let patient = unique("patient");

    let response = post(&client, "/beds", "bedManager", json!({ "count": 1 })).await;
    assert_eq!(response.status(), 201);
    let response = post(&client, "/beds/allocate", "bedManager", json!({ "patientName": patient })).await;
    assert!(response.status().is_success());

    let (first, second) = tokio::join!(
        post(&client, "/beds/discharge", "bedManager", json!({ "patientName": patient })),
        post(&client, "/beds/discharge", "bedManager", json!({ "patientName": patient })),
    );
    let successes = [first.status(), second.status()]
        .iter()
        .filter(|s| s.is_success())
        .count();
    assert_eq!(successes, 1);
}

#[tokio::test]
#[ignore]
async fn test_bed_under_maintenance_cannot_be_removed() {
    let client = Client::new();

    let response = post(&client, "/beds", "bedManager", json!({ "count": 1 })).await;
    let created: Value = response.json().await.expect("Failed to parse response");
    let bed_number = created["startNumber"].as_i64().expect("No start number");

    let response = post(&client, "/beds/maintenance", "bedManager", json!({ "bedNumber": bed_number })).await;
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/beds/{}", BASE_URL, bed_number))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // A second maintenance request on the same bed is refused
    let response = post(&client, "/beds/maintenance", "bedManager", json!({ "bedNumber": bed_number })).await;
    assert_eq!(response.status(), 400);

    let response = post(
        &client,
        "/beds/return-from-maintenance",
        "bedManager",
        json!({ "bedNumber": bed_number }),
    )
    .await;
    assert!(response.status().is_success());
    let response = client
        .delete(format!("{}/beds/{}", BASE_URL, bed_number))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}
