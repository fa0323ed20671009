//! Integration tests for the users API surface of a single worker.

use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

mod common;

#[tokio::test]
async fn create_then_fetch_round_trip() {
    let (base, _store) = common::start_api_server().await;
    let client = common::client();

    let response = client
        .get(format!("{base}/api/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let response = client
        .post(format!("{base}/api/users"))
        .json(&json!({"username": "Vlad", "age": 25, "hobbies": ["gym"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let created = &body["data"];
    assert_eq!(created["username"], "Vlad");
    assert_eq!(created["age"], 25);
    assert_eq!(created["hobbies"], json!(["gym"]));
    let id = created["id"].as_str().unwrap().to_string();
    assert!(Uuid::try_parse(&id).is_ok());

    let response = client
        .get(format!("{base}/api/users/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["username"], "Vlad");
}

#[tokio::test]
async fn partial_update_touches_only_supplied_fields() {
    let (base, _store) = common::start_api_server().await;
    let client = common::client();

    let created: Value = client
        .post(format!("{base}/api/users"))
        .json(&json!({"username": "Vlad", "age": 25, "hobbies": ["gym"]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = client
        .put(format!("{base}/api/users/{id}"))
        .json(&json!({"username": "Vladimir"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["username"], "Vladimir");
    assert_eq!(body["data"]["age"], 25);
    assert_eq!(body["data"]["hobbies"], json!(["gym"]));

    // An unrecognized field never reaches the stored record.
    let response = client
        .put(format!("{base}/api/users/{id}"))
        .json(&json!({"job": "Developer"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["data"].get("job").is_none());
    assert_eq!(body["data"]["username"], "Vladimir");

    // A present-but-wrong-typed field is rejected outright.
    let response = client
        .put(format!("{base}/api/users/{id}"))
        .json(&json!({"age": "old"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_then_fetch_returns_not_found() {
    let (base, store) = common::start_api_server().await;
    let client = common::client();

    let created: Value = client
        .post(format!("{base}/api/users"))
        .json(&json!({"username": "Vlad", "age": 25, "hobbies": []}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = client
        .delete(format!("{base}/api/users/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = client
        .get(format!("{base}/api/users/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting an id that no longer exists is a 404 and leaves the
    // collection untouched.
    let response = client
        .delete(format!("{base}/api/users/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn malformed_ids_never_reach_the_store() {
    let (base, store) = common::start_api_server().await;
    let client = common::client();

    for request in [
        client.get(format!("{base}/api/users/not-a-uuid")),
        client
            .put(format!("{base}/api/users/123"))
            .json(&json!({"username": "x"})),
        client.delete(format!("{base}/api/users/almost-a-uuid-0000")),
    ] {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("uuid"));
    }
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let (base, _store) = common::start_api_server().await;
    let client = common::client();
    let missing = Uuid::new_v4();

    let response = client
        .get(format!("{base}/api/users/{missing}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .put(format!("{base}/api/users/{missing}"))
        .json(&json!({"username": "ghost"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .delete(format!("{base}/api/users/{missing}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_incomplete_or_mistyped_bodies() {
    let (base, store) = common::start_api_server().await;
    let client = common::client();

    // Missing body entirely.
    let response = client
        .post(format!("{base}/api/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed JSON counts as a missing body.
    let response = client
        .post(format!("{base}/api/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for body in [
        json!({"username": "Vlad", "age": 25}),
        json!({"username": "Vlad", "age": "25", "hobbies": []}),
        json!({"username": "", "age": 25, "hobbies": []}),
        json!({"username": "Vlad", "age": 25, "hobbies": [1, 2]}),
    ] {
        let response = client
            .post(format!("{base}/api/users"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let envelope: Value = response.json().await.unwrap();
        assert!(envelope["error"].is_string());
    }
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn update_with_empty_body_changes_nothing() {
    let (base, _store) = common::start_api_server().await;
    let client = common::client();

    let created: Value = client
        .post(format!("{base}/api/users"))
        .json(&json!({"username": "Vlad", "age": 25, "hobbies": ["gym"]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = client
        .put(format!("{base}/api/users/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"], created["data"]);
}

#[tokio::test]
async fn list_reflects_creates_minus_deletes() {
    let (base, _store) = common::start_api_server().await;
    let client = common::client();

    let mut ids = Vec::new();
    for i in 0..5 {
        let created: Value = client
            .post(format!("{base}/api/users"))
            .json(&json!({"username": format!("user-{i}"), "age": i, "hobbies": []}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(created["data"]["id"].as_str().unwrap().to_string());
    }
    for id in ids.iter().take(2) {
        let response = client
            .delete(format!("{base}/api/users/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let body: Value = client
        .get(format!("{base}/api/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 3);
    // Survivors keep their insertion order.
    let listed_ids: Vec<_> = listed
        .iter()
        .map(|u| u["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(listed_ids, &ids[2..]);
}

#[tokio::test]
async fn routing_edges_are_consistent() {
    let (base, _store) = common::start_api_server().await;
    let client = common::client();

    // Trailing slash on the collection is accepted.
    let response = client
        .get(format!("{base}/api/users/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Unknown paths are 404 with the error envelope.
    let response = client
        .get(format!("{base}/api/unknown"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    // Known paths with the wrong verb are 405.
    let response = client
        .post(format!("{base}/api/users/{}", Uuid::new_v4()))
        .json(&json!({"username": "Vlad", "age": 25, "hobbies": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = client
        .patch(format!("{base}/api/users"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = client
        .delete(format!("{base}/api/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
