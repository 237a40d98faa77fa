// SPDX-License-Identifier: MIT

//! Integration tests for the slash-command endpoint.
//!
//! These run the full router against an offline mock database, so they
//! exercise parsing, dispatch, and the canned replies without GCP.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

mod common;

/// POST a form-encoded slash payload and return the parsed JSON reply.
async fn send_command(text: &str) -> (StatusCode, Value) {
    let (app, _state) = common::create_test_app();

    let body = serde_urlencoded::to_string([
        ("token", "test-token"),
        ("team_id", "T123"),
        ("channel_id", "C123"),
        ("user_id", "U123"),
        ("command", "/clubs"),
        ("text", text),
    ])
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/slack/command")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_empty_text_returns_help() {
    let (status, json) = send_command("").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response_type"], "ephemeral");
    let text = json["text"].as_str().unwrap();
    assert!(text.contains("asked for help"));
    assert!(text.contains("`/clubs recent`"));
}

#[tokio::test]
async fn test_question_mark_returns_help() {
    let (status, json) = send_command("how does this work?").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["text"].as_str().unwrap().contains("asked for help"));
}

#[tokio::test]
async fn test_unknown_text_returns_fallback() {
    let (status, json) = send_command("gibberish nonsense").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response_type"], "ephemeral");
    let text = json["text"].as_str().unwrap();
    assert!(text.contains("that did not work"));
    assert!(text.contains("`/clubs help`"));
}

#[tokio::test]
async fn test_clubs_with_offline_db_reports_failure() {
    let (status, json) = send_command("clubs add 336978").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["text"]
        .as_str()
        .unwrap()
        .contains("We failed to get information about your installation"));
}

#[tokio::test]
async fn test_check_now_acknowledges_immediately() {
    // The spawned pass is a no-op against the offline database.
    let (status, json) = send_command("check now").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response_type"], "ephemeral");
    assert!(json["text"].as_str().unwrap().contains("checking now"));
}

#[tokio::test]
async fn test_debug_reports_offline_database() {
    let (status, json) = send_command("debug").await;

    assert_eq!(status, StatusCode::OK);
    let text = json["text"].as_str().unwrap();
    assert!(text.contains("Debug Information"));
    assert!(text.contains("Connected: false"));
}

#[tokio::test]
async fn test_missing_team_id_is_rejected() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/slack/command")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("text=help"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
