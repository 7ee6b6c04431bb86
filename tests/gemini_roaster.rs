//! GeminiRoaster model fallback against a stand-in models endpoint.
#![cfg(feature = "server")]

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use git_roast::api::RoastPayload;
use git_roast::server::{
    gemini::{fallback_roast, GeminiRoaster, Roaster},
    github::RepoRef,
};

fn reply(text: &str) -> axum::response::Response {
    Json(json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })).into_response()
}

async fn generate(
    Path(call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> axum::response::Response {
    if query.get("key").map(String::as_str) != Some("test-key") {
        return (StatusCode::FORBIDDEN, "bad key").into_response();
    }
    match call.as_str() {
        "good-model:generateContent" => {
            reply("```json\n{\"roast\": \"Your README is a cry for help.\", \"score\": 81}\n```")
        }
        "chatty-model:generateContent" => reply("I refuse to roast this masterpiece."),
        _ => (StatusCode::NOT_FOUND, "model not found").into_response(),
    }
}

async fn mock_models() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/models", listener.local_addr().unwrap());
    let app = Router::new().route("/models/:call", post(generate));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn roaster(base: &str, models: &[&str]) -> GeminiRoaster {
    let models = models.iter().map(|m| m.to_string()).collect();
    GeminiRoaster::new("test-key", models, base).unwrap()
}

fn repo() -> RepoRef {
    RepoRef {
        owner: "acme".into(),
        name: "widget".into(),
    }
}

#[tokio::test]
async fn falls_through_to_next_model() {
    let base = mock_models().await;

    let payload = roaster(&base, &["retired-model", "good-model"])
        .roast(&repo(), "fn main() {}")
        .await;

    assert_eq!(payload, RoastPayload::new("Your README is a cry for help.", 81.0));
}

#[tokio::test]
async fn every_model_failing_yields_fallback() {
    let base = mock_models().await;

    let payload = roaster(&base, &["retired-model", "also-retired"])
        .roast(&repo(), "fn main() {}")
        .await;

    assert_eq!(payload, fallback_roast());
}

#[tokio::test]
async fn unusable_reply_yields_fallback_without_trying_more_models() {
    let base = mock_models().await;

    let payload = roaster(&base, &["chatty-model", "good-model"])
        .roast(&repo(), "fn main() {}")
        .await;

    assert_eq!(payload, fallback_roast());
}
