//! API integration tests.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::{
    MockInference, multipart_body, multipart_content_type, png_bytes, test_app, test_app_with,
};

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(Method::GET)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let response = app.router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_chat_text_prompt_is_relayed_and_recorded() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/chat/", json!({ "prompt": "Hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json, json!({ "response": "Hello from the model" }));

    let calls = app.inference.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "Hello");
    assert!(!calls[0].is_multimodal());

    let exchanges = app.repo.list_newest_first().await.unwrap();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].prompt, "Hello");
    assert_eq!(exchanges[0].response, "Hello from the model");
    assert_eq!(exchanges[0].source, "web");
    assert!(exchanges[0].image.is_none());
}

#[tokio::test]
async fn test_chat_without_trailing_slash() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(post_json("/chat", json!({ "prompt": "Hi" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_missing_prompt_is_rejected() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/chat/", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Prompt is required");
    assert_eq!(json["code"], "BAD_REQUEST");

    assert!(app.inference.calls().is_empty());
    assert_eq!(app.repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_chat_blank_prompt_is_rejected() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/chat/", json!({ "prompt": "   \n" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_chat_unknown_content_type_has_no_prompt() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("prompt=Hello"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Prompt is required");
    assert_eq!(app.repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_chat_malformed_json_is_bad_request() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"prompt\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.inference.calls().is_empty());
}

#[tokio::test]
async fn test_chat_urlencoded_form_is_mobile() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("prompt=Hello+there"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let exchanges = app.repo.list_newest_first().await.unwrap();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].prompt, "Hello there");
    assert_eq!(exchanges[0].source, "mobile");
}

#[tokio::test]
async fn test_chat_upstream_failure_records_nothing() {
    let app = test_app_with(MockInference::failing()).await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/chat/", json!({ "prompt": "Hello" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Server error:"));
    assert_eq!(json["code"], "INTERNAL_ERROR");

    assert_eq!(app.inference.calls().len(), 1);
    assert_eq!(app.repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_chat_multipart_with_image() {
    let app = test_app().await;
    let png = png_bytes(8, 6);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(multipart_body(Some("What is this?"), Some(&png))))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let calls = app.inference.calls();
    assert_eq!(calls.len(), 1);
    let data_url = calls[0].image_data_url.as_deref().unwrap();
    assert!(data_url.starts_with("data:image/jpeg;base64,"));

    let exchanges = app.repo.list_newest_first().await.unwrap();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].source, "mobile");
    let reference = exchanges[0].image.as_deref().unwrap();
    assert!(reference.starts_with("chat_images/"));
    assert!(reference.ends_with(".jpg"));
    assert!(app.media_dir.path().join(reference).is_file());

    // The stored file is served back under /media.
    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/media/{reference}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    assert_eq!(&body[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_chat_multipart_without_image() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(multipart_body(Some("Just text"), None)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let exchanges = app.repo.list_newest_first().await.unwrap();
    assert_eq!(exchanges.len(), 1);
    assert!(exchanges[0].image.is_none());
    assert!(!app.inference.calls()[0].is_multimodal());
}

#[tokio::test]
async fn test_chat_multipart_empty_image_part_is_ignored() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(multipart_body(Some("No photo"), Some(&[]))))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let exchanges = app.repo.list_newest_first().await.unwrap();
    assert!(exchanges[0].image.is_none());
}

#[tokio::test]
async fn test_chat_multipart_missing_prompt() {
    let app = test_app().await;
    let png = png_bytes(4, 4);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(multipart_body(None, Some(&png))))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.inference.calls().is_empty());
    assert_eq!(app.repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_chat_undecodable_image_fails_without_calling_model() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(multipart_body(
                    Some("Look"),
                    Some(b"definitely not an image"),
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.inference.calls().is_empty());
    assert_eq!(app.repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_chat_history_empty() {
    let app = test_app().await;

    let response = app.router.oneshot(get("/chat-history/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_chat_history_newest_first() {
    let app = test_app().await;

    for prompt in ["t1", "t2", "t3"] {
        let response = app
            .router
            .clone()
            .oneshot(post_json("/chat/", json!({ "prompt": prompt })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .router
        .clone()
        .oneshot(get("/chat-history"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let entries = json.as_array().unwrap();
    let prompts: Vec<&str> = entries
        .iter()
        .map(|e| e["prompt"].as_str().unwrap())
        .collect();
    assert_eq!(prompts, vec!["t3", "t2", "t1"]);

    let first = &entries[0];
    assert_eq!(first["response"], "Hello from the model");
    assert_eq!(first["source"], "web");
    assert!(first["image"].is_null());
    assert!(first["timestamp"].is_string());
    assert!(first["id"].is_i64());
}

#[tokio::test]
async fn test_chat_history_exposes_image_url() {
    let app = test_app().await;
    let png = png_bytes(3, 3);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(multipart_body(Some("Photo"), Some(&png))))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.router.oneshot(get("/chat-history/")).await.unwrap();
    let json = body_json(response).await;
    let url = json[0]["image"].as_str().unwrap();
    assert!(url.starts_with("/media/chat_images/"));
    assert_eq!(json[0]["source"], "mobile");
}

#[tokio::test]
async fn test_storage_failure_returns_500_and_removes_image() {
    let app = test_app().await;
    app.database.close().await;

    let response = app
        .router
        .clone()
        .oneshot(get("/chat-history/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");

    let png = png_bytes(4, 4);
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/chat/")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, multipart_content_type())
                .body(Body::from(multipart_body(Some("Keep this?"), Some(&png))))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The model was asked, but the stored image was rolled back with the row.
    assert_eq!(app.inference.calls().len(), 1);
    let images_dir = app.media_dir.path().join("chat_images");
    let leftover = match std::fs::read_dir(&images_dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    };
    assert_eq!(leftover, 0);
}
