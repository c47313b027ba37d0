use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use inbox_client::api::articles::{self, ArticleForm, CreateOutcome, PublishOutcome};
use inbox_client::api::upload::{self, Media, UploadError};
use inbox_client::api::ApiSession;
use inbox_client::config::{Config, DebugConfig, ReconnectPolicy};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get test addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server failed");
    });
    format!("127.0.0.1:{}", addr.port())
}

fn session(host: &str) -> ApiSession {
    ApiSession::new(&Config {
        server_host: host.to_string(),
        secure: false,
        csrf_token: "testtoken".to_string(),
        session_cookie: Some("testsession".to_string()),
        timezone: None,
        reconnect: ReconnectPolicy::PageLifetime,
        toast_ttl_secs: 600,
        upload_timeout_secs: 1,
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        debug: DebugConfig::default(),
    })
}

fn media() -> Media {
    Media {
        filename: "pic.png".to_string(),
        mime: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

fn upload_router(status: StatusCode, body: serde_json::Value) -> Router {
    Router::new().route(
        "/tinymce/upload",
        post(move || async move { (status, Json(body)) }),
    )
}

#[tokio::test]
async fn upload_returns_the_served_location() {
    let host = serve(upload_router(
        StatusCode::OK,
        json!({ "status": "success", "data": { "location": "/media/pic.png" } }),
    ))
    .await;

    let location = upload::send(&session(&host), &media(), None, 5)
        .await
        .expect("upload should succeed");

    assert_eq!(location, "/media/pic.png");
}

#[tokio::test]
async fn upload_status_codes_map_to_their_messages() {
    let cases = [
        (StatusCode::FORBIDDEN, "You have no permission to edit this article."),
        (StatusCode::NOT_FOUND, "That article does not exist."),
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server error while saving the file. Please try again.",
        ),
    ];

    for (status, expected) in cases {
        let host = serve(upload_router(status, json!({ "status": "error" }))).await;
        let error = upload::send(&session(&host), &media(), None, 5)
            .await
            .expect_err("upload should fail");
        assert_eq!(error.to_string(), expected, "status {}", status);
    }
}

#[tokio::test]
async fn upload_rejection_uses_the_server_message_when_present() {
    let host = serve(upload_router(
        StatusCode::BAD_REQUEST,
        json!({ "status": "error", "message": "File type not allowed." }),
    ))
    .await;

    let error = upload::send(&session(&host), &media(), None, 5)
        .await
        .expect_err("upload should fail");

    assert!(matches!(error, UploadError::Invalid(_)));
    assert_eq!(error.to_string(), "File type not allowed.");
}

#[tokio::test]
async fn oversized_upload_with_non_json_body_maps_to_too_large() {
    // the proxy cuts oversized uploads off before the view runs
    let router = Router::new().route(
        "/tinymce/upload",
        post(|| async { (StatusCode::PAYLOAD_TOO_LARGE, "<html>too large</html>") }),
    );
    let host = serve(router).await;

    let error = upload::send(&session(&host), &media(), None, 5)
        .await
        .expect_err("upload should fail");

    assert!(matches!(error, UploadError::TooLarge));
    assert_eq!(error.to_string(), "The file is too big.");
}

#[tokio::test]
async fn stuck_upload_times_out() {
    let router = Router::new().route(
        "/tinymce/upload",
        post(|| async {
            sleep(Duration::from_secs(3)).await;
            Json(json!({ "status": "success", "data": { "location": "/media/late.png" } }))
        }),
    );
    let host = serve(router).await;

    let error = upload::send(&session(&host), &media(), None, 1)
        .await
        .expect_err("upload should time out");

    assert!(matches!(error, UploadError::TimedOut));
    assert_eq!(error.to_string(), "Upload timed out. Try again.");
}

#[tokio::test]
async fn successful_upload_without_location_is_rejected() {
    let host = serve(upload_router(
        StatusCode::OK,
        json!({ "status": "success", "data": {} }),
    ))
    .await;

    let error = upload::send(&session(&host), &media(), None, 5)
        .await
        .expect_err("upload should fail");

    assert!(matches!(error, UploadError::MissingLocation));
}

#[tokio::test]
async fn article_create_surfaces_validation_errors() {
    let router = Router::new().route(
        "/articles/create",
        post(|| async {
            Json(json!({
                "status": "fail",
                "data": { "title": ["This field is required."] }
            }))
        }),
    );
    let host = serve(router).await;

    let outcome = articles::create(&session(&host), ArticleForm::default())
        .await
        .expect("request should complete");

    match outcome {
        CreateOutcome::Invalid(errors) => {
            assert_eq!(errors["title"], vec!["This field is required."]);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[tokio::test]
async fn article_create_surfaces_server_rejection() {
    let router = Router::new().route(
        "/articles/create",
        post(|| async { Json(json!({ "status": "error", "message": "boom" })) }),
    );
    let host = serve(router).await;

    let outcome = articles::create(&session(&host), ArticleForm::default())
        .await
        .expect("request should complete");

    match outcome {
        CreateOutcome::Rejected { message } => assert_eq!(message, "boom"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[derive(Clone, Default)]
struct PublishState {
    uploads: Arc<Mutex<Vec<String>>>,
    edits: Arc<Mutex<Vec<String>>>,
}

/// Full platform stand-in for the create -> upload -> update chain
fn publish_router(state: PublishState) -> Router {
    Router::new()
        .route(
            "/articles/create",
            post(|| async {
                Json(json!({
                    "status": "success",
                    "data": { "articleId": "42", "articleSlug": "intro" }
                }))
            }),
        )
        .route(
            "/tinymce/upload",
            post(
                |State(state): State<PublishState>, body: Bytes| async move {
                    state
                        .uploads
                        .lock()
                        .unwrap()
                        .push(String::from_utf8_lossy(&body).to_string());
                    Json(json!({ "status": "success", "data": { "location": "/media/pic.png" } }))
                },
            ),
        )
        .route(
            "/articles/:slug/edit",
            post(
                |axum::extract::Path(slug): axum::extract::Path<String>,
                 State(state): State<PublishState>| async move {
                    state.edits.lock().unwrap().push(slug);
                    Json(json!({
                        "status": "success",
                        "data": { "articleUrl": "/articles/intro/" }
                    }))
                },
            ),
        )
        .with_state(state)
}

#[tokio::test]
async fn publish_chains_create_upload_and_update() {
    let state = PublishState::default();
    let host = serve(publish_router(state.clone())).await;

    let form = ArticleForm {
        fields: vec![("title".to_string(), "My article".to_string())],
        content: "<p>hello</p>".to_string(),
    };

    let outcome = articles::publish(&session(&host), form, vec![media()], 5)
        .await
        .expect("publish should complete");

    match outcome {
        PublishOutcome::Published { article_url } => {
            assert_eq!(article_url, "/articles/intro/");
        }
        other => panic!("expected publish success, got {:?}", other),
    }

    // the upload was addressed to the freshly created article
    let uploads = state.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].contains("articleId"));
    assert!(uploads[0].contains("42"));
    assert!(uploads[0].contains("pic.png"));

    assert_eq!(state.edits.lock().unwrap().as_slice(), ["intro"]);
}
