/// HTTP behavior of the analyze action against an in-process scoring service

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use resume_scorer::config::ApiConfig;
use resume_scorer::state::{ResumeFile, UploadState};
use resume_scorer::{AnalyzeError, App, ScoringClient};

const UNREACHABLE: &str = "http://127.0.0.1:9";

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base: &str) -> ScoringClient {
    ScoringClient::new(ApiConfig::new(Some(base.to_string()), UNREACHABLE))
}

fn app_for(base: &str) -> App {
    App::new(client_for(base), "Data Analyst", PathBuf::from("."))
}

fn sample_resume() -> ResumeFile {
    ResumeFile::new("jane_doe.pdf", b"%PDF-1.4 fake resume".to_vec())
}

/// Scores every upload and echoes back what it received.
async fn score_and_echo(mut multipart: Multipart) -> Json<Value> {
    let mut file_name = None;
    let mut content_type = None;
    let mut file_len = 0;
    let mut target_role = None;

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                file_len = field.bytes().await.unwrap().len();
            }
            Some("target_role") => target_role = Some(field.text().await.unwrap()),
            _ => {}
        }
    }

    Json(json!({
        "ats_score": 87,
        "role_match_score": 64,
        "detected_skills": ["SQL", "Excel"],
        "echo": {
            "file_name": file_name,
            "content_type": content_type,
            "file_len": file_len,
            "target_role": target_role
        }
    }))
}

fn scoring_router() -> Router {
    Router::new().route("/upload-resume/v2", post(score_and_echo))
}

#[tokio::test]
async fn test_posts_file_and_role_as_multipart() {
    let base = spawn_server(scoring_router()).await;
    let client = client_for(&base);

    let mut upload = UploadState::new("Backend Engineer");
    upload.set_file(Some(sample_resume()));
    let request = upload.begin_analysis().unwrap();

    let result = client.analyze(&request).await.unwrap();

    assert_eq!(result.ats_score.as_ref().and_then(|n| n.as_i64()), Some(87));
    assert_eq!(result.role_match_score.as_ref().and_then(|n| n.as_i64()), Some(64));
    assert_eq!(result.detected_skills, vec!["SQL", "Excel"]);

    let echo = &result.raw()["echo"];
    assert_eq!(echo["file_name"], "jane_doe.pdf");
    assert_eq!(echo["content_type"], "application/pdf");
    assert_eq!(echo["file_len"], 20);
    assert_eq!(echo["target_role"], "Backend Engineer");
}

#[tokio::test]
async fn test_empty_role_is_sent() {
    let base = spawn_server(scoring_router()).await;
    let client = client_for(&base);

    let mut upload = UploadState::new("");
    upload.set_file(Some(sample_resume()));
    let request = upload.begin_analysis().unwrap();

    let result = client.analyze(&request).await.unwrap();
    assert_eq!(result.raw()["echo"]["target_role"], "");
}

#[tokio::test]
async fn test_trailing_slash_base_url_hits_the_route() {
    let base = spawn_server(scoring_router()).await;
    let client = client_for(&format!("{}/", base));

    assert_eq!(client.analyze_url(), format!("{}/upload-resume/v2", base));
    assert!(!client.analyze_url().contains("//upload-resume"));

    let mut upload = UploadState::default();
    upload.set_file(Some(sample_resume()));
    let request = upload.begin_analysis().unwrap();
    assert!(client.analyze(&request).await.is_ok());
}

#[tokio::test]
async fn test_blank_base_url_uses_fallback() {
    let base = spawn_server(scoring_router()).await;
    let client = ScoringClient::new(ApiConfig::new(Some("   ".into()), base.clone()));
    assert_eq!(client.base_url(), base);

    let mut upload = UploadState::default();
    upload.set_file(Some(sample_resume()));
    let request = upload.begin_analysis().unwrap();
    assert!(client.analyze(&request).await.is_ok());
}

#[tokio::test]
async fn test_server_error_surfaces_status_and_body() {
    let router = Router::new().route(
        "/upload-resume/v2",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "internal error") }),
    );
    let base = spawn_server(router).await;

    let mut app = app_for(&base);
    app.upload.set_file(Some(sample_resume()));
    app.trigger();
    assert!(app.upload.is_loading);
    app.settle_analysis().await;

    assert!(!app.upload.is_loading);
    assert!(app.upload.result.is_none());
    let message = app.upload.error_message.as_deref().unwrap();
    assert!(message.contains("500"), "{}", message);
    assert!(message.contains("internal error"), "{}", message);
}

#[tokio::test]
async fn test_server_error_without_body() {
    let router = Router::new().route(
        "/upload-resume/v2",
        post(|| async { StatusCode::BAD_GATEWAY }),
    );
    let base = spawn_server(router).await;
    let client = client_for(&base);

    let mut upload = UploadState::default();
    upload.set_file(Some(sample_resume()));
    let request = upload.begin_analysis().unwrap();

    match client.analyze(&request).await {
        Err(AnalyzeError::Server { status, body }) => {
            assert_eq!(status, 502);
            assert!(body.is_none());
        }
        other => panic!("expected server error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_unparseable_success_body_is_a_parse_error() {
    let router = Router::new().route(
        "/upload-resume/v2",
        post(|| async { "<html>definitely not json</html>" }),
    );
    let base = spawn_server(router).await;

    let mut app = app_for(&base);
    app.upload.set_file(Some(sample_resume()));
    app.trigger();
    app.settle_analysis().await;

    assert!(!app.upload.is_loading);
    assert!(app.upload.result.is_none());
    assert!(app
        .upload
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Unexpected response"));
}

#[tokio::test]
async fn test_connection_failure_is_a_transport_error() {
    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = client_for(&base);
    let mut upload = UploadState::default();
    upload.set_file(Some(sample_resume()));
    let request = upload.begin_analysis().unwrap();

    let err = client.analyze(&request).await.unwrap_err();
    assert!(matches!(err, AnalyzeError::Transport(_)));
    assert!(!err.display_message().is_empty());

    upload.complete_analysis(request.request_id, Err(err));
    assert!(!upload.is_loading);
    assert!(upload.error_message.is_some());
    assert!(upload.result.is_none());
}

#[tokio::test]
async fn test_no_file_makes_no_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/upload-resume/v2",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({}))
            }
        }),
    );
    let base = spawn_server(router).await;

    let mut app = app_for(&base);
    app.trigger();
    app.settle_analysis().await;

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(!app.has_pending_analysis());
    assert_eq!(
        app.upload.error_message.as_deref(),
        Some("Please choose a resume PDF first.")
    );
}

#[tokio::test]
async fn test_failure_then_success_shows_only_second_outcome() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/upload-resume/v2",
        post(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    (StatusCode::SERVICE_UNAVAILABLE, "warming up").into_response()
                } else {
                    Json(json!({"ats_score": 91, "role_match_score": 80, "detected_skills": ["Python"]}))
                        .into_response()
                }
            }
        }),
    );
    let base = spawn_server(router).await;

    let mut app = app_for(&base);
    app.upload.set_file(Some(sample_resume()));

    app.trigger();
    app.settle_analysis().await;
    assert!(app.upload.error_message.as_deref().unwrap().contains("503"));

    app.trigger();
    assert!(app.upload.error_message.is_none());
    app.settle_analysis().await;

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(app.upload.error_message.is_none());
    let result = app.upload.result.as_ref().unwrap();
    assert_eq!(result.detected_skills, vec!["Python"]);
}

#[tokio::test]
async fn test_trigger_is_ignored_while_loading() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/upload-resume/v2",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({"ats_score": 50}))
            }
        }),
    );
    let base = spawn_server(router).await;

    let mut app = app_for(&base);
    app.upload.set_file(Some(sample_resume()));

    app.trigger();
    app.trigger();
    assert_eq!(app.upload.latest_request_id(), 1);
    app.settle_analysis().await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!app.upload.is_loading);
    assert!(app.upload.result.is_some());
}

#[tokio::test]
async fn test_health_check() {
    let router = Router::new().route("/", get(|| async { Json(json!({"status": "ok"})) }));
    let base = spawn_server(router).await;

    let status = client_for(&base).check_health().await.unwrap();
    assert_eq!(status, "ok");
}
