//! Helpers for driving the router in-process.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pastebin_lite::clock::TEST_NOW_HEADER;
use pastebin_lite::commands::serve::{service, AppService};
use pastebin_lite::config::{Config, StorageKind};
use pastebin_lite::storage::{AnyStorage, MemoryStorage};
use pastebin_lite::App;
use serde_json::Value;
use std::future::Future;
use tower::ServiceExt;

pub const HOST: &str = "paste.test:3000";

pub fn app_with(storage: AnyStorage, test_mode: bool) -> AppService {
    let mut config = Config {
        test_mode,
        ..Config::default()
    };
    config.storage.kind = match storage {
        AnyStorage::Memory(_) => StorageKind::Memory,
        AnyStorage::Sql(_) => StorageKind::Sql,
    };
    service(App { config, storage })
}

/// In-memory router with the time header enabled.
pub fn test_app() -> AppService {
    app_with(MemoryStorage::default().into(), true)
}

pub fn send(
    app: &AppService,
    request: Request<Body>,
) -> impl Future<Output = (StatusCode, String)> + Send + 'static {
    let app = app.clone();
    async move {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

pub async fn post_json(app: &AppService, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/pastes")
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, text) = send(app, request).await;
    (status, serde_json::from_str(&text).unwrap())
}

pub async fn create(app: &AppService, body: Value) -> String {
    let (status, created) = post_json(app, body).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    created["id"].as_str().unwrap().to_owned()
}

fn get_request(uri: &str, now: Option<i64>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).header(header::HOST, HOST);
    if let Some(now) = now {
        builder = builder.header(TEST_NOW_HEADER, now.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

pub fn fetch_json(
    app: &AppService,
    id: &str,
    now: Option<i64>,
) -> impl Future<Output = (StatusCode, Value)> + Send + 'static {
    let response = send(app, get_request(&format!("/api/pastes/{id}"), now));
    async move {
        let (status, text) = response.await;
        (status, serde_json::from_str(&text).unwrap())
    }
}

pub async fn fetch_page(app: &AppService, id: &str, now: Option<i64>) -> (StatusCode, String) {
    send(app, get_request(&format!("/p/{id}"), now)).await
}

pub async fn get(app: &AppService, uri: &str) -> (StatusCode, String) {
    send(app, get_request(uri, None)).await
}

pub fn millis(iso: &Value) -> i64 {
    chrono::DateTime::parse_from_rfc3339(iso.as_str().unwrap())
        .unwrap()
        .timestamp_millis()
}
