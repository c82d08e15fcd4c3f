use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router, ServiceExt};
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::controllers::paste;
use crate::error::PageError;
use crate::storage::AnyStorage;
use crate::types::api::{CreatePasteBody, CreatedPaste, Health, PasteContent};
use crate::{clock, pages, App};

pub async fn run(app: App) -> anyhow::Result<()> {
    let addr = SocketAddr::from((app.config.address, app.config.port));
    info!("listening on http://{addr}");

    axum::Server::bind(&addr)
        .serve(ServiceExt::<Request<Body>>::into_make_service(service(app)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// The router behind trailing-slash normalization, so `/p/<id>/` resolves like `/p/<id>`.
pub type AppService = NormalizePath<Router>;

pub fn service(app: App) -> AppService {
    // routing happens inside the router, so the path has to be rewritten before it
    NormalizePath::trim_trailing_slash(router(app))
}

/// All routes, with CORS open to any origin.
pub fn router(app: App) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/healthz", get(healthz))
        .route("/api/pastes", post(create_paste))
        .route("/api/pastes/:id", get(get_paste))
        .route("/p/:id", get(view_paste))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}

async fn index() -> Html<&'static str> {
    Html(pages::INDEX)
}

async fn healthz(State(storage): State<AnyStorage>) -> impl IntoResponse {
    let ok = paste::health(&storage).await;
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(Health { ok }))
}

async fn create_paste(
    State(config): State<Config>,
    State(storage): State<AnyStorage>,
    headers: HeaderMap,
    body: CreatePasteBody,
) -> crate::ApiResult<impl IntoResponse> {
    let new = body.into_new_paste()?;
    // creation always uses the wall clock, even in test mode
    let paste = paste::create(&storage, new, clock::wall_clock_ms()).await?;

    let url = format!("{}/p/{}", base_url(&config, &headers), paste.id);
    Ok((StatusCode::CREATED, Json(CreatedPaste { id: paste.id, url })))
}

async fn get_paste(
    State(config): State<Config>,
    State(storage): State<AnyStorage>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> crate::ApiResult<Json<PasteContent>> {
    let now = clock::request_now(&headers, config.test_mode);
    let fetched = paste::fetch(&storage, &id, now).await?;
    Ok(Json(fetched.into()))
}

async fn view_paste(
    State(config): State<Config>,
    State(storage): State<AnyStorage>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Html<String>, PageError> {
    let now = clock::request_now(&headers, config.test_mode);
    let fetched = paste::fetch(&storage, &id, now).await?;
    Ok(Html(pages::paste_page(&fetched.content)))
}

/// Base for absolute paste URLs: the configured one, else the request's host.
fn base_url(config: &Config, headers: &HeaderMap) -> String {
    if let Some(base_url) = &config.base_url {
        return base_url.trim_end_matches('/').to_owned();
    }
    match headers.get(header::HOST).and_then(|host| host.to_str().ok()) {
        Some(host) => format!("http://{host}"),
        None => format!("http://{}:{}", config.address, config.port),
    }
}
