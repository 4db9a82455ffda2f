// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP boundary for the record service.
//!
//! Routes:
//! - POST   /items        - Create (JSON body)
//! - PUT    /items/{id}   - Update (JSON body)
//! - PUT    /items        - Update without an id in the path (id from body)
//! - DELETE /items/{id}   - Delete (query: correlationId, simulateFailure)
//! - DELETE /items        - Delete without an id in the path (id from query)
//! - GET    /items        - Read (query: id, correlationId)
//! - GET    /health       - Store health
//!
//! Errors are sent as `{"status", "message", "requestId"}` with the matching
//! status code. Write responses and every error produced by the service carry
//! an `x-request-id` header.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{CreateRequest, DeleteRequest, ReadRequest, UpdateRequest, WriteOutcome};
use crate::error::ErrorPayload;
use crate::service::RecordService;

/// Header carrying the id of the request that produced a response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

type AppState = Arc<RecordService>;

/// Build the router over a shared service.
pub fn router(service: Arc<RecordService>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/items",
            post(handle_create)
                .put(handle_update_without_id)
                .delete(handle_delete_without_id)
                .get(handle_read),
        )
        .route(
            "/items/{id}",
            axum::routing::put(handle_update).delete(handle_delete),
        )
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve<F>(
    addr: SocketAddr,
    service: Arc<RecordService>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, service, shutdown).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_listener<F>(
    listener: TcpListener,
    service: Arc<RecordService>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Construct a JSON error response that did not come from a service call.
fn json_error(status: StatusCode, message: &str) -> Response {
    let payload = ErrorPayload {
        status: status.as_u16(),
        message: message.to_string(),
        request_id: String::new(),
    };
    (status, Json(payload)).into_response()
}

fn error_response(payload: ErrorPayload) -> Response {
    let status =
        StatusCode::from_u16(payload.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let request_id = payload.request_id.clone();
    with_request_id((status, Json(payload)).into_response(), &request_id)
}

fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if !request_id.is_empty()
        && let Ok(value) = HeaderValue::from_str(request_id)
    {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn write_response(outcome: WriteOutcome) -> Response {
    let request_id = outcome.request_id.clone();
    match outcome.into_result() {
        Ok(body) => with_request_id((StatusCode::OK, Json(body)).into_response(), &request_id),
        Err(payload) => error_response(payload),
    }
}

/// Fallback handler for unmatched routes.
async fn handle_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
async fn handle_health(State(service): State<AppState>) -> Response {
    if service.health().await {
        (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "unavailable"})),
        )
            .into_response()
    }
}

/// POST /items
async fn handle_create(
    State(service): State<AppState>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    write_response(service.create(request).await)
}

/// PUT /items/{id}
async fn handle_update(
    State(service): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Response {
    let Json(mut request) = match body {
        Ok(body) => body,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    request.id = Some(id);

    write_response(service.update(request).await)
}

/// PUT /items
async fn handle_update_without_id(
    State(service): State<AppState>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    write_response(service.update(request).await)
}

/// DELETE /items/{id}
async fn handle_delete(
    State(service): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<DeleteRequest>, QueryRejection>,
) -> Response {
    let Query(mut request) = match query {
        Ok(query) => query,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    request.id = Some(id);

    delete_response(&service, request).await
}

/// DELETE /items
async fn handle_delete_without_id(
    State(service): State<AppState>,
    query: Result<Query<DeleteRequest>, QueryRejection>,
) -> Response {
    let Query(request) = match query {
        Ok(query) => query,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    delete_response(&service, request).await
}

async fn delete_response(service: &RecordService, request: DeleteRequest) -> Response {
    match service.delete(request).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(payload) => error_response(payload),
    }
}

/// GET /items
async fn handle_read(
    State(service): State<AppState>,
    query: Result<Query<ReadRequest>, QueryRejection>,
) -> Response {
    let Query(request) = match query {
        Ok(query) => query,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    match service.read(request).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(payload) => error_response(payload),
    }
}
