// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP backend for a remote colour-core server.

use async_trait::async_trait;
use colour_core::api::{
    CreateRequest, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse, UpdateRequest,
    WriteResponse,
};
use colour_core::error::ErrorPayload;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::RecordApi;
use crate::error::{Result, WorkflowError};

/// Header carrying the id of the request that produced a response.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP backend for record service calls.
///
/// Non-2xx responses are decoded as [`ErrorPayload`]; transport failures
/// become an internal (500) payload with an empty request id.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend for the server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| WorkflowError::Backend(format!("failed to build HTTP client: {}", e)))?;
        Self::with_client(client, base_url)
    }

    /// Create a backend using a preconfigured client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| WorkflowError::Config(format!("invalid API URL {:?}: {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(WorkflowError::Config(format!(
                "invalid API URL {:?}: not a base URL",
                base_url.as_str()
            )));
        }

        Ok(Self { client, base_url })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/items` or `{base}/items/{id}`, with the id percent-encoded.
    fn items_url(&self, id: Option<&str>) -> std::result::Result<Url, ErrorPayload> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ErrorPayload::internal("API URL cannot carry a path"))?;
            segments.pop_if_empty().push("items");
            if let Some(id) = id.filter(|id| !id.is_empty()) {
                segments.push(id);
            }
        }
        Ok(url)
    }
}

fn transport_error(operation: &str, err: reqwest::Error) -> ErrorPayload {
    warn!(operation = operation, error = %err, "HTTP request failed");
    ErrorPayload::internal(format!("{} request failed: {}", operation, err))
}

async fn decode<T: DeserializeOwned>(
    operation: &str,
    response: Response,
) -> std::result::Result<T, ErrorPayload> {
    let status = response.status();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = response
        .text()
        .await
        .map_err(|e| transport_error(operation, e))?;

    if status.is_success() {
        debug!(operation = operation, status = status.as_u16(), "HTTP call succeeded");
        return serde_json::from_str(&body).map_err(|e| {
            ErrorPayload::internal(format!("failed to parse {} response: {}", operation, e))
        });
    }

    match serde_json::from_str::<ErrorPayload>(&body) {
        Ok(mut payload) => {
            if payload.request_id.is_empty() {
                payload.request_id = request_id;
            }
            Err(payload)
        }
        Err(_) => Err(ErrorPayload {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
            request_id,
        }),
    }
}

#[async_trait]
impl RecordApi for HttpBackend {
    async fn create(
        &self,
        request: CreateRequest,
    ) -> std::result::Result<WriteResponse, ErrorPayload> {
        let response = self
            .client
            .post(self.items_url(None)?)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("create", e))?;

        decode("create", response).await
    }

    async fn update(
        &self,
        request: UpdateRequest,
    ) -> std::result::Result<WriteResponse, ErrorPayload> {
        let response = self
            .client
            .put(self.items_url(request.id.as_deref())?)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("update", e))?;

        decode("update", response).await
    }

    async fn delete(
        &self,
        request: DeleteRequest,
    ) -> std::result::Result<DeleteResponse, ErrorPayload> {
        let url = self.items_url(request.id.as_deref())?;
        let query = DeleteRequest {
            id: None,
            ..request
        };

        let response = self
            .client
            .delete(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| transport_error("delete", e))?;

        decode("delete", response).await
    }

    async fn read(&self, request: ReadRequest) -> std::result::Result<ReadResponse, ErrorPayload> {
        let response = self
            .client
            .get(self.items_url(None)?)
            .query(&request)
            .send()
            .await
            .map_err(|e| transport_error("read", e))?;

        decode("read", response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_url() {
        let backend = HttpBackend::new("http://localhost:8080/").unwrap();
        assert_eq!(
            backend.items_url(None).unwrap().as_str(),
            "http://localhost:8080/items"
        );
        assert_eq!(
            backend.items_url(Some("a b")).unwrap().as_str(),
            "http://localhost:8080/items/a%20b"
        );
        assert_eq!(
            backend.items_url(Some("")).unwrap().as_str(),
            "http://localhost:8080/items"
        );
    }

    #[test]
    fn test_items_url_keeps_base_path() {
        let backend = HttpBackend::new("http://localhost:8080/api/v1").unwrap();
        assert_eq!(
            backend.items_url(Some("x")).unwrap().as_str(),
            "http://localhost:8080/api/v1/items/x"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(WorkflowError::Config(_))
        ));
        assert!(matches!(
            HttpBackend::new("mailto:someone@example.com"),
            Err(WorkflowError::Config(_))
        ));
    }
}
