use async_trait::async_trait;
use crux_http::protocol::{HttpHeader, HttpRequest, HttpResponse, HttpResult};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::api;

/// Executes `crux_http` protocol requests for the shell.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> HttpResult;
}

/// `reqwest`-backed transport used by the terminal shell.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reports-panel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    async fn send(&self, request: &HttpRequest, request_id: Uuid) -> crux_http::Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| crux_http::Error::Url(format!("invalid method {}: {e}", request.method)))?;

        let mut builder = self
            .client
            .request(method, request.url.as_str())
            .timeout(api::timeout_for(&request.method));

        for header in &request.headers {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }

        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        debug!(%request_id, method = %request.method, url = %request.url, "sending request");

        let response = builder.send().await.map_err(|e| map_error(&e))?;

        let status = response.status().as_u16();
        if crux_http::http::StatusCode::try_from(status).is_err() {
            return Err(crux_http::Error::Io(format!("unsupported HTTP status {status}")));
        }

        let headers = response_headers(response.headers());
        let body = response.bytes().await.map_err(|e| map_error(&e))?;

        debug!(%request_id, status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> HttpResult {
        let request_id = Uuid::new_v4();
        match self.send(&request, request_id).await {
            Ok(response) => HttpResult::Ok(response),
            Err(e) => {
                debug!(%request_id, error = %e, "request failed");
                HttpResult::Err(e)
            }
        }
    }
}

fn map_error(error: &reqwest::Error) -> crux_http::Error {
    if error.is_timeout() {
        crux_http::Error::Timeout
    } else if error.is_builder() {
        crux_http::Error::Url(error_chain(error))
    } else {
        crux_http::Error::Io(error_chain(error))
    }
}

/// Response headers as the server sent them, duplicates and framing
/// headers included. Values that are not ASCII cannot be rebuilt on the core
/// side and are left out.
fn response_headers(headers: &reqwest::header::HeaderMap) -> Vec<HttpHeader> {
    headers
        .iter()
        .filter_map(|(name, value)| match value.to_str() {
            Ok(value) => Some(HttpHeader {
                name: name.as_str().to_string(),
                value: value.to_string(),
            }),
            Err(_) => {
                trace!(header = name.as_str(), "skipping non-ASCII response header");
                None
            }
        })
        .collect()
}

/// `reqwest` hides the interesting part (refused, DNS, TLS) in the source
/// chain; flatten it into one line.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
