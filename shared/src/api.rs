//! The remote report/case service: request construction and response
//! decoding.
//!
//! Everything here is pure. An [`ApiRequest`] becomes either a `crux_http`
//! request (the core) or a protocol request sent straight through a
//! transport (the shell's `ApiClient`); replies from both paths normalise to
//! a [`Reply`] before decoding.

use std::time::Duration;

use crux_http::http::{mime, Method};
use crux_http::protocol;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::capabilities::{validate_header_value, HttpError, HttpOutput, ValidatedUrl};
use crate::model::{Case, CaseId, Report, ReportId};
use crate::{LINK_TIMEOUT, LIST_TIMEOUT};

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ApiError {
    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Decode(String),

    #[error("Failed: {status} {body}")]
    Link { status: u16, body: String },

    #[error("{0}")]
    InvalidArgument(String),
}

impl ApiError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "NETWORK_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Link { .. } => "LINK_ERROR",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Link { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

impl From<crux_http::Error> for ApiError {
    fn from(e: crux_http::Error) -> Self {
        match e {
            crux_http::Error::Timeout => Self::Network("request timed out".into()),
            crux_http::Error::Io(message) => Self::Network(message),
            crux_http::Error::Url(message) => Self::InvalidArgument(message),
            crux_http::Error::Json(message) => Self::Decode(message),
            e @ crux_http::Error::Http(_) => Self::Network(e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Where the service lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: Url,
    api_key: SecretString,
}

impl ApiConfig {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> ApiResult<Self> {
        let base_url = ValidatedUrl::new(base_url.trim())?.into_url();

        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidArgument(format!(
                "base URL cannot carry paths: {base_url}"
            )));
        }

        let api_key = api_key.into();
        validate_header_value(API_KEY_HEADER, &api_key)?;

        Ok(Self {
            base_url,
            api_key: SecretString::new(api_key),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// `{base}/{segments...}`, tolerating a trailing slash on the base and
    /// percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidArgument("base URL cannot carry paths".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// One call against the service, before it is bound to a way of sending it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub form: Option<String>,
    pub authenticated: bool,
}

impl ApiRequest {
    fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            form: None,
            authenticated: false,
        }
    }

    /// A `crux_http` request, ready for `send`.
    pub fn into_builder<Ev: 'static>(
        self,
        config: &ApiConfig,
        http: &crux_http::Http<Ev>,
    ) -> crux_http::RequestBuilder<Ev> {
        let mut builder = http.request(self.method, self.url);
        if self.authenticated {
            builder = builder.header(API_KEY_HEADER, config.api_key());
        }
        if let Some(form) = self.form {
            builder = builder.body_string(form).content_type(mime::FORM);
        }
        builder
    }

    /// The same request in the shell protocol, for sending without a core.
    #[must_use]
    pub fn into_protocol(self, config: &ApiConfig) -> protocol::HttpRequest {
        let mut headers = Vec::new();
        if self.authenticated {
            headers.push(protocol::HttpHeader {
                name: API_KEY_HEADER.to_string(),
                value: config.api_key().to_string(),
            });
        }
        if self.form.is_some() {
            headers.push(protocol::HttpHeader {
                name: "content-type".to_string(),
                value: mime::FORM.to_string(),
            });
        }

        protocol::HttpRequest {
            method: self.method.to_string(),
            url: self.url.to_string(),
            headers,
            body: self.form.map(String::into_bytes).unwrap_or_default(),
        }
    }
}

/// How long a request may take, by method: the link call is the only POST.
#[must_use]
pub fn timeout_for(method: &str) -> Duration {
    if method.eq_ignore_ascii_case("POST") {
        LINK_TIMEOUT
    } else {
        LIST_TIMEOUT
    }
}

pub fn list_reports_request(config: &ApiConfig, limit: usize) -> ApiResult<ApiRequest> {
    let mut url = config.endpoint(&["reports"])?;
    url.query_pairs_mut().append_pair("limit", &limit.to_string());
    Ok(ApiRequest::get(url))
}

pub fn list_cases_request(config: &ApiConfig) -> ApiResult<ApiRequest> {
    Ok(ApiRequest::get(config.endpoint(&["cases"])?))
}

pub fn link_report_request(
    config: &ApiConfig,
    report_id: &ReportId,
    case_id: &CaseId,
) -> ApiResult<ApiRequest> {
    if report_id.is_empty() {
        return Err(ApiError::InvalidArgument("report id must not be empty".into()));
    }
    if case_id.is_empty() {
        return Err(ApiError::InvalidArgument("case id must not be empty".into()));
    }

    let url = config.endpoint(&["reports", report_id.as_str(), "link_case"])?;
    let form = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("case_id", case_id.as_str())
        .finish();

    Ok(ApiRequest {
        method: Method::Post,
        url,
        form: Some(form),
        authenticated: true,
    })
}

/// A response that made it back from the service, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    /// `crux_http` reports 4xx/5xx as errors; those still carry a status and
    /// body and come back as a `Reply` here.
    pub fn from_output(output: HttpOutput) -> ApiResult<Self> {
        match output {
            Ok(mut response) => Ok(Self {
                status: response.status().into(),
                body: response.take_body().unwrap_or_default(),
            }),
            Err(crux_http::Error::Http(e)) => Ok(Self {
                status: e.code.into(),
                body: e.body.unwrap_or_default(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_protocol(result: protocol::HttpResult) -> ApiResult<Self> {
        match result {
            protocol::HttpResult::Ok(response) => Ok(Self {
                status: response.status,
                body: response.body,
            }),
            protocol::HttpResult::Err(e) => Err(e.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8 rather than failing; used for
    /// error messages where some text beats none.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn json<T: serde::de::DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::Decode(format!("failed to parse JSON: {e}")))
    }
}

fn decode_listing<T: serde::de::DeserializeOwned>(reply: &Reply) -> ApiResult<Vec<T>> {
    if !reply.is_success() {
        return Err(ApiError::Network(format!(
            "HTTP {} {}",
            reply.status,
            reply.body_text()
        )));
    }
    reply.json()
}

pub fn decode_reports(reply: &Reply) -> ApiResult<Vec<Report>> {
    decode_listing(reply)
}

pub fn decode_cases(reply: &Reply) -> ApiResult<Vec<Case>> {
    decode_listing(reply)
}

pub fn decode_link(reply: &Reply) -> ApiResult<Report> {
    if !reply.is_success() {
        return Err(ApiError::Link {
            status: reply.status,
            body: reply.body_text(),
        });
    }
    reply.json()
}
