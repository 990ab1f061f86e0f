//! Request-side checks in front of `crux_http`.
//!
//! `crux_http` parses URLs and header values with `unwrap`, so anything that
//! reaches a `RequestBuilder` is validated here first.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// What the `Http` capability hands back for a request whose body was read
/// into memory.
pub type HttpOutput = crux_http::Result<crux_http::Response<Vec<u8>>>;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_HEADER_VALUE_LENGTH: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedUrl {
    url: Url,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let url = url.into();
        Ok(Self {
            url: Self::validate(&url)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn into_url(self) -> Url {
        self.url
    }

    fn validate(url: &str) -> Result<Url, HttpError> {
        if url.trim().is_empty() {
            return Err(HttpError::InvalidUrl {
                url: url.to_string(),
                reason: "URL cannot be empty".to_string(),
            });
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
            url: Self::truncate_url(url),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!(
                    "invalid scheme '{scheme}', only 'http' and 'https' are allowed"
                ),
            });
        }

        if parsed.host_str().is_none() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "URL must have a host".to_string(),
            });
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "credentials in URL are not allowed".to_string(),
            });
        }

        Ok(parsed)
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            return url.to_string();
        }
        let mut end = 100;
        while !url.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &url[..end])
    }
}

impl std::fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks a value before it goes into a request header. Only visible ASCII
/// and spaces pass; `http-types` panics on anything else.
pub fn validate_header_value(name: &str, value: &str) -> Result<(), HttpError> {
    if value.len() > MAX_HEADER_VALUE_LENGTH {
        return Err(HttpError::InvalidHeader {
            name: name.to_string(),
            reason: format!(
                "header value exceeds maximum length of {MAX_HEADER_VALUE_LENGTH} bytes"
            ),
        });
    }

    if value.chars().any(|c| c == '\r' || c == '\n' || c == '\0') {
        return Err(HttpError::InvalidHeader {
            name: name.to_string(),
            reason: "header value contains invalid characters (CR, LF, or NULL)".to_string(),
        });
    }

    if !value.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) {
        return Err(HttpError::InvalidHeader {
            name: name.to_string(),
            reason: "header value must be printable ASCII".to_string(),
        });
    }

    Ok(())
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
}
