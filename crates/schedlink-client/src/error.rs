//! Error taxonomy for scheduler API calls.
//!
//! Two layers:
//!
//! - [`ApiError`] is the closed set of outcomes a caller is expected to branch
//!   on: the entity is gone, the host is down, or the API answered with
//!   something we did not expect.
//! - [`ClientError`] is a fault in the client or its environment (a broken
//!   transport, an undecodable body, a cancelled call). It is never folded
//!   into `ApiError` and propagates with `?`.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use thiserror::Error;

use crate::transport::TransportError;

/// Longest body excerpt included in `Display` and log output.
const BODY_PREVIEW_LEN: usize = 512;

/// A complete HTTP response as received from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body text truncated for diagnostics.
    pub fn body_preview(&self) -> String {
        let text = self.body_text();
        match text.char_indices().nth(BODY_PREVIEW_LEN) {
            Some((cut, _)) => format!("{}…", &text[..cut]),
            None => text.into_owned(),
        }
    }
}

/// Classified outcome of a non-successful API call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The entity does not exist, or its state is too ambiguous to report.
    #[error("not found")]
    NotFound,

    /// The target host could not be connected to.
    #[error("host unreachable")]
    Unreachable,

    /// Any other non-success response. Indicates an API contract violation.
    #[error("unexpected response (status {}): {}", .0.status, .0.body_preview())]
    Unexpected(RawResponse),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable)
    }

    /// Status of the offending response, for `Unexpected` only.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unexpected(response) => Some(response.status),
            _ => None,
        }
    }
}

/// A fault in the client or its environment rather than an API outcome.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to decode {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("call cancelled")]
    Cancelled,
}
