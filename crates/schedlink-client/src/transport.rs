//! HTTP transport seam.
//!
//! The clients only ever issue GET requests and need the full response back
//! (status, headers, body). [`Transport`] is that contract; anything able to
//! fulfil it can be injected. [`HyperTransport`] is the default: one plain
//! HTTP/1 connection per request, driven by hyper on the tokio runtime.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, HOST, USER_AGENT};
use http::Method;
use http_body_util::{BodyExt, Empty};
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::debug;
use url::{Host, Position, Url};

use crate::error::RawResponse;

pub const ACCEPT_JSON: &str = "application/json";
pub const ACCEPT_TEXT: &str = "text/plain";

/// A body-less GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    pub url: Url,
    pub accept: &'static str,
}

impl GetRequest {
    pub fn json(url: Url) -> Self {
        Self {
            url,
            accept: ACCEPT_JSON,
        }
    }

    pub fn text(url: Url) -> Self {
        Self {
            url,
            accept: ACCEPT_TEXT,
        }
    }
}

/// Errors raised by a transport while performing one exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The target could not be connected to. The only variant callers see as
    /// `ApiError::Unreachable`.
    #[error("connection to {address} failed: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported URL scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(Url),

    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    #[error("HTTP exchange failed: {0}")]
    Http(#[from] hyper::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl TransportError {
    pub fn is_connect(&self) -> bool {
        matches!(self, TransportError::Connect { .. })
    }
}

/// Performs GET exchanges on behalf of the clients.
///
/// Implementations must be cancel-safe: dropping the returned future aborts
/// the in-flight request.
pub trait Transport: Send + Sync + 'static {
    fn get(
        &self,
        request: GetRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Default transport: plain HTTP/1 over a fresh TCP connection per request.
#[derive(Debug, Clone)]
pub struct HyperTransport {
    user_agent: String,
    request_timeout: Option<Duration>,
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            user_agent: concat!("schedlink/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Bound the whole exchange (connect, request, body). Unset by default.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    async fn exchange(&self, request: GetRequest) -> Result<RawResponse, TransportError> {
        let url = request.url;
        if url.scheme() != "http" {
            return Err(TransportError::UnsupportedScheme(url.scheme().to_string()));
        }
        let port = url.port_or_known_default().unwrap_or(80);
        let authority = match url.port() {
            Some(p) => format!("{}:{p}", url.host_str().unwrap_or_default()),
            None => url.host_str().unwrap_or_default().to_string(),
        };

        let connected = match url.host() {
            Some(Host::Domain(domain)) => TcpStream::connect((domain, port)).await,
            Some(Host::Ipv4(ip)) => TcpStream::connect((ip, port)).await,
            Some(Host::Ipv6(ip)) => TcpStream::connect((ip, port)).await,
            None => return Err(TransportError::MissingHost(url)),
        };
        let stream = connected.map_err(|source| {
            debug!(error = %source, %url, "connection failed");
            TransportError::Connect {
                address: authority.clone(),
                source,
            }
        })?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

        // Drive the connection in the background; it ends once `sender` drops.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "connection closed with error");
            }
        });

        let req = http::Request::builder()
            .method(Method::GET)
            .uri(&url[Position::BeforePath..])
            .header(HOST, authority.as_str())
            .header(ACCEPT, request.accept)
            .header(USER_AGENT, self.user_agent.as_str())
            .body(Empty::<Bytes>::new())?;

        let (parts, body) = sender.send_request(req).await?.into_parts();
        let body = body.collect().await?.to_bytes();

        Ok(RawResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

impl Transport for HyperTransport {
    async fn get(&self, request: GetRequest) -> Result<RawResponse, TransportError> {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(request))
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => self.exchange(request).await,
        }
    }
}
