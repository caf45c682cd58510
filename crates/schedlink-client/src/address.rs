//! API base addresses.
//!
//! The scheduler is addressed through its `/v1` root. Node-local endpoints
//! live under the same root on each node; a node only advertises
//! `host[:port]`, so a node base is the scheduler base with the authority
//! swapped out.

use std::fmt;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid scheduler address {address:?}: {reason}")]
    InvalidBase { address: String, reason: String },

    #[error("invalid port {port:?} in node address {address:?}")]
    InvalidPort { address: String, port: String },

    #[error("invalid host in node address {address:?}")]
    InvalidHost { address: String },
}

/// A node's advertised `host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress {
    pub host: String,
    pub port: Option<u16>,
}

impl NodeAddress {
    /// Split `raw` on its first colon.
    ///
    /// An empty string yields `None` (nothing to override). A port segment
    /// that is not a valid `u16` is an error rather than a silent default.
    pub fn parse(raw: &str) -> Result<Option<Self>, AddressError> {
        if raw.is_empty() {
            return Ok(None);
        }
        let (host, port) = match raw.split_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| AddressError::InvalidPort {
                    address: raw.to_string(),
                    port: port.to_string(),
                })?;
                (host, Some(port))
            }
            None => (raw, None),
        };
        Ok(Some(Self {
            host: host.to_string(),
            port,
        }))
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{port}", self.host),
            None => f.write_str(&self.host),
        }
    }
}

/// The `/v1` root of a scheduler or node API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    root: Url,
}

impl ApiBase {
    /// Parse a scheduler root such as `http://10.0.0.5:4646` and append `/v1`.
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let invalid = |reason: String| AddressError::InvalidBase {
            address: address.to_string(),
            reason,
        };

        let mut root = Url::parse(address.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(root.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", root.scheme())));
        }
        if root.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        root.set_query(None);
        root.set_fragment(None);
        root.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .push("v1");

        Ok(Self { root })
    }

    pub fn as_url(&self) -> &Url {
        &self.root
    }

    pub fn host(&self) -> Option<&str> {
        self.root.host_str()
    }

    /// Port in effect, including the scheme default.
    pub fn port(&self) -> Option<u16> {
        self.root.port_or_known_default()
    }

    /// Same root with the node's host, and its port when it advertises one.
    pub fn with_node_address(&self, node: &NodeAddress) -> Result<Self, AddressError> {
        let invalid_host = || AddressError::InvalidHost {
            address: node.to_string(),
        };

        let mut root = self.root.clone();
        root.set_host(Some(&node.host)).map_err(|_| invalid_host())?;
        if let Some(port) = node.port {
            root.set_port(Some(port)).map_err(|_| invalid_host())?;
        }
        Ok(Self { root })
    }

    /// URL of `segments` below the root. Each segment is percent-encoded.
    pub fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.root.clone();
        // Bases are validated in `parse`, so the root always has a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root.as_str())
    }
}
