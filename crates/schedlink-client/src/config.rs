//! schedlink.toml configuration.
//!
//! ```toml
//! [scheduler]
//! address = "http://10.0.0.5:4646"
//!
//! [transport]
//! request_timeout = "30s"
//! user_agent = "control-plane/1.4"
//! ```
//!
//! Every key is optional. Environment variables `SCHEDLINK_ADDRESS` and
//! `SCHEDLINK_REQUEST_TIMEOUT` override the file when applied through
//! [`ClientConfig::with_env_overrides`].

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::address::ApiBase;
use crate::transport::HyperTransport;

pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:4646";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub scheduler: SchedulerConfig,
    pub transport: TransportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Scheduler root, without the `/v1` suffix.
    pub address: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Whole-exchange timeout, e.g. "500ms", "30s", "1m". Unset means none.
    pub request_timeout: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `SCHEDLINK_*` overrides read through `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(address) = lookup("SCHEDLINK_ADDRESS").filter(|s| !s.is_empty()) {
            self.scheduler.address = address;
        }
        if let Some(timeout) = lookup("SCHEDLINK_REQUEST_TIMEOUT").filter(|s| !s.is_empty()) {
            self.transport.request_timeout = Some(timeout);
        }
        self
    }

    pub fn base(&self) -> anyhow::Result<ApiBase> {
        Ok(ApiBase::parse(&self.scheduler.address)?)
    }

    pub fn request_timeout(&self) -> anyhow::Result<Option<Duration>> {
        self.transport
            .request_timeout
            .as_deref()
            .map(|raw| {
                parse_duration(raw)
                    .ok_or_else(|| anyhow::anyhow!("invalid request_timeout {raw:?}"))
            })
            .transpose()
    }

    /// Default transport configured from the `[transport]` section.
    pub fn build_transport(&self) -> anyhow::Result<HyperTransport> {
        let mut transport = HyperTransport::new();
        if let Some(user_agent) = &self.transport.user_agent {
            transport = transport.with_user_agent(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout()? {
            transport = transport.with_request_timeout(timeout);
        }
        Ok(transport)
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
