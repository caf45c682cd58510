//! Scheduler records as returned by the HTTP API.
//!
//! Only the fields the control plane consumes are modelled; everything else
//! in the scheduler's JSON is ignored on deserialization. Field names follow
//! the scheduler's PascalCase wire format.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::id::{AllocationId, JobId, NodeId};

// ── Job ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Job {
    #[serde(rename = "ID")]
    pub id: JobId,
    pub name: String,
    /// Scheduler type: "service", "batch", "system", ...
    #[serde(rename = "Type", default)]
    pub job_type: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub datacenters: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Dead,
    #[default]
    #[serde(other)]
    Unknown,
}

// ── Allocation ────────────────────────────────────────────────────

/// A job's task group placed on one node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Allocation {
    #[serde(rename = "ID")]
    pub id: AllocationId,
    #[serde(rename = "JobID")]
    pub job_id: JobId,
    #[serde(rename = "NodeID", default)]
    pub node_id: Option<NodeId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub task_group: String,
    #[serde(default)]
    pub client_status: ClientStatus,
    #[serde(default)]
    pub desired_status: DesiredStatus,
}

/// Allocation state as reported by the node running it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Pending,
    Running,
    Complete,
    Failed,
    Lost,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Allocation state the scheduler is driving towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredStatus {
    Run,
    Stop,
    Evict,
    #[default]
    #[serde(other)]
    Unknown,
}

// ── Node ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    #[serde(rename = "ID")]
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub datacenter: String,
    #[serde(default)]
    pub status: String,
    /// Advertised address of the node-local API: `host` or `host:port`,
    /// no scheme. May be empty.
    #[serde(rename = "HTTPAddr", default)]
    pub http_addr: String,
}

// ── Allocation stats ──────────────────────────────────────────────

/// Point-in-time resource usage of one allocation, served by its node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AllocationStats {
    pub resource_usage: ResourceUsage,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: HashMap<String, TaskResourceUsage>,
    /// Unix timestamp in nanoseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TaskResourceUsage {
    pub resource_usage: ResourceUsage,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceUsage {
    #[serde(default)]
    pub memory_stats: MemoryStats,
    #[serde(default)]
    pub cpu_stats: CpuStats,
}

/// Memory figures in bytes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MemoryStats {
    #[serde(rename = "RSS", default)]
    pub rss: u64,
    #[serde(default)]
    pub cache: u64,
    #[serde(default)]
    pub swap: u64,
    #[serde(default)]
    pub usage: u64,
    #[serde(default)]
    pub max_usage: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CpuStats {
    #[serde(default)]
    pub system_mode: f64,
    #[serde(default)]
    pub user_mode: f64,
    #[serde(default)]
    pub total_ticks: f64,
    #[serde(default)]
    pub throttled_periods: u64,
    #[serde(default)]
    pub throttled_time: u64,
    #[serde(default)]
    pub percent: f64,
}

// ── Logs ──────────────────────────────────────────────────────────

/// Which output stream of a task to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    /// Wire value of the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStream::Stdout => "stdout",
            LogStream::Stderr => "stderr",
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogStream {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogStream::Stdout),
            "stderr" => Ok(LogStream::Stderr),
            other => Err(format!("unknown log stream: {other}")),
        }
    }
}

/// Snapshot of one task log stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskLog {
    pub stream: LogStream,
    pub contents: Bytes,
}

impl TaskLog {
    pub fn new(stream: LogStream, contents: impl Into<Bytes>) -> Self {
        Self {
            stream,
            contents: contents.into(),
        }
    }

    /// Contents decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }
}

// ── Listings ──────────────────────────────────────────────────────

/// A listing result paired with the identifier it was queried by.
#[derive(Debug, Clone, PartialEq)]
pub struct WithId<I, T> {
    pub id: I,
    pub value: T,
}

impl<I, T> WithId<I, T> {
    pub fn new(id: I, value: T) -> Self {
        Self { id, value }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WithId<I, U> {
        WithId {
            id: self.id,
            value: f(self.value),
        }
    }

    pub fn into_parts(self) -> (I, T) {
        (self.id, self.value)
    }
}

/// The scheduler emits `null` for empty maps and unset references.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
