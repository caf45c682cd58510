//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use http::StatusCode;
use schedlink_client::{
    ApiBase, ClusterClient, GetRequest, RawResponse, Transport, TransportError,
};

pub const SCHEDULER: &str = "http://scheduler.internal:4646";

/// Transport that replays canned outcomes in order and records requests.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<GetRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: StatusCode, body: impl Into<bytes::Bytes>) -> &Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::new(status, body)));
        self
    }

    pub fn refuse(&self) -> &Self {
        self.fail(TransportError::Connect {
            address: "10.0.0.1:4646".to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        })
    }

    pub fn fail(&self, err: TransportError) -> &Self {
        self.outcomes.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<GetRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_url(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.url.to_string())
            .unwrap_or_default()
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, request: GetRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted outcome left")
    }
}

pub fn cluster(transport: &Arc<ScriptedTransport>) -> ClusterClient<ScriptedTransport> {
    ClusterClient::with_shared_transport(
        ApiBase::parse(SCHEDULER).unwrap(),
        Arc::clone(transport),
    )
}

pub fn job_json(id: &str) -> String {
    format!(
        r#"{{"ID":"{id}","Name":"{id}","Type":"service","Status":"running","Datacenters":["dc1"],"Meta":{{"template":"web-v2"}}}}"#
    )
}

pub fn allocation_json(id: &str, job: &str, node: &str) -> String {
    format!(
        r#"{{"ID":"{id}","JobID":"{job}","NodeID":"{node}","Name":"{job}.web[0]","TaskGroup":"web","ClientStatus":"running","DesiredStatus":"run"}}"#
    )
}

pub fn node_json(id: &str, http_addr: &str) -> String {
    format!(
        r#"{{"ID":"{id}","Name":"worker-{id}","Datacenter":"dc1","Status":"ready","HTTPAddr":"{http_addr}"}}"#
    )
}

pub const STATS_JSON: &str = r#"{
    "ResourceUsage": {
        "MemoryStats": {"RSS": 104857600, "Cache": 4096, "Swap": 0, "Usage": 110000000, "MaxUsage": 120000000},
        "CpuStats": {"SystemMode": 1.5, "UserMode": 8.0, "TotalTicks": 420.0, "Percent": 9.5}
    },
    "Tasks": {
        "api": {
            "ResourceUsage": {"MemoryStats": {"RSS": 104857600}, "CpuStats": {"Percent": 9.5}},
            "Timestamp": 1700000000000000000
        }
    },
    "Timestamp": 1700000000000000000
}"#;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
