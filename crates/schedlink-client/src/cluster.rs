//! Client for the scheduler's cluster-wide API.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use schedlink_model::{Allocation, AllocationId, Job, JobId, Node, NodeId, WithId};

use crate::address::{AddressError, ApiBase, NodeAddress};
use crate::config::ClientConfig;
use crate::node::NodeClient;
use crate::outcome::{self, decode_json, expect_status, ClientResult};
use crate::transport::{GetRequest, HyperTransport, Transport};

/// Reads jobs, allocations and nodes from the scheduler.
///
/// Holds only the base address and a shared transport handle; cloning is
/// cheap and clones may be used concurrently.
pub struct ClusterClient<T = HyperTransport> {
    base: ApiBase,
    transport: Arc<T>,
}

impl<T> Clone for ClusterClient<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> fmt::Debug for ClusterClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterClient")
            .field("base", &self.base.as_url().as_str())
            .finish_non_exhaustive()
    }
}

impl ClusterClient<HyperTransport> {
    /// Build a client with the default transport from configuration.
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.base()?, config.build_transport()?))
    }
}

impl<T: Transport> ClusterClient<T> {
    pub fn new(base: ApiBase, transport: T) -> Self {
        Self::with_shared_transport(base, Arc::new(transport))
    }

    pub fn with_shared_transport(base: ApiBase, transport: Arc<T>) -> Self {
        Self { base, transport }
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    /// `GET /v1/job/{id}`
    pub async fn get_job(&self, job_id: &JobId) -> ClientResult<Job> {
        self.get_json(["job", job_id.as_str()], "job").await
    }

    /// `GET /v1/job/{id}/allocations`
    pub async fn get_allocations_for_job(
        &self,
        job_id: &JobId,
    ) -> ClientResult<WithId<JobId, Vec<Allocation>>> {
        let allocations = self
            .get_json(["job", job_id.as_str(), "allocations"], "job allocations")
            .await?;
        Ok(allocations.map(|list| WithId::new(job_id.clone(), list)))
    }

    /// `GET /v1/allocation/{id}`
    pub async fn get_allocation(&self, allocation_id: &AllocationId) -> ClientResult<Allocation> {
        self.get_json(["allocation", allocation_id.as_str()], "allocation")
            .await
    }

    /// `GET /v1/node/{id}`
    pub async fn get_node(&self, node_id: &NodeId) -> ClientResult<Node> {
        self.get_json(["node", node_id.as_str()], "node").await
    }

    /// `GET /v1/node/{id}/allocations`
    pub async fn get_node_allocations(
        &self,
        node_id: &NodeId,
    ) -> ClientResult<WithId<NodeId, Vec<Allocation>>> {
        let allocations = self
            .get_json(["node", node_id.as_str(), "allocations"], "node allocations")
            .await?;
        Ok(allocations.map(|list| WithId::new(node_id.clone(), list)))
    }

    /// Client for the node-local API of `node`. Performs no I/O.
    ///
    /// The node's advertised `HTTPAddr` replaces the host, and the port when
    /// one is given; an empty address leaves the scheduler base untouched.
    pub fn node_client(&self, node: &Node) -> Result<NodeClient<T>, AddressError> {
        let base = match NodeAddress::parse(&node.http_addr)? {
            Some(address) => self.base.with_node_address(&address)?,
            None => self.base.clone(),
        };
        debug!(node_id = %node.id, %base, "derived node client");
        Ok(NodeClient::with_shared_transport(
            base,
            Arc::clone(&self.transport),
        ))
    }

    async fn get_json<'a, R: DeserializeOwned>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
        context: &'static str,
    ) -> ClientResult<R> {
        let url = self.base.endpoint(segments);
        let response = match outcome::exchange(&*self.transport, GetRequest::json(url.clone()))
            .await?
            .and_then(|response| expect_status(response, StatusCode::OK))
        {
            Ok(response) => response,
            Err(err) => return Ok(outcome::report(&url, Err(err))),
        };
        decode_json(&response, context).map(Ok)
    }
}
