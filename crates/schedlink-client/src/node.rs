//! Client for a single node's local API.
//!
//! Resource usage and live logs can only be answered correctly by the node
//! running the allocation. The node-local API is less regular than the
//! cluster-wide one: every error comes back with the same status and the real
//! cause in a plain-text body, and a node still assembling an allocation can
//! serve an empty or partial stats document. Both quirks are handled here and
//! nowhere else.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use tracing::debug;
use url::Url;

use schedlink_model::{AllocationId, AllocationStats, ByteSize, LogStream, TaskLog, TaskName};

use crate::address::ApiBase;
use crate::error::{ApiError, RawResponse};
use crate::outcome::{self, classify_failure, ApiResult, ClientResult};
use crate::transport::{GetRequest, HyperTransport, Transport};

/// Body prefix the node agent uses when it has never heard of an allocation.
pub const UNKNOWN_ALLOCATION: &str = "unknown allocation ID";

/// Bound to one node's `/v1` root. Obtained from
/// [`ClusterClient::node_client`](crate::ClusterClient::node_client).
pub struct NodeClient<T = HyperTransport> {
    base: ApiBase,
    transport: Arc<T>,
}

impl<T> Clone for NodeClient<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> fmt::Debug for NodeClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeClient")
            .field("base", &self.base.as_url().as_str())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> NodeClient<T> {
    pub fn new(base: ApiBase, transport: T) -> Self {
        Self::with_shared_transport(base, Arc::new(transport))
    }

    pub fn with_shared_transport(base: ApiBase, transport: Arc<T>) -> Self {
        Self { base, transport }
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    /// `GET /v1/client/allocation/{id}/stats`
    ///
    /// Anything short of a well-formed snapshot reads as `NotFound`.
    pub async fn get_allocation_stats(
        &self,
        allocation_id: &AllocationId,
    ) -> ClientResult<AllocationStats> {
        let url = self
            .base
            .endpoint(["client", "allocation", allocation_id.as_str(), "stats"]);
        let request = GetRequest::json(url.clone());
        let response = match outcome::exchange(&*self.transport, request).await? {
            Ok(response) => response,
            Err(err) => return Ok(Err(err)),
        };
        Ok(outcome::report(&url, classify_stats(response)))
    }

    /// `GET /v1/client/fs/logs/{id}` for one task stream, as a single
    /// non-following snapshot.
    ///
    /// With `offset`, only the trailing `offset` bytes are returned.
    pub async fn get_task_log(
        &self,
        allocation_id: &AllocationId,
        task: &TaskName,
        stream: LogStream,
        offset: Option<ByteSize>,
    ) -> ClientResult<TaskLog> {
        let url = self.task_log_url(allocation_id, task, stream, offset);
        let request = GetRequest::text(url.clone());
        let response = match outcome::exchange(&*self.transport, request).await? {
            Ok(response) => response,
            Err(err) => return Ok(Err(err)),
        };
        Ok(outcome::report(&url, classify_log(response, stream)))
    }

    /// URL of the log snapshot for `task`.
    pub fn task_log_url(
        &self,
        allocation_id: &AllocationId,
        task: &TaskName,
        stream: LogStream,
        offset: Option<ByteSize>,
    ) -> Url {
        let mut url = self
            .base
            .endpoint(["client", "fs", "logs", allocation_id.as_str()]);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("task", task.as_str())
                .append_pair("type", stream.as_str())
                .append_pair("plain", "true")
                .append_pair("follow", "false");
            if let Some(offset) = offset {
                query
                    .append_pair("origin", "end")
                    .append_pair("offset", &offset.whole_bytes().to_string());
            }
        }
        url
    }
}

/// Classify a stats response.
///
/// A body that is missing, not JSON, or not a stats document means the
/// allocation is not (yet) known to the node, whatever the status. A 404 is
/// `NotFound` too. Any other non-200 status that nevertheless carries a
/// stats document is `Unexpected`.
pub fn classify_stats(response: RawResponse) -> ApiResult<AllocationStats> {
    let parsed = serde_json::from_slice::<AllocationStats>(&response.body);
    match parsed {
        Ok(stats) if response.status == StatusCode::OK => Ok(stats),
        Ok(_) => Err(classify_failure(response)),
        Err(err) => {
            debug!(status = %response.status, error = %err, "no usable allocation stats");
            Err(ApiError::NotFound)
        }
    }
}

/// Classify a log response. The node reports every failure with the same
/// status, so an unknown allocation is recognised by its body.
pub fn classify_log(response: RawResponse, stream: LogStream) -> ApiResult<TaskLog> {
    if response.status == StatusCode::OK {
        return Ok(TaskLog::new(stream, response.body));
    }
    if response.body.starts_with(UNKNOWN_ALLOCATION.as_bytes()) {
        return Err(ApiError::NotFound);
    }
    Err(classify_failure(response))
}
