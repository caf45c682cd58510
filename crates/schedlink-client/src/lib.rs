//! schedlink-client — typed client for the scheduler's HTTP API.
//!
//! Two clients share one transport:
//!
//! ```text
//! ClusterClient (scheduler /v1)
//!   ├── get_job / get_allocation / get_node
//!   ├── get_allocations_for_job / get_node_allocations → WithId<_, Vec<Allocation>>
//!   └── node_client(&Node) ──► NodeClient (node HTTPAddr /v1)
//!                                ├── get_allocation_stats
//!                                └── get_task_log
//! ```
//!
//! # Outcomes
//!
//! Every call resolves to [`ClientResult<T>`], i.e.
//! `Result<Result<T, ApiError>, ClientError>`. Propagate the outer layer with
//! `?`; branch on the inner [`ApiError`]:
//!
//! - `NotFound`: the entity does not exist (or the node cannot say yet).
//! - `Unreachable`: the target host refused or failed the connection.
//! - `Unexpected`: any other response; logged at `warn` with the full body.
//!
//! A [`ClientError`] is a fault in the client or its environment (broken
//! transport, undecodable body, cancellation) and is never reclassified.
//!
//! # Node-local quirks
//!
//! The node API answers every error with the same status. A log request for
//! an allocation the node does not know is recognised by its
//! `unknown allocation ID` body, and a stats document that is missing or
//! malformed is reported as `NotFound` because nodes serve partial documents
//! while an allocation is still being set up.
//!
//! Calls never retry and impose no timeout of their own; configure one on the
//! transport.

pub mod address;
pub mod cluster;
pub mod config;
pub mod error;
pub mod node;
pub mod outcome;
pub mod transport;

pub use address::{AddressError, ApiBase, NodeAddress};
pub use cluster::ClusterClient;
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, RawResponse};
pub use node::NodeClient;
pub use outcome::{cancellable, ApiResult, ClientResult};
pub use transport::{GetRequest, HyperTransport, Transport, TransportError};
