//! schedlink-model — domain records for the scheduler client.
//!
//! Identifiers are nominally typed ([`JobId`], [`AllocationId`], [`NodeId`],
//! [`TaskName`]) so they cannot be mixed up even though all of them are plain
//! strings on the wire. Records deserialize from the scheduler's JSON and are
//! owned by the caller; nothing here performs I/O.

pub mod id;
pub mod size;
pub mod types;

pub use id::{AllocationId, EntityKind, Id, JobId, NodeId, TaskName};
pub use size::{ByteSize, ByteSizeError};
pub use types::*;
