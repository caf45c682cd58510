//! Nominally-typed identifiers.
//!
//! Every identifier the scheduler hands out is a plain string on the wire,
//! but a job ID is not an allocation ID. [`Id<K>`] carries a zero-sized kind
//! marker so the compiler rejects passing one where the other is expected:
//!
//! ```compile_fail
//! use schedlink_model::{AllocationId, JobId};
//!
//! fn takes_alloc(_: &AllocationId) {}
//! takes_alloc(&JobId::new("web"));
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Entity kind an [`Id`] belongs to.
pub trait EntityKind {
    /// Human-readable kind name used in `Debug` output.
    const NAME: &'static str;
}

/// Marker for job identifiers.
#[derive(Debug)]
pub enum JobKind {}

/// Marker for allocation identifiers.
#[derive(Debug)]
pub enum AllocationKind {}

/// Marker for node identifiers.
#[derive(Debug)]
pub enum NodeKind {}

/// Marker for task names (unique within an allocation).
#[derive(Debug)]
pub enum TaskKind {}

impl EntityKind for JobKind {
    const NAME: &'static str = "JobId";
}

impl EntityKind for AllocationKind {
    const NAME: &'static str = "AllocationId";
}

impl EntityKind for NodeKind {
    const NAME: &'static str = "NodeId";
}

impl EntityKind for TaskKind {
    const NAME: &'static str = "TaskName";
}

pub type JobId = Id<JobKind>;
pub type AllocationId = Id<AllocationKind>;
pub type NodeId = Id<NodeKind>;
pub type TaskName = Id<TaskKind>;

/// A string identifier owned by entity kind `K`.
pub struct Id<K> {
    raw: String,
    // fn() -> K keeps Id Send + Sync regardless of K.
    kind: PhantomData<fn() -> K>,
}

impl<K> Id<K> {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_inner(self) -> String {
        self.raw
    }
}

impl<K> Clone for Id<K> {
    fn clone(&self) -> Self {
        Self::new(self.raw.clone())
    }
}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K> Eq for Id<K> {}

impl<K> PartialOrd for Id<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Id<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<K> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K> Borrow<str> for Id<K> {
    fn borrow(&self) -> &str {
        &self.raw
    }
}

impl<K> AsRef<str> for Id<K> {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl<K> From<String> for Id<K> {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl<K> From<&str> for Id<K> {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl<K: EntityKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::NAME, self.raw)
    }
}

impl<K> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl<K> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de, K> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
