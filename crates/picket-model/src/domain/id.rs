use serde::{Deserialize, Serialize};

/// Identity of a single pending unit of work.
///
/// Carried through matching so the caller can fan out an eligibility
/// decision back to the individual builds behind a requirement profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkId(u64);

impl WorkId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw identifier value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for WorkId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<WorkId> for u64 {
    fn from(id: WorkId) -> Self {
        id.0
    }
}

/// Identity of a single physical executor.
///
/// Many executors can share one capability profile; the profile carries the
/// full set of their identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunnerId(u64);

impl RunnerId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw identifier value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RunnerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<RunnerId> for u64 {
    fn from(id: RunnerId) -> Self {
        id.0
    }
}

/// Identity of the project or namespace that owns a unit of work.
///
/// Passed through to downstream consumers, never interpreted by the
/// matching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectRef(u64);

impl ProjectRef {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw identifier value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ProjectRef {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<ProjectRef> for u64 {
    fn from(id: ProjectRef) -> Self {
        id.0
    }
}
