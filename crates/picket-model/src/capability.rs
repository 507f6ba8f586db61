use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{RunnerId, TagSet},
    error::{ModelError, ModelResult},
    requirement::required,
};

/// Registration scope of an executor.
///
/// Informational for matching: downstream quota and cost logic consumes it,
/// the eligibility decision does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunnerKind {
    /// Shared across the whole instance.
    InstanceWide,
    /// Available to a group and its projects.
    GroupScoped,
    /// Registered to specific projects.
    ProjectScoped,
}

impl FromStr for RunnerKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instance-wide" | "instance" | "shared" => Ok(RunnerKind::InstanceWide),
            "group-scoped" | "group" => Ok(RunnerKind::GroupScoped),
            "project-scoped" | "project" => Ok(RunnerKind::ProjectScoped),
            other => Err(ModelError::UnknownRunnerKind(other.to_string())),
        }
    }
}

/// Which refs an executor is trusted to run work against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProtectionScope {
    /// Only work targeting protected refs. Such an executor holds elevated
    /// trust and must never receive unprotected work.
    ProtectedRefsOnly,
    /// Any ref, protected or not.
    AnyRef,
}

impl FromStr for ProtectionScope {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protected-refs-only" | "protected" => Ok(ProtectionScope::ProtectedRefsOnly),
            "any-ref" | "any" => Ok(ProtectionScope::AnyRef),
            other => Err(ModelError::UnknownProtectionScope(other.to_string())),
        }
    }
}

/// Per-visibility compute cost multipliers.
///
/// Carried on the capability profile for downstream cost accounting; never
/// consulted by matching. Compared bitwise so profiles with identical
/// factors hash together.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostFactors {
    /// Multiplier applied to work from public projects.
    pub public: f64,
    /// Multiplier applied to work from private projects.
    pub private: f64,
}

impl CostFactors {
    /// Create a factor pair.
    pub const fn new(public: f64, private: f64) -> Self {
        Self { public, private }
    }
}

impl PartialEq for CostFactors {
    fn eq(&self, other: &Self) -> bool {
        self.public.to_bits() == other.public.to_bits()
            && self.private.to_bits() == other.private.to_bits()
    }
}

impl Eq for CostFactors {}

impl Hash for CostFactors {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public.to_bits().hash(state);
        self.private.to_bits().hash(state);
    }
}

/// Immutable snapshot of what an executor class offers.
///
/// Like [`crate::BuildRequirement`], this is a *profile*: all physical
/// runners with the same kind, protection scope, untagged policy, tags, and
/// cost factors collapse into one value, with `runner_ids` carrying their
/// identities. Equality and hashing cover every field except `runner_ids`.
///
/// A capability change on a live runner (retagging, scope change) produces a
/// new `RunnerCapability`; the value itself never mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerCapability {
    /// Identities of the physical executors sharing this profile.
    runner_ids: BTreeSet<RunnerId>,
    /// Registration scope.
    kind: RunnerKind,
    /// Cost multipliers for downstream accounting.
    cost_factors: CostFactors,
    /// Whether this executor may claim work that declares no tags.
    accepts_untagged: bool,
    /// Which refs this executor is trusted for.
    protection_scope: ProtectionScope,
    /// Labels this executor advertises.
    tags: TagSet,
}

impl RunnerCapability {
    /// Create a capability profile with every field supplied.
    pub fn new(
        runner_ids: BTreeSet<RunnerId>,
        kind: RunnerKind,
        public_cost_factor: f64,
        private_cost_factor: f64,
        accepts_untagged: bool,
        protection_scope: ProtectionScope,
        tags: TagSet,
    ) -> Self {
        Self {
            runner_ids,
            kind,
            cost_factors: CostFactors::new(public_cost_factor, private_cost_factor),
            accepts_untagged,
            protection_scope,
            tags,
        }
    }

    /// Start assembling a capability field by field.
    ///
    /// [`RunnerCapabilityBuilder::build`] reports any field left unset as
    /// [`ModelError::MissingAttribute`].
    pub fn builder() -> RunnerCapabilityBuilder {
        RunnerCapabilityBuilder::default()
    }

    /// Identities of the physical executors sharing this profile.
    pub fn runner_ids(&self) -> &BTreeSet<RunnerId> {
        &self.runner_ids
    }

    /// Registration scope.
    pub fn kind(&self) -> RunnerKind {
        self.kind
    }

    /// Returns `true` if this profile is shared across the whole instance.
    pub fn is_instance_wide(&self) -> bool {
        self.kind == RunnerKind::InstanceWide
    }

    /// Cost multiplier for work from public projects.
    pub fn public_cost_factor(&self) -> f64 {
        self.cost_factors.public
    }

    /// Cost multiplier for work from private projects.
    pub fn private_cost_factor(&self) -> f64 {
        self.cost_factors.private
    }

    /// Whether this executor may claim work that declares no tags.
    pub fn accepts_untagged(&self) -> bool {
        self.accepts_untagged
    }

    /// Which refs this executor is trusted for.
    pub fn protection_scope(&self) -> ProtectionScope {
        self.protection_scope
    }

    /// Labels this executor advertises.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Produce a new value combining this profile's `runner_ids` with
    /// another's.
    ///
    /// Both values must share the same profile; callers group by equality
    /// before merging.
    pub fn merged_with(&self, other: &RunnerCapability) -> RunnerCapability {
        debug_assert_eq!(self, other);
        let mut merged = self.clone();
        merged.runner_ids.extend(other.runner_ids.iter().copied());
        merged
    }
}

impl PartialEq for RunnerCapability {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.cost_factors == other.cost_factors
            && self.accepts_untagged == other.accepts_untagged
            && self.protection_scope == other.protection_scope
            && self.tags == other.tags
    }
}

impl Eq for RunnerCapability {}

impl Hash for RunnerCapability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.cost_factors.hash(state);
        self.accepts_untagged.hash(state);
        self.protection_scope.hash(state);
        self.tags.hash(state);
    }
}

/// Field-by-field assembly of a [`RunnerCapability`].
///
/// Every field is mandatory; `build()` fails with the name of the first
/// missing one rather than defaulting it.
#[derive(Default, Debug, Clone)]
pub struct RunnerCapabilityBuilder {
    runner_ids: Option<BTreeSet<RunnerId>>,
    kind: Option<RunnerKind>,
    public_cost_factor: Option<f64>,
    private_cost_factor: Option<f64>,
    accepts_untagged: Option<bool>,
    protection_scope: Option<ProtectionScope>,
    tags: Option<TagSet>,
}

impl RunnerCapabilityBuilder {
    /// Set the identities of the executors behind this profile.
    pub fn runner_ids<I>(mut self, runner_ids: I) -> Self
    where
        I: IntoIterator<Item = RunnerId>,
    {
        self.runner_ids = Some(runner_ids.into_iter().collect());
        self
    }

    /// Set the registration scope.
    pub fn kind(mut self, kind: RunnerKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the cost multiplier for public-project work.
    pub fn public_cost_factor(mut self, factor: f64) -> Self {
        self.public_cost_factor = Some(factor);
        self
    }

    /// Set the cost multiplier for private-project work.
    pub fn private_cost_factor(mut self, factor: f64) -> Self {
        self.private_cost_factor = Some(factor);
        self
    }

    /// Set whether untagged work may be claimed.
    pub fn accepts_untagged(mut self, accepts_untagged: bool) -> Self {
        self.accepts_untagged = Some(accepts_untagged);
        self
    }

    /// Set the protection scope.
    pub fn protection_scope(mut self, protection_scope: ProtectionScope) -> Self {
        self.protection_scope = Some(protection_scope);
        self
    }

    /// Set the advertised tags.
    pub fn tags(mut self, tags: TagSet) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Finish assembly, failing on the first unset field.
    pub fn build(self) -> ModelResult<RunnerCapability> {
        Ok(RunnerCapability {
            runner_ids: required(self.runner_ids, "runner_ids")?,
            kind: required(self.kind, "kind")?,
            cost_factors: CostFactors::new(
                required(self.public_cost_factor, "public_cost_factor")?,
                required(self.private_cost_factor, "private_cost_factor")?,
            ),
            accepts_untagged: required(self.accepts_untagged, "accepts_untagged")?,
            protection_scope: required(self.protection_scope, "protection_scope")?,
            tags: required(self.tags, "tags")?,
        })
    }
}
