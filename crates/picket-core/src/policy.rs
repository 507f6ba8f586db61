//! Eligibility policy deciding whether an executor class may claim a unit
//! of work.
//!
//! The default policy is the whole story for most deployments. Installations
//! that need extra eligibility rules implement [`MatchPolicy`] themselves,
//! usually by wrapping [`DefaultMatchPolicy`] and adding checks on top.

use picket_model::{BuildRequirement, ProtectionScope, RunnerCapability};

/// Admission predicate between a capability profile and a requirement
/// profile.
///
/// Implementations must be pure: same inputs, same answer, no side effects.
/// Evaluations for different pairs never depend on each other, so a policy
/// may be shared freely across threads.
pub trait MatchPolicy: Send + Sync {
    /// Policy name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Returns `true` if executors with this capability may claim work with
    /// this requirement.
    fn matches(&self, capability: &RunnerCapability, requirement: &BuildRequirement) -> bool;
}

/// The standard admission rules.
///
/// Checks run in order and short-circuit:
///
/// 1. A `ProtectedRefsOnly` capability never claims unprotected work. This
///    gate runs before any tag logic: tag overlap must not override a
///    protection mismatch.
/// 2. Untagged work is claimed only by capabilities that opted into
///    `accepts_untagged`, regardless of what tags the capability happens to
///    advertise. An empty requirement tag set does not match by
///    vacuous-subset reasoning.
/// 3. Tagged work is claimed only when every required tag is advertised by
///    the capability. Supersets are fine; `accepts_untagged` does not relax
///    the subset check.
///
/// Runner kind and cost factors never influence the result; they belong to
/// downstream quota and cost accounting.
#[derive(Default, Debug, Clone, Copy)]
pub struct DefaultMatchPolicy;

impl MatchPolicy for DefaultMatchPolicy {
    fn name(&self) -> &'static str {
        "default"
    }

    fn matches(&self, capability: &RunnerCapability, requirement: &BuildRequirement) -> bool {
        if capability.protection_scope() == ProtectionScope::ProtectedRefsOnly
            && !requirement.is_protected()
        {
            return false;
        }

        if requirement.has_tags() {
            requirement.tags().is_subset_of(capability.tags())
        } else {
            capability.accepts_untagged()
        }
    }
}

/// Evaluate the standard admission rules for one pair.
///
/// Shorthand for callers that need no custom [`MatchPolicy`].
pub fn matches(capability: &RunnerCapability, requirement: &BuildRequirement) -> bool {
    DefaultMatchPolicy.matches(capability, requirement)
}
