//! Batch evaluation of the eligibility relation.
//!
//! One scheduling pass takes N distinct capability profiles and M distinct
//! requirement profiles and evaluates the policy over every pair. Pairs are
//! independent, so callers needing more throughput can shard the pass; the
//! reference sweep here is a plain double loop.

use std::collections::BTreeSet;

use picket_model::{BuildRequirement, RunnerCapability, RunnerId, WorkId};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::policy::MatchPolicy;

/// Eligible capability profiles for one requirement profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    /// The requirement profile.
    pub requirement: BuildRequirement,
    /// Capability profiles that passed the policy, in input order.
    pub capabilities: Vec<RunnerCapability>,
}

impl Eligibility {
    /// Returns `true` if no capability profile may claim this work.
    ///
    /// The surrounding system surfaces such requirements as stalled
    /// ("no runner with the required tags"); producing that message is the
    /// caller's job, this layer only supplies the signal.
    pub fn is_stalled(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Identities of every physical executor eligible for this work.
    pub fn runner_ids(&self) -> BTreeSet<RunnerId> {
        self.capabilities
            .iter()
            .flat_map(|cap| cap.runner_ids().iter().copied())
            .collect()
    }

    /// Identities of the builds behind this requirement profile.
    pub fn work_ids(&self) -> &BTreeSet<WorkId> {
        self.requirement.work_ids()
    }
}

/// The eligibility relation for one scheduling pass.
///
/// One entry per requirement profile, in input order. Handed to the external
/// job-leasing subsystem, which owns everything past this point (leasing,
/// locking, retries, ordering by cost).
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct EligibilityMap {
    entries: Vec<Eligibility>,
}

impl EligibilityMap {
    /// Number of requirement profiles evaluated.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no requirement profiles were evaluated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in requirement input order.
    pub fn iter(&self) -> impl Iterator<Item = &Eligibility> {
        self.entries.iter()
    }

    /// Eligible capability profiles for the given requirement profile.
    ///
    /// Lookup is by profile equality, so any value with the same protection
    /// flag, tags, and owner finds the entry.
    pub fn eligible_for(&self, requirement: &BuildRequirement) -> Option<&[RunnerCapability]> {
        self.entries
            .iter()
            .find(|entry| entry.requirement == *requirement)
            .map(|entry| entry.capabilities.as_slice())
    }

    /// Identities of every executor eligible for the given requirement.
    pub fn runner_ids_for(&self, requirement: &BuildRequirement) -> BTreeSet<RunnerId> {
        self.entries
            .iter()
            .find(|entry| entry.requirement == *requirement)
            .map(Eligibility::runner_ids)
            .unwrap_or_default()
    }

    /// Requirement profiles that no capability may claim.
    pub fn stalled(&self) -> impl Iterator<Item = &BuildRequirement> {
        self.entries
            .iter()
            .filter(|entry| entry.is_stalled())
            .map(|entry| &entry.requirement)
    }
}

impl<'a> IntoIterator for &'a EligibilityMap {
    type Item = &'a Eligibility;
    type IntoIter = std::slice::Iter<'a, Eligibility>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Evaluate the policy over every capability × requirement pair.
///
/// Inputs are expected to be distinct profiles (see
/// [`crate::profile::collapse_requirements`] and
/// [`crate::profile::collapse_capabilities`]); this function does not
/// deduplicate on the caller's behalf.
#[instrument(level = "debug", skip_all, fields(policy = policy.name(), capabilities = capabilities.len(), requirements = requirements.len()))]
pub fn evaluate(
    capabilities: &[RunnerCapability],
    requirements: &[BuildRequirement],
    policy: &dyn MatchPolicy,
) -> EligibilityMap {
    let entries: Vec<Eligibility> = requirements
        .iter()
        .map(|requirement| {
            let eligible: Vec<RunnerCapability> = capabilities
                .iter()
                .filter(|capability| {
                    let matched = policy.matches(capability, requirement);
                    trace!(?capability, ?requirement, matched, "evaluated pair");
                    matched
                })
                .cloned()
                .collect();
            Eligibility {
                requirement: requirement.clone(),
                capabilities: eligible,
            }
        })
        .collect();

    let stalled = entries.iter().filter(|entry| entry.is_stalled()).count();
    debug!(entries = entries.len(), stalled, "eligibility pass complete");

    EligibilityMap { entries }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use picket_model::{
        BuildRequirement, ProjectRef, ProtectionScope, RunnerCapability, RunnerId, RunnerKind,
        TagSet, WorkId,
    };

    use super::evaluate;
    use crate::policy::DefaultMatchPolicy;

    fn requirement(is_protected: bool, tags: &[&str], work_id: u64) -> BuildRequirement {
        BuildRequirement::new(
            is_protected,
            TagSet::try_from_iter(tags.iter().copied()).unwrap(),
            BTreeSet::from([WorkId::new(work_id)]),
            ProjectRef::new(1),
        )
    }

    fn capability(
        accepts_untagged: bool,
        protection_scope: ProtectionScope,
        tags: &[&str],
        runner_ids: &[u64],
    ) -> RunnerCapability {
        RunnerCapability::new(
            runner_ids.iter().copied().map(RunnerId::new).collect(),
            RunnerKind::InstanceWide,
            1.0,
            1.0,
            accepts_untagged,
            protection_scope,
            TagSet::try_from_iter(tags.iter().copied()).unwrap(),
        )
    }

    #[test]
    fn relation_is_per_requirement_in_input_order() {
        let caps = [
            capability(true, ProtectionScope::AnyRef, &[], &[1]),
            capability(false, ProtectionScope::AnyRef, &["docker"], &[2, 3]),
        ];
        let reqs = [
            requirement(false, &[], 100),
            requirement(false, &["docker"], 101),
        ];

        let map = evaluate(&caps, &reqs, &DefaultMatchPolicy);

        assert_eq!(map.len(), 2);
        let untagged = map.eligible_for(&reqs[0]).unwrap();
        assert_eq!(untagged.len(), 1);
        assert_eq!(untagged[0].runner_ids(), caps[0].runner_ids());

        let tagged = map.eligible_for(&reqs[1]).unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].runner_ids(), caps[1].runner_ids());
    }

    #[test]
    fn runner_ids_expand_across_eligible_profiles() {
        let caps = [
            capability(false, ProtectionScope::AnyRef, &["docker"], &[1]),
            capability(false, ProtectionScope::AnyRef, &["docker", "linux"], &[2, 3]),
        ];
        let reqs = [requirement(false, &["docker"], 100)];

        let map = evaluate(&caps, &reqs, &DefaultMatchPolicy);
        assert_eq!(
            map.runner_ids_for(&reqs[0]),
            BTreeSet::from([RunnerId::new(1), RunnerId::new(2), RunnerId::new(3)])
        );
    }

    #[test]
    fn unmatched_requirements_are_reported_stalled() {
        let caps = [capability(false, ProtectionScope::AnyRef, &["docker"], &[1])];
        let reqs = [
            requirement(false, &["docker"], 100),
            requirement(false, &["windows"], 101),
        ];

        let map = evaluate(&caps, &reqs, &DefaultMatchPolicy);

        let stalled: Vec<_> = map.stalled().collect();
        assert_eq!(stalled.len(), 1);
        assert_eq!(stalled[0], &reqs[1]);
        assert!(map.eligible_for(&reqs[1]).unwrap().is_empty());
    }

    #[test]
    fn no_matches_is_an_empty_result_not_an_error() {
        let caps: [RunnerCapability; 0] = [];
        let reqs = [requirement(false, &["docker"], 100)];

        let map = evaluate(&caps, &reqs, &DefaultMatchPolicy);
        assert_eq!(map.len(), 1);
        assert!(map.iter().all(|entry| entry.is_stalled()));
    }

    #[test]
    fn lookup_is_by_profile_not_identity() {
        let caps = [capability(true, ProtectionScope::AnyRef, &[], &[1])];
        let reqs = [requirement(false, &[], 100)];

        let map = evaluate(&caps, &reqs, &DefaultMatchPolicy);

        // Same profile, different work ids.
        let probe = requirement(false, &[], 999);
        assert_eq!(map.eligible_for(&probe).unwrap().len(), 1);
    }

    #[test]
    fn protected_work_never_reaches_untrusted_result_rows() {
        let caps = [
            capability(true, ProtectionScope::ProtectedRefsOnly, &[], &[1]),
            capability(true, ProtectionScope::AnyRef, &[], &[2]),
        ];
        let reqs = [
            requirement(true, &[], 100),
            requirement(false, &[], 101),
        ];

        let map = evaluate(&caps, &reqs, &DefaultMatchPolicy);

        assert_eq!(
            map.runner_ids_for(&reqs[0]),
            BTreeSet::from([RunnerId::new(1), RunnerId::new(2)])
        );
        assert_eq!(
            map.runner_ids_for(&reqs[1]),
            BTreeSet::from([RunnerId::new(2)])
        );
    }

    #[test]
    fn serializes_for_handoff() {
        let caps = [capability(true, ProtectionScope::AnyRef, &[], &[1])];
        let reqs = [requirement(false, &[], 100)];

        let map = evaluate(&caps, &reqs, &DefaultMatchPolicy);
        let json = serde_json::to_value(&map).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["requirement"]["workIds"][0], 100);
        assert_eq!(json[0]["capabilities"][0]["runnerIds"][0], 1);
    }
}
