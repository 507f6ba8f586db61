use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{ProjectRef, TagSet, WorkId},
    error::{ModelError, ModelResult},
};

/// Immutable snapshot of what a pending unit of work needs from an executor.
///
/// A requirement is a *profile*: any number of pending builds that demand the
/// same protection level and tags collapse into one `BuildRequirement`, with
/// `work_ids` carrying all of their identities. Equality and hashing cover
/// only the profile fields (`is_protected`, `tags`, `owner_ref`) so that
/// container-based deduplication collapses requirements that differ only by
/// which builds they represent.
///
/// Once constructed the value never changes; retagging pending work produces
/// a new requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequirement {
    /// Whether the work targets a protected ref.
    is_protected: bool,
    /// Labels an executor must advertise to claim this work.
    tags: TagSet,
    /// Identities of the builds sharing this profile.
    ///
    /// Not consulted by matching; used by the caller for fan-out after
    /// eligibility is known.
    work_ids: BTreeSet<WorkId>,
    /// Owning project or namespace, passed through uninterpreted.
    owner_ref: ProjectRef,
}

impl BuildRequirement {
    /// Create a requirement profile with every field supplied.
    pub fn new(
        is_protected: bool,
        tags: TagSet,
        work_ids: BTreeSet<WorkId>,
        owner_ref: ProjectRef,
    ) -> Self {
        Self {
            is_protected,
            tags,
            work_ids,
            owner_ref,
        }
    }

    /// Start assembling a requirement field by field.
    ///
    /// Upstream producers working from optional source data use the builder;
    /// [`BuildRequirementBuilder::build`] reports any field left unset as
    /// [`ModelError::MissingAttribute`].
    pub fn builder() -> BuildRequirementBuilder {
        BuildRequirementBuilder::default()
    }

    /// Whether the work targets a protected ref.
    pub fn is_protected(&self) -> bool {
        self.is_protected
    }

    /// Labels an executor must advertise to claim this work.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Returns `true` if the requirement declares at least one tag.
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Identities of the builds sharing this profile.
    pub fn work_ids(&self) -> &BTreeSet<WorkId> {
        &self.work_ids
    }

    /// Owning project or namespace.
    pub fn owner_ref(&self) -> ProjectRef {
        self.owner_ref
    }

    /// Produce a new value combining this profile's `work_ids` with another's.
    ///
    /// Both values must share the same profile; callers group by equality
    /// before merging.
    pub fn merged_with(&self, other: &BuildRequirement) -> BuildRequirement {
        debug_assert_eq!(self, other);
        let mut merged = self.clone();
        merged.work_ids.extend(other.work_ids.iter().copied());
        merged
    }
}

impl PartialEq for BuildRequirement {
    fn eq(&self, other: &Self) -> bool {
        self.is_protected == other.is_protected
            && self.tags == other.tags
            && self.owner_ref == other.owner_ref
    }
}

impl Eq for BuildRequirement {}

impl Hash for BuildRequirement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_protected.hash(state);
        self.tags.hash(state);
        self.owner_ref.hash(state);
    }
}

/// Field-by-field assembly of a [`BuildRequirement`].
///
/// Every field is mandatory; `build()` fails with the name of the first
/// missing one rather than defaulting it.
#[derive(Default, Debug, Clone)]
pub struct BuildRequirementBuilder {
    is_protected: Option<bool>,
    tags: Option<TagSet>,
    work_ids: Option<BTreeSet<WorkId>>,
    owner_ref: Option<ProjectRef>,
}

impl BuildRequirementBuilder {
    /// Set whether the work targets a protected ref.
    pub fn is_protected(mut self, is_protected: bool) -> Self {
        self.is_protected = Some(is_protected);
        self
    }

    /// Set the required tags.
    pub fn tags(mut self, tags: TagSet) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Set the identities of the builds behind this profile.
    pub fn work_ids<I>(mut self, work_ids: I) -> Self
    where
        I: IntoIterator<Item = WorkId>,
    {
        self.work_ids = Some(work_ids.into_iter().collect());
        self
    }

    /// Set the owning project or namespace.
    pub fn owner_ref(mut self, owner_ref: ProjectRef) -> Self {
        self.owner_ref = Some(owner_ref);
        self
    }

    /// Finish assembly, failing on the first unset field.
    pub fn build(self) -> ModelResult<BuildRequirement> {
        Ok(BuildRequirement {
            is_protected: required(self.is_protected, "is_protected")?,
            tags: required(self.tags, "tags")?,
            work_ids: required(self.work_ids, "work_ids")?,
            owner_ref: required(self.owner_ref, "owner_ref")?,
        })
    }
}

pub(crate) fn required<T>(value: Option<T>, name: &'static str) -> ModelResult<T> {
    value.ok_or(ModelError::MissingAttribute(name))
}
