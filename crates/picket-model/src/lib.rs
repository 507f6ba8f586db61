mod domain;
pub use domain::{ProjectRef, RunnerId, TagSet, WorkId};

mod error;
pub use error::{ModelError, ModelResult};

mod requirement;
pub use requirement::{BuildRequirement, BuildRequirementBuilder};

mod capability;
pub use capability::{
    CostFactors, ProtectionScope, RunnerCapability, RunnerCapabilityBuilder, RunnerKind,
};
