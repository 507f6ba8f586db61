pub mod evaluate;
pub mod policy;
pub mod profile;

pub mod prelude {
    pub use crate::evaluate::{Eligibility, EligibilityMap, evaluate};
    pub use crate::policy::{DefaultMatchPolicy, MatchPolicy, matches};
    pub use crate::profile::{collapse_capabilities, collapse_requirements};
}
