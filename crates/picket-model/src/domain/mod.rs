mod id;
pub use id::{ProjectRef, RunnerId, WorkId};

mod tags;
pub use tags::TagSet;
