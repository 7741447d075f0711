pub mod batch;
pub mod eligibility;
pub mod pacing;
pub mod tags;

pub use batch::{BatchExecutor, BatchSummary, EvaluationOutcome};
pub use eligibility::AccountStatus;
pub use pacing::PacingPolicy;
pub use tags::{TagGroup, TagSet};
