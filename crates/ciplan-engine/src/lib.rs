pub mod classify;
pub mod decision;
pub mod impact;

pub use classify::{ClassifiedPath, SurfaceMatch, classify};
pub use decision::{Decision, PlanRequest, ProfileDecision, Reason, Revisions, SurfaceDecision, plan};
pub use impact::{ImpactSet, resolve_impact};
