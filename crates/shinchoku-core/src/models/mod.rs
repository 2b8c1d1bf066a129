pub mod decision;
pub mod target;

pub use decision::{DecisionAction, DecisionReason, UpdateDecision};
pub use target::{Confidence, ResolvedTarget};
