//! Agent module: baseline policies for the cognitive tasks.
//!
//! Each policy implements [`AgentPolicy`](crate::trajectory::AgentPolicy) so
//! the [`TrajectoryCollector`](crate::trajectory::TrajectoryCollector) can drive
//! it. [`AnyPolicy`] selects one at runtime.

pub mod policy;

// Re-export the primary types for convenient access.
pub use policy::{AnyPolicy, ConstantPolicy, OraclePolicy, PolicyKind, RandomPolicy};
