//! Trajectory types and collection for recording policy-environment interactions.
//!
//! This module provides:
//! - [`types::Step`], [`types::Trajectory`], [`types::TrajectoryMetadata`] -- the
//!   core data structures that capture what happened during an episode.
//! - [`types::TrajectoryBuffer`] -- an accumulation buffer with per-task
//!   statistics and JSON persistence.
//! - [`collector::TrajectoryCollector`] -- the orchestration layer that drives
//!   policy-environment interaction loops and records trajectories.

pub mod collector;
pub mod types;

// Re-export the most commonly used items at the module level.
pub use collector::{AgentPolicy, PolicyContext, TrajectoryCollector};
pub use types::{Step, TaskStats, Trajectory, TrajectoryBuffer, TrajectoryMetadata};
