//! Core trajectory data types: what a policy did during one episode.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tasks::{TaskId, TrialPhase};

// ---------------------------------------------------------------------------
// Single step
// ---------------------------------------------------------------------------

/// A single step within a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Observation index the policy received.
    pub observation: usize,
    /// The observation's symbol (e.g. `"A"`, `"PL"`).
    pub observation_symbol: String,
    /// The action the policy chose.
    pub action: usize,
    pub action_symbol: String,
    /// The action that would have been correct.
    pub target_action: usize,
    /// The scalar reward for this transition.
    pub reward: f64,
    /// Zero-based index of this step within the trajectory.
    pub step_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<TrialPhase>,
}

impl Step {
    pub fn is_correct(&self) -> bool {
        self.action == self.target_action
    }
}

// ---------------------------------------------------------------------------
// Trajectory metadata
// ---------------------------------------------------------------------------

/// Auxiliary metadata attached to every trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryMetadata {
    /// Number of decisions in the episode.
    pub num_steps: usize,
    /// Number of decisions that matched their target.
    pub correct_steps: usize,
    /// Seed of the environment's random source when collection started.
    pub seed: u64,
    pub collected_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Full trajectory
// ---------------------------------------------------------------------------

/// A complete trajectory recording one episode of policy-environment interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub task: TaskId,
    /// Name of the policy that produced the trajectory.
    pub policy: String,
    /// The generated stimulus.
    pub input: String,
    /// Correct responses, rendered with the action symbols.
    pub target: String,
    /// Responses given, rendered with the action symbols.
    pub output: String,
    /// Ordered sequence of steps; empty when collected without step records.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Total accumulated reward over the episode.
    pub total_reward: f64,
    /// Highest reward the episode could have paid.
    pub max_return: f64,
    /// Whether every response was correct.
    pub success: bool,
    pub metadata: TrajectoryMetadata,
}

impl Trajectory {
    /// Fraction of correct responses, `0.0` for an empty episode.
    pub fn accuracy(&self) -> f64 {
        if self.metadata.num_steps == 0 {
            return 0.0;
        }
        self.metadata.correct_steps as f64 / self.metadata.num_steps as f64
    }
}

// ---------------------------------------------------------------------------
// Per-task statistics
// ---------------------------------------------------------------------------

/// Aggregate statistics over the trajectories of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    pub task: TaskId,
    pub episodes: usize,
    pub successes: usize,
    pub mean_reward: f64,
    pub mean_max_return: f64,
    pub mean_accuracy: f64,
    pub mean_length: f64,
}

impl TaskStats {
    fn from_trajectories(task: TaskId, trajectories: &[&Trajectory]) -> Self {
        let n = trajectories.len().max(1) as f64;
        let mean = |f: &dyn Fn(&Trajectory) -> f64| trajectories.iter().map(|t| f(t)).sum::<f64>() / n;
        Self {
            task,
            episodes: trajectories.len(),
            successes: trajectories.iter().filter(|t| t.success).count(),
            mean_reward: mean(&|t| t.total_reward),
            mean_max_return: mean(&|t| t.max_return),
            mean_accuracy: mean(&|t| t.accuracy()),
            mean_length: mean(&|t| t.metadata.num_steps as f64),
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.successes as f64 / self.episodes as f64
    }
}

// ---------------------------------------------------------------------------
// Trajectory buffer
// ---------------------------------------------------------------------------

/// A buffer for accumulating trajectories during data collection.
///
/// Serialises as a plain JSON array of trajectories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrajectoryBuffer {
    trajectories: Vec<Trajectory>,
}

impl TrajectoryBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            trajectories: Vec::new(),
        }
    }

    /// Create a buffer pre-allocated for `capacity` trajectories.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            trajectories: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn push(&mut self, trajectory: Trajectory) {
        self.trajectories.push(trajectory);
    }

    /// Extend the buffer with an iterator of trajectories.
    pub fn extend(&mut self, iter: impl IntoIterator<Item = Trajectory>) {
        self.trajectories.extend(iter);
    }

    pub fn as_slice(&self) -> &[Trajectory] {
        &self.trajectories
    }

    /// Group trajectories by task, ordered by task id.
    pub fn group_by_task(&self) -> BTreeMap<&'static str, Vec<&Trajectory>> {
        let mut groups: BTreeMap<&'static str, Vec<&Trajectory>> = BTreeMap::new();
        for t in &self.trajectories {
            groups.entry(t.task.as_str()).or_default().push(t);
        }
        groups
    }

    /// Per-task statistics, ordered by task id.
    pub fn stats(&self) -> Vec<TaskStats> {
        self.group_by_task()
            .into_values()
            .filter_map(|group| {
                let task = group.first()?.task;
                Some(TaskStats::from_trajectories(task, &group))
            })
            .collect()
    }

    /// Overall success rate across all buffered trajectories.
    pub fn success_rate(&self) -> f64 {
        if self.trajectories.is_empty() {
            return 0.0;
        }
        let successes = self.trajectories.iter().filter(|t| t.success).count();
        successes as f64 / self.trajectories.len() as f64
    }

    /// Mean total reward across all buffered trajectories.
    pub fn mean_reward(&self) -> f64 {
        if self.trajectories.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trajectories.iter().map(|t| t.total_reward).sum();
        sum / self.trajectories.len() as f64
    }

    /// Serialize the buffer to a pretty-printed JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize trajectories to JSON")?;
        std::fs::write(path.as_ref(), json).with_context(|| {
            format!("Failed to write trajectories to {}", path.as_ref().display())
        })?;
        tracing::info!(
            path = %path.as_ref().display(),
            trajectories = self.len(),
            "Saved trajectories"
        );
        Ok(())
    }

    /// Deserialize a buffer from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read trajectories from {}",
                path.as_ref().display()
            )
        })?;
        let buffer: Self =
            serde_json::from_str(&data).context("Failed to deserialize trajectory JSON")?;
        tracing::info!(
            path = %path.as_ref().display(),
            trajectories = buffer.len(),
            "Loaded trajectories"
        );
        Ok(buffer)
    }
}
