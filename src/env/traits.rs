//! Core environment trait and shared types.
//!
//! Every task environment implements the [`Environment`] trait so that the
//! trajectory collector and the CLI can drive episodes uniformly.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::episode::Episode;
use crate::error::TaskResult;
use crate::tasks::{Alphabet, TaskId, TrialPhase};

/// Diagnostic information attached to every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Index of the action that would have been correct at this step.
    pub target_action: usize,
    /// Trial phase the step belonged to (saccade only).
    pub phase: Option<TrialPhase>,
}

/// The result of a single [`Environment::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Index of the next observation, or `None` once the episode has ended.
    pub observation: Option<usize>,
    /// Scalar reward for the response just given.
    pub reward: f64,
    /// Whether the episode has terminated.
    pub done: bool,
    pub info: StepInfo,
}

/// The core environment trait.
pub trait Environment: Send {
    /// Start a new episode and return the index of its first observation.
    fn reset(&mut self) -> TaskResult<usize>;

    /// Submit a response for the current step.
    ///
    /// Fails without touching any state if the action is out of range, the
    /// episode is over, or no episode has been started.
    fn step(&mut self, action: usize) -> TaskResult<Transition>;

    /// Re-seed the environment's random source. `None` draws a fresh seed
    /// from entropy. Returns the seed actually used.
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64>;

    /// The seed the random source was last initialised with.
    fn current_seed(&self) -> u64;

    /// Write a human-readable transcript of the current episode.
    fn render(&self, out: &mut dyn Write) -> std::io::Result<()>;

    /// Registry id of the task.
    fn task_id(&self) -> TaskId;

    /// Symbols behind the observation indices.
    fn observation_alphabet(&self) -> &Alphabet;

    /// Symbols behind the action indices.
    fn action_alphabet(&self) -> &Alphabet;

    /// Number of distinct observation indices.
    fn observation_space(&self) -> usize {
        self.observation_alphabet().len()
    }

    /// Number of distinct actions.
    fn action_space(&self) -> usize {
        self.action_alphabet().len()
    }

    /// The current episode, if one has been started.
    fn episode(&self) -> Option<&Episode>;

    /// Whether the current episode has ended (true before the first reset).
    fn is_done(&self) -> bool {
        self.episode().map_or(true, Episode::is_done)
    }
}
