//! Trajectory collection: orchestrating policy-environment interaction loops.
//!
//! The [`TrajectoryCollector`] drives episodes by repeatedly:
//!   1. presenting the observation to the policy,
//!   2. receiving the policy's action,
//!   3. stepping the environment,
//!   4. recording the (observation, action, reward) tuple.

use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use crate::env::{Environment, Episode};
use crate::trajectory::types::{Step, Trajectory, TrajectoryMetadata};

// ---------------------------------------------------------------------------
// Policy trait (minimal interface the collector needs)
// ---------------------------------------------------------------------------

/// Everything a policy may look at when choosing an action.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    /// Index of the current observation.
    pub observation: usize,
    /// Number of legal actions.
    pub action_space: usize,
    /// The running episode. Oracle-style baselines read the target from it.
    pub episode: &'a Episode,
}

/// The subset of policy capabilities the collector relies on.
///
/// The baseline policies live in `crate::agent`; this trait decouples the
/// collector from that module and makes it easy to supply mock policies in
/// tests.
pub trait AgentPolicy {
    /// Short label written into each trajectory.
    fn name(&self) -> &str;

    /// Return the index of the action to take.
    fn select_action(&mut self, ctx: &PolicyContext<'_>) -> Result<usize>;

    /// Called after every reset. The default implementation is a no-op.
    fn begin_episode(&mut self) {}
}

// ---------------------------------------------------------------------------
// Trajectory collector
// ---------------------------------------------------------------------------

/// Orchestrates episode collection by running a policy inside an environment.
#[derive(Debug, Clone)]
pub struct TrajectoryCollector {
    /// Whether to keep per-step records (long 12-AX episodes make these large).
    record_steps: bool,
}

impl Default for TrajectoryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TrajectoryCollector {
    /// A collector that records every step.
    pub fn new() -> Self {
        Self { record_steps: true }
    }

    /// A collector that keeps only episode-level data.
    pub fn summary_only() -> Self {
        Self {
            record_steps: false,
        }
    }

    /// Collect `num_episodes` trajectories.
    pub fn collect_episodes<E, P>(
        &self,
        env: &mut E,
        policy: &mut P,
        num_episodes: usize,
    ) -> Result<Vec<Trajectory>>
    where
        E: Environment,
        P: AgentPolicy,
    {
        let mut trajectories = Vec::with_capacity(num_episodes);

        for ep in 0..num_episodes {
            let trajectory = self
                .run_episode(env, policy)
                .with_context(|| format!("episode {ep} of {} failed", env.task_id()))?;
            tracing::info!(
                episode = ep,
                task = %trajectory.task,
                steps = trajectory.metadata.num_steps,
                reward = trajectory.total_reward,
                accuracy = trajectory.accuracy(),
                success = trajectory.success,
                "Collected episode"
            );
            trajectories.push(trajectory);
        }

        Ok(trajectories)
    }

    /// Run a single episode from scratch (calls `env.reset` internally).
    pub fn run_episode<E, P>(&self, env: &mut E, policy: &mut P) -> Result<Trajectory>
    where
        E: Environment,
        P: AgentPolicy,
    {
        self.run_episode_observed(env, policy, |_| Ok(()))
    }

    /// Like [`run_episode`](Self::run_episode), calling `observe` after the
    /// reset and after every step (the CLI renders from here).
    pub fn run_episode_observed<E, P, F>(
        &self,
        env: &mut E,
        policy: &mut P,
        mut observe: F,
    ) -> Result<Trajectory>
    where
        E: Environment,
        P: AgentPolicy,
        F: FnMut(&E) -> Result<()>,
    {
        let seed = env.current_seed();
        let mut observation = env.reset().context("reset failed")?;
        policy.begin_episode();
        observe(&*env)?;

        let action_space = env.action_space();
        let mut steps: Vec<Step> = Vec::new();
        let mut step_idx = 0;

        loop {
            let episode = env.episode().context("environment lost its episode")?;
            let action = policy.select_action(&PolicyContext {
                observation,
                action_space,
                episode,
            })?;

            let transition = env.step(action)?;

            if self.record_steps {
                steps.push(Step {
                    observation,
                    observation_symbol: symbol(env.observation_alphabet().symbol(observation)),
                    action,
                    action_symbol: symbol(env.action_alphabet().symbol(action)),
                    target_action: transition.info.target_action,
                    reward: transition.reward,
                    step_index: step_idx,
                    phase: transition.info.phase,
                });
            }
            observe(&*env)?;
            step_idx += 1;

            match transition.observation {
                Some(next) if !transition.done => observation = next,
                _ => break,
            }
        }

        let episode = env.episode().context("environment lost its episode")?;
        Ok(summarize(env, episode, policy.name(), steps, seed))
    }
}

fn symbol(s: Option<&str>) -> String {
    s.unwrap_or("?").to_string()
}

fn summarize<E: Environment>(
    env: &E,
    episode: &Episode,
    policy: &str,
    steps: Vec<Step>,
    seed: u64,
) -> Trajectory {
    let trial = episode.trial();
    let actions = env.action_alphabet();
    let num_steps = episode.position();
    let correct_steps = episode.correct_count();

    Trajectory {
        id: Uuid::new_v4().to_string(),
        task: env.task_id(),
        policy: policy.to_string(),
        input: trial.input.clone(),
        target: actions.render(&trial.targets),
        output: actions.render(episode.outputs()),
        steps,
        total_reward: episode.total_reward(),
        max_return: trial.max_return(),
        success: num_steps > 0 && correct_steps == num_steps,
        metadata: TrajectoryMetadata {
            num_steps,
            correct_steps,
            seed,
            collected_at: Utc::now(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
