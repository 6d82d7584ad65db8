//! The generic stepper that runs any [`Grammar`].

use std::io::Write;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::episode::Episode;
use super::render::write_transcript;
use super::traits::{Environment, Transition};
use crate::error::{TaskError, TaskResult};
use crate::tasks::{Alphabet, AnyGrammar, Grammar, TaskId, Trial};

/// A task environment: a grammar, a seeded random source and the current
/// episode.
///
/// Each instance owns its random source, so two environments built with
/// the same seed produce identical episodes.
#[derive(Debug, Clone)]
pub struct TaskEnv<G: Grammar = AnyGrammar> {
    grammar: G,
    rng: StdRng,
    seed: u64,
    episode: Option<Episode>,
}

impl<G: Grammar> TaskEnv<G> {
    /// Create an environment. `None` seeds from entropy.
    pub fn new(grammar: G, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            grammar,
            rng: StdRng::seed_from_u64(seed),
            seed,
            episode: None,
        }
    }

    pub fn grammar(&self) -> &G {
        &self.grammar
    }

    /// Mutable access to the grammar. Changes take effect from the next reset.
    pub fn grammar_mut(&mut self) -> &mut G {
        &mut self.grammar
    }

    /// Start an episode on a hand-built trial instead of a generated one.
    pub fn reset_with_trial(&mut self, trial: Trial) -> TaskResult<usize> {
        self.validate(&trial)?;
        self.start(trial)
    }

    fn validate(&self, trial: &Trial) -> TaskResult<()> {
        let n = trial.len();
        if trial.observations.len() != n || trial.payoffs.len() != n {
            return Err(TaskError::InvalidConfig(format!(
                "trial has {} observations, {} targets and {} payoffs",
                trial.observations.len(),
                n,
                trial.payoffs.len()
            )));
        }
        if !trial.phases.is_empty() && trial.phases.len() != n {
            return Err(TaskError::InvalidConfig(format!(
                "trial has {} phases for {n} steps",
                trial.phases.len()
            )));
        }
        let n_obs = self.grammar.observations().len();
        if let Some(&o) = trial.observations.iter().find(|&&o| o >= n_obs) {
            return Err(TaskError::InvalidConfig(format!(
                "observation index {o} outside 0..{n_obs}"
            )));
        }
        let n_act = self.grammar.actions().len();
        if let Some(&t) = trial.targets.iter().find(|&&t| t >= n_act) {
            return Err(TaskError::InvalidConfig(format!(
                "target index {t} outside 0..{n_act}"
            )));
        }
        Ok(())
    }

    fn start(&mut self, trial: Trial) -> TaskResult<usize> {
        let episode = Episode::new(trial);
        let first = episode
            .observation()
            .ok_or_else(|| TaskError::InvalidConfig("generated an empty trial".to_string()))?;
        tracing::debug!(
            task = %self.grammar.task_id(),
            input = %episode.trial().input,
            length = episode.decision_length(),
            "Reset environment"
        );
        self.episode = Some(episode);
        Ok(first)
    }
}

impl<G: Grammar + Send> Environment for TaskEnv<G> {
    fn reset(&mut self) -> TaskResult<usize> {
        let trial = self.grammar.generate(&mut self.rng)?;
        self.start(trial)
    }

    fn step(&mut self, action: usize) -> TaskResult<Transition> {
        let action_space = self.grammar.actions().len();
        let episode = self.episode.as_mut().ok_or(TaskError::NotReset)?;
        let transition = episode.step(action, action_space)?;
        tracing::trace!(
            action,
            target = transition.info.target_action,
            reward = transition.reward,
            done = transition.done,
            "Step"
        );
        Ok(transition)
    }

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        let seed = seed.unwrap_or_else(rand::random);
        self.rng = StdRng::seed_from_u64(seed);
        self.seed = seed;
        vec![seed]
    }

    fn current_seed(&self) -> u64 {
        self.seed
    }

    fn render(&self, out: &mut dyn Write) -> std::io::Result<()> {
        write_transcript(
            out,
            self.grammar.task_id(),
            self.episode.as_ref(),
            self.grammar.actions(),
        )
    }

    fn task_id(&self) -> TaskId {
        self.grammar.task_id()
    }

    fn observation_alphabet(&self) -> &Alphabet {
        self.grammar.observations()
    }

    fn action_alphabet(&self) -> &Alphabet {
        self.grammar.actions()
    }

    fn episode(&self) -> Option<&Episode> {
        self.episode.as_ref()
    }
}
