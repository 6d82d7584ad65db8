//! Per-episode state: cursor, cumulative reward and the response log.

use serde::{Deserialize, Serialize};

use super::traits::{StepInfo, Transition};
use crate::error::{TaskError, TaskResult};
use crate::tasks::{Trial, TrialPhase};

/// One episode of a task, from reset to the final decision.
///
/// Created by `reset` and mutated only through [`Episode::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    trial: Trial,
    position: usize,
    total_reward: f64,
    last_reward: Option<f64>,
    last_action: Option<usize>,
    outputs: Vec<usize>,
}

impl Episode {
    pub fn new(trial: Trial) -> Self {
        let capacity = trial.len();
        Self {
            trial,
            position: 0,
            total_reward: 0.0,
            last_reward: None,
            last_action: None,
            outputs: Vec::with_capacity(capacity),
        }
    }

    pub fn trial(&self) -> &Trial {
        &self.trial
    }

    /// Number of decisions already made.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of decisions in the episode.
    pub fn decision_length(&self) -> usize {
        self.trial.len()
    }

    pub fn is_done(&self) -> bool {
        self.position >= self.trial.len()
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn last_reward(&self) -> Option<f64> {
        self.last_reward
    }

    pub fn last_action(&self) -> Option<usize> {
        self.last_action
    }

    /// Every response given so far, in order.
    pub fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    /// Observation at the cursor, `None` once the episode is over.
    pub fn observation(&self) -> Option<usize> {
        self.trial.observations.get(self.position).copied()
    }

    /// Correct action at the cursor, `None` once the episode is over.
    pub fn target(&self) -> Option<usize> {
        self.trial.targets.get(self.position).copied()
    }

    /// Trial phase at the cursor, for staged tasks.
    pub fn phase(&self) -> Option<TrialPhase> {
        self.trial.phases.get(self.position).copied()
    }

    /// Number of responses that matched their target.
    pub fn correct_count(&self) -> usize {
        self.outputs
            .iter()
            .zip(&self.trial.targets)
            .filter(|(o, t)| o == t)
            .count()
    }

    /// Score `action` against the current target and advance the cursor.
    ///
    /// A finished episode is reported first. Otherwise `action_space` is the
    /// size of the action set, and actions outside it are rejected before any
    /// state changes.
    pub fn step(&mut self, action: usize, action_space: usize) -> TaskResult<Transition> {
        let pos = self.position;
        let (Some(&target), Some(&payoff)) =
            (self.trial.targets.get(pos), self.trial.payoffs.get(pos))
        else {
            return Err(TaskError::EpisodeFinished {
                length: self.trial.len(),
            });
        };
        if action >= action_space {
            return Err(TaskError::InvalidAction {
                action,
                size: action_space,
            });
        }
        let phase = self.phase();

        let reward = payoff.score(action == target);
        self.last_action = Some(action);
        self.last_reward = Some(reward);
        self.total_reward += reward;
        self.outputs.push(action);
        self.position += 1;

        Ok(Transition {
            observation: self.observation(),
            reward,
            done: self.is_done(),
            info: StepInfo {
                target_action: target,
                phase,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::Payoff;

    fn ax_trial() -> Trial {
        // AXBY with observations A=0 B=1 X=2 Y=3 and actions L=0 R=1.
        Trial::uniform(vec![0, 2, 1, 3], vec![0, 1, 0, 0], "AXBY".into())
    }

    #[test]
    fn steps_through_to_terminal() {
        let mut ep = Episode::new(ax_trial());
        assert_eq!(ep.observation(), Some(0));
        assert!(!ep.is_done());

        let t = ep.step(0, 2).unwrap();
        assert_eq!(t.reward, 1.0);
        assert_eq!(t.observation, Some(2));
        assert!(!t.done);
        assert_eq!(t.info.target_action, 0);

        let t = ep.step(0, 2).unwrap();
        assert_eq!(t.reward, -1.0);
        assert_eq!(t.info.target_action, 1);

        ep.step(0, 2).unwrap();
        let t = ep.step(0, 2).unwrap();
        assert!(t.done);
        assert_eq!(t.observation, None);
        assert_eq!(ep.outputs(), &[0, 0, 0, 0]);
        assert_eq!(ep.correct_count(), 3);
        assert_eq!(ep.total_reward(), 2.0);
    }

    #[test]
    fn errors_leave_state_untouched() {
        let mut ep = Episode::new(ax_trial());
        let before = ep.clone();
        assert_eq!(
            ep.step(2, 2),
            Err(TaskError::InvalidAction { action: 2, size: 2 })
        );
        assert_eq!(ep, before);

        for _ in 0..4 {
            ep.step(1, 2).unwrap();
        }
        let finished = ep.clone();
        assert_eq!(ep.step(0, 2), Err(TaskError::EpisodeFinished { length: 4 }));
        assert_eq!(ep, finished);
    }

    #[test]
    fn finished_episode_wins_over_bad_action() {
        let mut ep = Episode::new(Trial::uniform(vec![0], vec![1], "A".into()));
        ep.step(1, 2).unwrap();
        let finished = ep.clone();
        assert_eq!(ep.step(5, 2), Err(TaskError::EpisodeFinished { length: 1 }));
        assert_eq!(ep, finished);
    }

    #[test]
    fn cumulative_reward_is_exact_sum() {
        let mut trial = ax_trial();
        trial.payoffs = vec![
            Payoff::new(0.1, -0.3),
            Payoff::new(0.2, -0.7),
            Payoff::new(0.3, 0.0),
            Payoff::new(10.0, 0.0),
        ];
        let mut ep = Episode::new(trial);
        let mut sum = 0.0;
        for a in [0, 0, 1, 0] {
            sum += ep.step(a, 2).unwrap().reward;
        }
        assert_eq!(ep.total_reward(), sum);
    }
}
