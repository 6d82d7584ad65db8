//! Saccade / anti-saccade task.
//!
//! Each episode is one trial. A fixation mark tells the subject whether this
//! is a pro-saccade (`P`) or anti-saccade (`A`) trial, and a location cue
//! appears on the left (`L`) or right (`R`). The subject must look straight
//! ahead (`Front`) until the screen goes blank, then look towards the cue on
//! a pro-saccade trial and away from it on an anti-saccade trial.
//!
//! | step | phase | screen   | target  | reward hit / miss |
//! |------|-------|----------|---------|-------------------|
//! | 0-1  | Fix   | mark     | Front   | +1 / 0            |
//! | 2    | Cue   | mark+cue | Front   | 0 / -1            |
//! | 3-4  | Delay | mark     | Front   | 0 / -1            |
//! | 5    | Go    | Empty    | derived | go_reward / 0     |

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::alphabet::Alphabet;
use super::{Grammar, Payoff, TaskId, Trial};
use crate::config::SaccadeConfig;
use crate::error::{TaskError, TaskResult};

/// Number of decisions in one saccade trial.
pub const TRIAL_STEPS: usize = 6;

const SCREENS: [&str; 7] = ["Empty", "P", "PR", "PL", "A", "AL", "AR"];
const ACTIONS: [&str; 3] = ["Front", "Left", "Right"];

/// A stage of the saccade trial, fixed by the elapsed step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialPhase {
    Fix,
    Cue,
    Delay,
    Go,
}

impl TrialPhase {
    /// Phase active at a zero-based step, or `None` once the trial is over.
    pub fn at(step: usize) -> Option<Self> {
        match step {
            0 | 1 => Some(Self::Fix),
            2 => Some(Self::Cue),
            3 | 4 => Some(Self::Delay),
            5 => Some(Self::Go),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fix => "Fix",
            Self::Cue => "Cue",
            Self::Delay => "Delay",
            Self::Go => "Go",
        }
    }
}

/// Fixation mark: whether the trial is a pro- or anti-saccade trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixMark {
    Pro,
    Anti,
}

impl FixMark {
    pub const ALL: [FixMark; 2] = [Self::Pro, Self::Anti];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pro => "P",
            Self::Anti => "A",
        }
    }
}

/// Side of the screen the location cue appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    Left,
    Right,
}

impl Cue {
    pub const ALL: [Cue; 2] = [Self::Left, Self::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
        }
    }
}

/// The correct eye movement once the screen goes blank.
///
/// Pro-saccade trials follow the cue, anti-saccade trials oppose it.
pub fn go_target(fix_mark: FixMark, cue: Cue) -> &'static str {
    match (fix_mark, cue) {
        (FixMark::Pro, Cue::Left) | (FixMark::Anti, Cue::Right) => "Left",
        (FixMark::Pro, Cue::Right) | (FixMark::Anti, Cue::Left) => "Right",
    }
}

#[derive(Debug, Clone)]
pub struct Saccade {
    go_reward: f64,
    observations: Alphabet,
    actions: Alphabet,
}

impl Saccade {
    pub fn new(config: &SaccadeConfig) -> TaskResult<Self> {
        if !config.go_reward.is_finite() {
            return Err(TaskError::InvalidConfig(format!(
                "go_reward must be finite, got {}",
                config.go_reward
            )));
        }
        Ok(Self {
            go_reward: config.go_reward,
            observations: Alphabet::new(&SCREENS)?,
            actions: Alphabet::new(&ACTIONS)?,
        })
    }

    /// Build the full trial for a given mark and cue.
    pub fn trial_for(&self, fix_mark: FixMark, cue: Cue) -> Trial {
        let front = self.actions.idx("Front");
        let go = self.actions.idx(go_target(fix_mark, cue));
        let (fix_mark, cue_mark) = (fix_mark.as_str(), cue.as_str());
        let mark = self.observations.idx(fix_mark);
        let marked_cue = self.observations.idx(&format!("{fix_mark}{cue_mark}"));
        let empty = self.observations.idx("Empty");

        let mut observations = Vec::with_capacity(TRIAL_STEPS);
        let mut targets = Vec::with_capacity(TRIAL_STEPS);
        let mut payoffs = Vec::with_capacity(TRIAL_STEPS);
        let mut phases = Vec::with_capacity(TRIAL_STEPS);
        for phase in (0..TRIAL_STEPS).filter_map(TrialPhase::at) {
            let (screen, target, payoff) = match phase {
                TrialPhase::Fix => (mark, front, Payoff::new(1.0, 0.0)),
                TrialPhase::Cue => (marked_cue, front, Payoff::new(0.0, -1.0)),
                TrialPhase::Delay => (mark, front, Payoff::new(0.0, -1.0)),
                TrialPhase::Go => (empty, go, Payoff::new(self.go_reward, 0.0)),
            };
            observations.push(screen);
            targets.push(target);
            payoffs.push(payoff);
            phases.push(phase);
        }

        Trial {
            input: format!("{fix_mark}{cue_mark}"),
            observations,
            targets,
            payoffs,
            phases,
        }
    }
}

impl Grammar for Saccade {
    fn task_id(&self) -> TaskId {
        TaskId::Saccade
    }

    fn observations(&self) -> &Alphabet {
        &self.observations
    }

    fn actions(&self) -> &Alphabet {
        &self.actions
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial> {
        let fix_mark = FixMark::ALL.choose(rng).copied();
        let cue = Cue::ALL.choose(rng).copied();
        let (Some(fix_mark), Some(cue)) = (fix_mark, cue) else {
            return Err(TaskError::InvalidConfig("no saccade marks to draw from".into()));
        };
        Ok(self.trial_for(fix_mark, cue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saccade() -> Saccade {
        Saccade::new(&SaccadeConfig { go_reward: 10.0 }).unwrap()
    }

    #[test]
    fn phase_schedule() {
        let phases: Vec<_> = (0..7).map(TrialPhase::at).collect();
        assert_eq!(
            phases,
            vec![
                Some(TrialPhase::Fix),
                Some(TrialPhase::Fix),
                Some(TrialPhase::Cue),
                Some(TrialPhase::Delay),
                Some(TrialPhase::Delay),
                Some(TrialPhase::Go),
                None,
            ]
        );
    }

    #[test]
    fn truth_table() {
        assert_eq!(go_target(FixMark::Pro, Cue::Left), "Left");
        assert_eq!(go_target(FixMark::Pro, Cue::Right), "Right");
        assert_eq!(go_target(FixMark::Anti, Cue::Left), "Right");
        assert_eq!(go_target(FixMark::Anti, Cue::Right), "Left");
    }

    #[test]
    fn anti_saccade_trial_layout() {
        let g = saccade();
        let trial = g.trial_for(FixMark::Anti, Cue::Left);
        assert_eq!(trial.len(), TRIAL_STEPS);
        assert_eq!(trial.input, "AL");
        assert_eq!(
            g.observations().render(&trial.observations),
            "A A AL A A Empty"
        );
        assert_eq!(
            g.actions().render(&trial.targets),
            "Front Front Front Front Front Right"
        );
        assert_eq!(trial.payoffs[0], Payoff::new(1.0, 0.0));
        assert_eq!(trial.payoffs[3], Payoff::new(0.0, -1.0));
        assert_eq!(trial.payoffs[5], Payoff::new(10.0, 0.0));
        assert_eq!(trial.phases[2], TrialPhase::Cue);
    }

    #[test]
    fn every_mark_and_cue_builds_a_trial() {
        let g = saccade();
        for fix_mark in FixMark::ALL {
            for cue in Cue::ALL {
                let trial = g.trial_for(fix_mark, cue);
                assert_eq!(trial.input, format!("{}{}", fix_mark.as_str(), cue.as_str()));
                assert_eq!(
                    g.actions().symbol(trial.targets[TRIAL_STEPS - 1]),
                    Some(go_target(fix_mark, cue))
                );
            }
        }
    }

    #[test]
    fn generated_trials_use_both_marks() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let g = saccade();
        let mut rng = StdRng::seed_from_u64(21);
        let inputs: std::collections::HashSet<String> = (0..200)
            .map(|_| g.generate(&mut rng).unwrap().input)
            .collect();
        assert_eq!(inputs.len(), 4);
    }

    #[test]
    fn rejects_non_finite_go_reward() {
        assert!(Saccade::new(&SaccadeConfig {
            go_reward: f64::INFINITY
        })
        .is_err());
    }
}
