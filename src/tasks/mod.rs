//! Task grammars: how each task generates its stimulus and correct responses.
//!
//! Every task implements [`Grammar`], which turns a random source into a
//! [`Trial`]: the observation shown at each decision step, the correct action
//! for that step and the reward paid for a hit or a miss. A single generic
//! stepper ([`crate::env::TaskEnv`]) then runs any grammar.
//!
//! Included tasks:
//! - **AX family** ([`ax`]) -- AX-CPT, 12-AX-CPT, 12-AX-S.
//! - **Copy family** ([`copy`]) -- simple copy, copy v1, copy-repeat.
//! - **Sequence prediction** ([`seq_prediction`]) -- `ABC`/`XBC`.
//! - **Saccade** ([`saccade`]) -- pro/anti-saccade trials.

pub mod alphabet;
pub mod ax;
pub mod copy;
pub mod saccade;
pub mod sampler;
pub mod seq_prediction;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CogTasksConfig;
use crate::error::{TaskError, TaskResult};

pub use alphabet::Alphabet;
pub use ax::{AxCpt, TwelveAxCpt, TwelveAxS};
pub use copy::{CopyMode, CopyRepeat, CopyV1, SimpleCopy};
pub use saccade::{Cue, FixMark, Saccade, TrialPhase};
pub use seq_prediction::SeqPrediction;

// ---------------------------------------------------------------------------
// Trial
// ---------------------------------------------------------------------------

/// Reward paid for a correct (`hit`) or incorrect (`miss`) response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payoff {
    pub hit: f64,
    pub miss: f64,
}

impl Payoff {
    /// `+1` for a match, `-1` otherwise.
    pub const SIGNED: Self = Self {
        hit: 1.0,
        miss: -1.0,
    };

    pub const fn new(hit: f64, miss: f64) -> Self {
        Self { hit, miss }
    }

    pub fn score(&self, correct: bool) -> f64 {
        if correct {
            self.hit
        } else {
            self.miss
        }
    }
}

/// One generated episode: what is shown and what is expected at every step.
///
/// `observations`, `targets` and `payoffs` all have the decision length.
/// `phases` is empty for tasks without a trial clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// The generated stimulus as text (e.g. `"1AXBY"`, `"PL"`).
    pub input: String,
    pub observations: Vec<usize>,
    pub targets: Vec<usize>,
    pub payoffs: Vec<Payoff>,
    pub phases: Vec<TrialPhase>,
}

impl Trial {
    /// A trial scored `+1`/`-1` at every step.
    pub fn uniform(observations: Vec<usize>, targets: Vec<usize>, input: String) -> Self {
        debug_assert_eq!(observations.len(), targets.len());
        let payoffs = vec![Payoff::SIGNED; targets.len()];
        Self {
            input,
            observations,
            targets,
            payoffs,
            phases: Vec::new(),
        }
    }

    /// The decision length.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Highest return an agent can collect on this trial.
    pub fn max_return(&self) -> f64 {
        self.payoffs.iter().map(|p| p.hit).sum()
    }
}

// ---------------------------------------------------------------------------
// Grammar trait
// ---------------------------------------------------------------------------

/// A task's symbol tables and sequence generator.
pub trait Grammar {
    /// Registry id of the task.
    fn task_id(&self) -> TaskId;

    /// Symbols the agent can observe.
    fn observations(&self) -> &Alphabet;

    /// Responses the agent can emit.
    fn actions(&self) -> &Alphabet;

    /// Generate a fresh trial.
    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial>;
}

// ---------------------------------------------------------------------------
// Task registry
// ---------------------------------------------------------------------------

/// Every task the crate knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskId {
    AxCpt,
    TwelveAxCpt,
    TwelveAxS,
    SeqPrediction,
    SimpleCopy,
    SimpleCopyV1,
    SimpleCopyRepeat,
    Saccade,
}

impl TaskId {
    pub const ALL: [TaskId; 8] = [
        Self::AxCpt,
        Self::TwelveAxCpt,
        Self::TwelveAxS,
        Self::SeqPrediction,
        Self::SimpleCopy,
        Self::SimpleCopyV1,
        Self::SimpleCopyRepeat,
        Self::Saccade,
    ];

    /// The registry string, e.g. `"12_AX_S-v0"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AxCpt => "AX_CPT-v0",
            Self::TwelveAxCpt => "12_AX_CPT-v0",
            Self::TwelveAxS => "12_AX_S-v0",
            Self::SeqPrediction => "seq_prediction-v0",
            Self::SimpleCopy => "Simple_Copy-v0",
            Self::SimpleCopyV1 => "Simple_Copy_v1-v0",
            Self::SimpleCopyRepeat => "Simple_Copy_Repeat-v0",
            Self::Saccade => "Saccade-v0",
        }
    }

    /// One-line description used by the CLI.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AxCpt => "respond R to X directly after A",
            Self::TwelveAxCpt => "last digit selects the rewarded pair (1: AX, 2: BY)",
            Self::TwelveAxS => "one leading digit, short run of pairs",
            Self::SeqPrediction => "predict the next symbol of ABCD / XBCY",
            Self::SimpleCopy => "copy a sequence of random length",
            Self::SimpleCopyV1 => "copy a fixed-length sequence (full/major/minor)",
            Self::SimpleCopyRepeat => "copy repeatedly, reversing every second copy",
            Self::Saccade => "fixate, then look towards or away from the cue",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskId {
    type Err = TaskError;

    /// Accepts the registry id exactly, or case-insensitively without the
    /// `-v0` suffix (`"ax_cpt"`, `"saccade"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let wanted = wanted.strip_suffix("-v0").unwrap_or(&wanted);
        Self::ALL
            .iter()
            .copied()
            .find(|id| {
                let name = id.as_str().to_lowercase();
                name.strip_suffix("-v0").unwrap_or(&name) == wanted
            })
            .ok_or_else(|| TaskError::UnknownTask(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// AnyGrammar: enum dispatch over the concrete grammars
// ---------------------------------------------------------------------------

/// An enum wrapper around all task grammars, enabling runtime task selection
/// with a single concrete environment type.
#[derive(Debug, Clone)]
pub enum AnyGrammar {
    AxCpt(AxCpt),
    TwelveAxCpt(TwelveAxCpt),
    TwelveAxS(TwelveAxS),
    SeqPrediction(SeqPrediction),
    SimpleCopy(SimpleCopy),
    CopyV1(CopyV1),
    CopyRepeat(CopyRepeat),
    Saccade(Saccade),
}

impl AnyGrammar {
    /// Build the grammar for `id` from its section of `config`.
    pub fn build(id: TaskId, config: &CogTasksConfig) -> TaskResult<Self> {
        Ok(match id {
            TaskId::AxCpt => Self::AxCpt(AxCpt::new(&config.ax_cpt)?),
            TaskId::TwelveAxCpt => Self::TwelveAxCpt(TwelveAxCpt::new(&config.twelve_ax_cpt)?),
            TaskId::TwelveAxS => Self::TwelveAxS(TwelveAxS::new(&config.twelve_ax_s)?),
            TaskId::SeqPrediction => {
                Self::SeqPrediction(SeqPrediction::new(&config.seq_prediction)?)
            }
            TaskId::SimpleCopy => Self::SimpleCopy(SimpleCopy::new(&config.simple_copy)?),
            TaskId::SimpleCopyV1 => Self::CopyV1(CopyV1::new(&config.copy_v1)?),
            TaskId::SimpleCopyRepeat => Self::CopyRepeat(CopyRepeat::new(&config.copy_repeat)?),
            TaskId::Saccade => Self::Saccade(Saccade::new(&config.saccade)?),
        })
    }

    /// Switch the input mode of `Simple_Copy_v1-v0`. Takes effect from the
    /// next generated trial. Any other task rejects the call.
    pub fn set_copy_mode(&mut self, mode: CopyMode) -> TaskResult<()> {
        match self {
            Self::CopyV1(g) => g.set_mode(mode),
            other => Err(TaskError::InvalidConfig(format!(
                "copy mode only applies to {}, not {}",
                TaskId::SimpleCopyV1,
                other.task_id()
            ))),
        }
    }
}

impl Grammar for AnyGrammar {
    fn task_id(&self) -> TaskId {
        match self {
            Self::AxCpt(g) => g.task_id(),
            Self::TwelveAxCpt(g) => g.task_id(),
            Self::TwelveAxS(g) => g.task_id(),
            Self::SeqPrediction(g) => g.task_id(),
            Self::SimpleCopy(g) => g.task_id(),
            Self::CopyV1(g) => g.task_id(),
            Self::CopyRepeat(g) => g.task_id(),
            Self::Saccade(g) => g.task_id(),
        }
    }

    fn observations(&self) -> &Alphabet {
        match self {
            Self::AxCpt(g) => g.observations(),
            Self::TwelveAxCpt(g) => g.observations(),
            Self::TwelveAxS(g) => g.observations(),
            Self::SeqPrediction(g) => g.observations(),
            Self::SimpleCopy(g) => g.observations(),
            Self::CopyV1(g) => g.observations(),
            Self::CopyRepeat(g) => g.observations(),
            Self::Saccade(g) => g.observations(),
        }
    }

    fn actions(&self) -> &Alphabet {
        match self {
            Self::AxCpt(g) => g.actions(),
            Self::TwelveAxCpt(g) => g.actions(),
            Self::TwelveAxS(g) => g.actions(),
            Self::SeqPrediction(g) => g.actions(),
            Self::SimpleCopy(g) => g.actions(),
            Self::CopyV1(g) => g.actions(),
            Self::CopyRepeat(g) => g.actions(),
            Self::Saccade(g) => g.actions(),
        }
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial> {
        match self {
            Self::AxCpt(g) => g.generate(rng),
            Self::TwelveAxCpt(g) => g.generate(rng),
            Self::TwelveAxS(g) => g.generate(rng),
            Self::SeqPrediction(g) => g.generate(rng),
            Self::SimpleCopy(g) => g.generate(rng),
            Self::CopyV1(g) => g.generate(rng),
            Self::CopyRepeat(g) => g.generate(rng),
            Self::Saccade(g) => g.generate(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ids_round_trip_through_strings() {
        for id in TaskId::ALL {
            assert_eq!(id.as_str().parse::<TaskId>().unwrap(), id);
        }
        assert_eq!("saccade".parse::<TaskId>().unwrap(), TaskId::Saccade);
        assert_eq!("12_ax_s".parse::<TaskId>().unwrap(), TaskId::TwelveAxS);
        assert!(matches!(
            "nope-v0".parse::<TaskId>(),
            Err(TaskError::UnknownTask(_))
        ));
    }

    #[test]
    fn every_task_builds_with_defaults() {
        let config = CogTasksConfig::default();
        for id in TaskId::ALL {
            let g = AnyGrammar::build(id, &config).unwrap();
            assert_eq!(g.task_id(), id);
            assert!(!g.observations().is_empty());
            assert!(!g.actions().is_empty());
        }
    }

    #[test]
    fn copy_mode_switches_only_copy_v1() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let config = CogTasksConfig::default();
        let mut g = AnyGrammar::build(TaskId::SimpleCopyV1, &config).unwrap();
        g.set_copy_mode("minor".parse().unwrap()).unwrap();
        let n_char = config.copy_v1.n_char;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let trial = g.generate(&mut rng).unwrap();
            assert_eq!(trial.len(), config.copy_v1.size);
            assert!(trial
                .observations
                .iter()
                .enumerate()
                .any(|(i, &c)| c == i % n_char));
        }

        let mut other = AnyGrammar::build(TaskId::SimpleCopy, &config).unwrap();
        assert!(matches!(
            other.set_copy_mode(CopyMode::Major),
            Err(TaskError::InvalidConfig(_))
        ));
    }

    #[test]
    fn payoff_scoring() {
        assert_eq!(Payoff::SIGNED.score(true), 1.0);
        assert_eq!(Payoff::SIGNED.score(false), -1.0);
        let trial = Trial::uniform(vec![0, 1], vec![1, 0], "AB".into());
        assert_eq!(trial.len(), 2);
        assert_eq!(trial.max_return(), 2.0);
    }
}
