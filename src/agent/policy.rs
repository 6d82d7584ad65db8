//! Baseline policies for driving task environments.
//!
//! None of these learn; they exist for smoke runs, for reward baselines and
//! for checking that a task pays out its maximum return to a perfect agent.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::trajectory::collector::{AgentPolicy, PolicyContext};

// ---------------------------------------------------------------------------
// Random
// ---------------------------------------------------------------------------

/// Picks an action uniformly at random at every step.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl AgentPolicy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn select_action(&mut self, ctx: &PolicyContext<'_>) -> Result<usize> {
        if ctx.action_space == 0 {
            bail!("cannot choose from an empty action space");
        }
        Ok(self.rng.gen_range(0..ctx.action_space))
    }
}

// ---------------------------------------------------------------------------
// Constant
// ---------------------------------------------------------------------------

/// Always emits the same action index.
#[derive(Debug, Clone, Copy)]
pub struct ConstantPolicy {
    action: usize,
}

impl ConstantPolicy {
    pub fn new(action: usize) -> Self {
        Self { action }
    }
}

impl AgentPolicy for ConstantPolicy {
    fn name(&self) -> &str {
        "constant"
    }

    fn select_action(&mut self, _ctx: &PolicyContext<'_>) -> Result<usize> {
        Ok(self.action)
    }
}

// ---------------------------------------------------------------------------
// Oracle
// ---------------------------------------------------------------------------

/// Answers with the correct action, except with probability `epsilon` where
/// it answers at random instead.
#[derive(Debug, Clone)]
pub struct OraclePolicy {
    epsilon: f64,
    rng: StdRng,
}

impl OraclePolicy {
    /// A perfect oracle.
    pub fn new() -> Self {
        Self {
            epsilon: 0.0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// An oracle that answers at random with probability `epsilon`.
    pub fn noisy(epsilon: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            bail!("epsilon must be in [0, 1], got {epsilon}");
        }
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self { epsilon, rng })
    }
}

impl Default for OraclePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentPolicy for OraclePolicy {
    fn name(&self) -> &str {
        if self.epsilon > 0.0 {
            "noisy-oracle"
        } else {
            "oracle"
        }
    }

    fn select_action(&mut self, ctx: &PolicyContext<'_>) -> Result<usize> {
        let Some(target) = ctx.episode.target() else {
            bail!("oracle asked to act on a finished episode");
        };
        if self.epsilon > 0.0 && self.rng.gen_bool(self.epsilon) {
            return Ok(self.rng.gen_range(0..ctx.action_space));
        }
        Ok(target)
    }
}

// ---------------------------------------------------------------------------
// PolicyKind / AnyPolicy
// ---------------------------------------------------------------------------

/// Policy names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Random,
    Constant,
    Oracle,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Constant => "constant",
            Self::Oracle => "oracle",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "constant" => Ok(Self::Constant),
            "oracle" => Ok(Self::Oracle),
            other => Err(format!(
                "unknown policy '{other}' (expected random, constant or oracle)"
            )),
        }
    }
}

/// Enum dispatch over the baseline policies, for runtime selection.
#[derive(Debug, Clone)]
pub enum AnyPolicy {
    Random(RandomPolicy),
    Constant(ConstantPolicy),
    Oracle(OraclePolicy),
}

impl AnyPolicy {
    /// Build a policy of the given kind.
    ///
    /// `action` is only used by the constant policy and `epsilon` only by the
    /// oracle.
    pub fn build(kind: PolicyKind, seed: Option<u64>, action: usize, epsilon: f64) -> Result<Self> {
        Ok(match kind {
            PolicyKind::Random => Self::Random(RandomPolicy::new(seed)),
            PolicyKind::Constant => Self::Constant(ConstantPolicy::new(action)),
            PolicyKind::Oracle if epsilon > 0.0 => {
                Self::Oracle(OraclePolicy::noisy(epsilon, seed)?)
            }
            PolicyKind::Oracle => Self::Oracle(OraclePolicy::new()),
        })
    }
}

impl AgentPolicy for AnyPolicy {
    fn name(&self) -> &str {
        match self {
            Self::Random(p) => p.name(),
            Self::Constant(p) => p.name(),
            Self::Oracle(p) => p.name(),
        }
    }

    fn select_action(&mut self, ctx: &PolicyContext<'_>) -> Result<usize> {
        match self {
            Self::Random(p) => p.select_action(ctx),
            Self::Constant(p) => p.select_action(ctx),
            Self::Oracle(p) => p.select_action(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Episode;
    use crate::tasks::Trial;

    fn episode() -> Episode {
        Episode::new(Trial::uniform(vec![0, 1, 2], vec![2, 0, 1], "ABC".into()))
    }

    fn ctx(episode: &Episode) -> PolicyContext<'_> {
        PolicyContext {
            observation: episode.observation().unwrap_or(0),
            action_space: 3,
            episode,
        }
    }

    #[test]
    fn random_stays_in_range_and_is_seeded() {
        let ep = episode();
        let mut a = RandomPolicy::new(Some(5));
        let mut b = RandomPolicy::new(Some(5));
        for _ in 0..100 {
            let x = a.select_action(&ctx(&ep)).unwrap();
            assert!(x < 3);
            assert_eq!(x, b.select_action(&ctx(&ep)).unwrap());
        }
    }

    #[test]
    fn oracle_follows_targets() {
        let mut ep = episode();
        let mut oracle = OraclePolicy::new();
        while !ep.is_done() {
            let a = oracle.select_action(&ctx(&ep)).unwrap();
            assert_eq!(Some(a), ep.target());
            ep.step(a, 3).unwrap();
        }
        assert!(oracle.select_action(&ctx(&ep)).is_err());
    }

    #[test]
    fn noisy_oracle_rejects_bad_epsilon() {
        assert!(OraclePolicy::noisy(1.5, None).is_err());
        assert!(OraclePolicy::noisy(-0.1, None).is_err());
        assert_eq!(OraclePolicy::noisy(0.2, Some(1)).unwrap().name(), "noisy-oracle");
    }

    #[test]
    fn policy_kind_parsing() {
        assert_eq!("Oracle".parse::<PolicyKind>().unwrap(), PolicyKind::Oracle);
        assert!("greedy".parse::<PolicyKind>().is_err());
        let p = AnyPolicy::build(PolicyKind::Constant, None, 1, 0.0).unwrap();
        assert_eq!(p.name(), "constant");
    }
}
