//! Copy tasks.
//!
//! - **Simple copy**: reproduce the input sequence symbol by symbol. The
//!   length is drawn from the half-open range `lo..hi` on every reset.
//! - **Simple copy v1**: fixed length, with three generation modes that
//!   control how often a letter lands on its "home" position
//!   (`ALPHABET[i % n_char]` at position `i`).
//! - **Copy-repeat**: after the input is shown, keep answering until the
//!   input has been reproduced `repeat` times, reversing every second copy.
//!   Once the input is exhausted the agent observes an `Empty` symbol.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::alphabet::{Alphabet, LETTERS};
use super::{Grammar, TaskId, Trial};
use crate::config::{CopyRepeatConfig, CopyV1Config, SimpleCopyConfig};
use crate::error::{TaskError, TaskResult};

/// Observation shown after the copy-repeat input has been exhausted.
pub const EMPTY: &str = "Empty";

/// Concatenate `repeat` copies of `input`, reversing every second copy.
///
/// `copy_repeat_target("ABCDE", 3) == "ABCDEEDCBAABCDE"`.
pub fn copy_repeat_target(input: &str, repeat: usize) -> String {
    let reversed: String = input.chars().rev().collect();
    (0..repeat)
        .map(|i| if i % 2 == 1 { reversed.as_str() } else { input })
        .collect()
}

fn random_letters<R: Rng + ?Sized>(rng: &mut R, n_char: usize, len: usize) -> Vec<usize> {
    (0..len).map(|_| rng.gen_range(0..n_char)).collect()
}

fn letters_text(indices: &[usize]) -> String {
    indices.iter().map(|&i| LETTERS[i]).collect()
}

// ---------------------------------------------------------------------------
// Simple copy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimpleCopy {
    n_char: usize,
    len_range: (usize, usize),
    alphabet: Alphabet,
}

impl SimpleCopy {
    pub fn new(config: &SimpleCopyConfig) -> TaskResult<Self> {
        let (lo, hi) = config.len_range;
        if lo == 0 || lo >= hi {
            return Err(TaskError::InvalidConfig(format!(
                "copy length range must satisfy 1 <= lo < hi, got ({lo}, {hi})"
            )));
        }
        Ok(Self {
            n_char: config.n_char,
            len_range: config.len_range,
            alphabet: Alphabet::letters(config.n_char, None)?,
        })
    }
}

impl Grammar for SimpleCopy {
    fn task_id(&self) -> TaskId {
        TaskId::SimpleCopy
    }

    fn observations(&self) -> &Alphabet {
        &self.alphabet
    }

    fn actions(&self) -> &Alphabet {
        &self.alphabet
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial> {
        let (lo, hi) = self.len_range;
        let len = rng.gen_range(lo..hi);
        let input = random_letters(rng, self.n_char, len);
        let text = letters_text(&input);
        Ok(Trial::uniform(input.clone(), input, text))
    }
}

// ---------------------------------------------------------------------------
// Simple copy v1
// ---------------------------------------------------------------------------

/// How the v1 copy task generates its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMode {
    /// Uniform letters at every position.
    #[default]
    Full,
    /// No letter ever sits on its home position.
    Major,
    /// At least one letter sits on its home position.
    Minor,
}

impl CopyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Major => "major",
            Self::Minor => "minor",
        }
    }
}

impl fmt::Display for CopyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CopyMode {
    type Err = TaskError;

    /// Case-insensitive: `"full"`, `"major"` or `"minor"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            other => Err(TaskError::InvalidConfig(format!(
                "unknown copy mode '{other}' (expected full, major or minor)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CopyV1 {
    n_char: usize,
    size: usize,
    mode: CopyMode,
    alphabet: Alphabet,
}

impl CopyV1 {
    pub fn new(config: &CopyV1Config) -> TaskResult<Self> {
        if config.size == 0 {
            return Err(TaskError::InvalidConfig("copy size must be at least 1".into()));
        }
        if config.mode == CopyMode::Major && config.n_char < 2 {
            return Err(TaskError::InvalidConfig(
                "major mode needs at least two letters".into(),
            ));
        }
        Ok(Self {
            n_char: config.n_char,
            size: config.size,
            mode: config.mode,
            alphabet: Alphabet::letters(config.n_char, None)?,
        })
    }

    /// Switch the generation mode; takes effect on the next reset.
    pub fn set_mode(&mut self, mode: CopyMode) -> TaskResult<()> {
        if mode == CopyMode::Major && self.n_char < 2 {
            return Err(TaskError::InvalidConfig(
                "major mode needs at least two letters".into(),
            ));
        }
        self.mode = mode;
        Ok(())
    }

    fn gen_major<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        (0..self.size)
            .map(|i| {
                let home = i % self.n_char;
                // Draw from the n_char - 1 letters other than `home`.
                let c = rng.gen_range(0..self.n_char - 1);
                if c >= home {
                    c + 1
                } else {
                    c
                }
            })
            .collect()
    }

    fn gen_minor<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        loop {
            let input = random_letters(rng, self.n_char, self.size);
            if input.iter().enumerate().any(|(i, &c)| c == i % self.n_char) {
                return input;
            }
        }
    }
}

impl Grammar for CopyV1 {
    fn task_id(&self) -> TaskId {
        TaskId::SimpleCopyV1
    }

    fn observations(&self) -> &Alphabet {
        &self.alphabet
    }

    fn actions(&self) -> &Alphabet {
        &self.alphabet
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial> {
        let input = match self.mode {
            CopyMode::Full => random_letters(rng, self.n_char, self.size),
            CopyMode::Major => self.gen_major(rng),
            CopyMode::Minor => self.gen_minor(rng),
        };
        let text = letters_text(&input);
        Ok(Trial::uniform(input.clone(), input, text))
    }
}

// ---------------------------------------------------------------------------
// Copy-repeat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CopyRepeat {
    n_char: usize,
    size: usize,
    repeat: usize,
    observations: Alphabet,
    actions: Alphabet,
}

impl CopyRepeat {
    pub fn new(config: &CopyRepeatConfig) -> TaskResult<Self> {
        if config.size == 0 || config.repeat == 0 {
            return Err(TaskError::InvalidConfig(format!(
                "copy-repeat needs size >= 1 and repeat >= 1, got size={} repeat={}",
                config.size, config.repeat
            )));
        }
        Ok(Self {
            n_char: config.n_char,
            size: config.size,
            repeat: config.repeat,
            observations: Alphabet::letters(config.n_char, Some(EMPTY))?,
            actions: Alphabet::letters(config.n_char, None)?,
        })
    }

    /// Number of decisions per episode (`size * repeat`).
    pub fn target_length(&self) -> usize {
        self.size * self.repeat
    }
}

impl Grammar for CopyRepeat {
    fn task_id(&self) -> TaskId {
        TaskId::SimpleCopyRepeat
    }

    fn observations(&self) -> &Alphabet {
        &self.observations
    }

    fn actions(&self) -> &Alphabet {
        &self.actions
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial> {
        let input = random_letters(rng, self.n_char, self.size);
        let text = letters_text(&input);
        let target = copy_repeat_target(&text, self.repeat);

        let empty = self.observations.idx(EMPTY);
        let mut observations = input;
        observations.resize(self.target_length(), empty);

        let targets = target
            .chars()
            .map(|c| (c as u8 - b'A') as usize)
            .collect();
        Ok(Trial::uniform(observations, targets, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn copy_repeat_alternates_reversal() {
        assert_eq!(copy_repeat_target("ABCDE", 3), "ABCDEEDCBAABCDE");
        assert_eq!(copy_repeat_target("AB", 1), "AB");
        assert_eq!(copy_repeat_target("AB", 4), "ABBAABBA");
    }

    #[test]
    fn simple_copy_is_identity() {
        let g = SimpleCopy::new(&SimpleCopyConfig {
            n_char: 5,
            len_range: (4, 20),
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(10);
        for _ in 0..200 {
            let trial = g.generate(&mut rng).unwrap();
            assert!((4..20).contains(&trial.len()));
            assert_eq!(trial.targets, trial.observations);
            assert_eq!(g.actions().render(&trial.targets), trial.input);
            assert!(trial.input.chars().all(|c| ('A'..='E').contains(&c)));
        }
    }

    #[test]
    fn simple_copy_never_reaches_upper_bound() {
        let g = SimpleCopy::new(&SimpleCopyConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(20);
        let lengths: Vec<usize> = (0..2000)
            .map(|_| g.generate(&mut rng).unwrap().len())
            .collect();
        assert!(lengths.iter().all(|&n| (4..20).contains(&n)));
        assert!(lengths.contains(&4));
        assert!(lengths.contains(&19));
    }

    #[test]
    fn simple_copy_rejects_empty_range() {
        assert!(SimpleCopy::new(&SimpleCopyConfig {
            n_char: 5,
            len_range: (0, 3)
        })
        .is_err());
        assert!(SimpleCopy::new(&SimpleCopyConfig {
            n_char: 5,
            len_range: (5, 3)
        })
        .is_err());
        assert!(SimpleCopy::new(&SimpleCopyConfig {
            n_char: 5,
            len_range: (4, 4)
        })
        .is_err());
    }

    #[test]
    fn copy_v1_major_avoids_home_positions() {
        let g = CopyV1::new(&CopyV1Config {
            n_char: 3,
            size: 12,
            mode: CopyMode::Major,
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let trial = g.generate(&mut rng).unwrap();
            assert_eq!(trial.len(), 12);
            for (i, &c) in trial.observations.iter().enumerate() {
                assert_ne!(c, i % 3);
                assert!(c < 3);
            }
        }
    }

    #[test]
    fn copy_v1_minor_hits_a_home_position() {
        let mut g = CopyV1::new(&CopyV1Config {
            n_char: 5,
            size: 4,
            mode: CopyMode::Full,
        })
        .unwrap();
        g.set_mode(CopyMode::Minor).unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..200 {
            let trial = g.generate(&mut rng).unwrap();
            assert!(trial
                .observations
                .iter()
                .enumerate()
                .any(|(i, &c)| c == i % 5));
            assert_eq!(trial.targets, trial.observations);
        }
    }

    #[test]
    fn copy_v1_major_needs_two_letters() {
        assert!(CopyV1::new(&CopyV1Config {
            n_char: 1,
            size: 3,
            mode: CopyMode::Major
        })
        .is_err());
        assert_eq!("MINOR".parse::<CopyMode>(), Ok(CopyMode::Minor));
        assert!(matches!(
            "other".parse::<CopyMode>(),
            Err(TaskError::InvalidConfig(_))
        ));
    }

    #[test]
    fn copy_repeat_pads_with_empty() {
        let g = CopyRepeat::new(&CopyRepeatConfig {
            n_char: 5,
            size: 6,
            repeat: 3,
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        let trial = g.generate(&mut rng).unwrap();
        assert_eq!(trial.len(), 18);
        assert_eq!(trial.observations.len(), 18);
        let empty = g.observations().index_of(EMPTY).unwrap();
        assert_eq!(empty, 5);
        assert!(trial.observations[6..].iter().all(|&o| o == empty));
        assert_eq!(
            g.actions().render(&trial.targets),
            copy_repeat_target(&trial.input, 3)
        );
    }
}
