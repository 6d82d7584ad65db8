//! AX-family continuous performance tasks.
//!
//! - **AX-CPT**: context cues (`A`, `B`) and target cues (`X`, `Y`) alternate.
//!   The correct response is `R` on an `X` that directly follows an `A`, and
//!   `L` everywhere else.
//! - **12-AX-CPT**: the stream also contains the digits `1` and `2`. The most
//!   recent digit selects the rewarded pair: after `1` it is `AX`, after `2` it
//!   is `BY`. Digits may reappear at any point in the stream.
//! - **12-AX-S**: a single leading digit followed by a short, randomly sized
//!   run of pairs drawn from `{A,B} x {X,Y}`.
//!
//! Both 12-AX variants share the same lookback rule ([`twelve_ax_targets`]).

use rand::seq::SliceRandom;
use rand::Rng;

use super::alphabet::Alphabet;
use super::sampler::ClassDistribution;
use super::{Grammar, TaskId, Trial};
use crate::config::{AxCptConfig, TwelveAxCptConfig, TwelveAxSConfig};
use crate::error::{TaskError, TaskResult};

const DIGITS: [&str; 2] = ["1", "2"];
const ACTIONS: [&str; 2] = ["L", "R"];

/// Uniform draw from a fixed symbol set.
fn draw<'a, R: Rng + ?Sized>(rng: &mut R, symbols: &[&'a str]) -> TaskResult<&'a str> {
    symbols
        .choose(rng)
        .copied()
        .ok_or_else(|| TaskError::InvalidConfig("cannot draw from an empty symbol set".into()))
}

/// Correct responses for an AX-CPT stimulus string.
///
/// `R` exactly where the previous stimulus is `A` and the current one is `X`.
pub fn ax_cpt_targets(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if i > 0 && chars[i - 1] == 'A' && c == 'X' {
                'R'
            } else {
                'L'
            }
        })
        .collect()
}

/// Correct responses for a 12-AX chunk stream.
///
/// Each chunk is either a digit (`"1"`/`"2"`) or a two-letter pair. A digit
/// is remembered and answered with `L`; a pair is answered `LR` when it is
/// the pair selected by the remembered digit (`AX` for `1`, `BY` for `2`) and
/// `LL` otherwise. A pair seen before any digit is never rewarded.
pub fn twelve_ax_targets<S: AsRef<str>>(chunks: &[S]) -> String {
    let mut last_digit: Option<&str> = None;
    let mut target = String::new();
    for chunk in chunks {
        let chunk = chunk.as_ref();
        match chunk {
            "1" | "2" => {
                last_digit = Some(chunk);
                target.push('L');
            }
            pair => {
                let rewarded = matches!((last_digit, pair), (Some("1"), "AX") | (Some("2"), "BY"));
                target.push_str(if rewarded { "LR" } else { "LL" });
            }
        }
    }
    target
}

/// Map a string of single-character symbols onto alphabet indices.
fn encode(alphabet: &Alphabet, text: &str) -> Vec<usize> {
    let mut buf = [0u8; 4];
    text.chars()
        .map(|c| alphabet.idx(c.encode_utf8(&mut buf)))
        .collect()
}

/// All two-letter combinations of a context letter followed by a target letter.
fn pairs(contexts: &[&str], targets: &[&str]) -> Vec<String> {
    contexts
        .iter()
        .flat_map(|c| targets.iter().map(move |t| format!("{c}{t}")))
        .collect()
}

// ---------------------------------------------------------------------------
// AX-CPT
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AxCpt {
    size: usize,
    observations: Alphabet,
    actions: Alphabet,
}

impl AxCpt {
    const CONTEXT: [&'static str; 2] = ["A", "B"];
    const TARGET: [&'static str; 2] = ["X", "Y"];

    pub fn new(config: &AxCptConfig) -> TaskResult<Self> {
        if config.size == 0 {
            return Err(TaskError::InvalidConfig("AX-CPT size must be at least 1".into()));
        }
        Ok(Self {
            size: config.size,
            observations: Alphabet::new(&["A", "B", "X", "Y"])?,
            actions: Alphabet::new(&ACTIONS)?,
        })
    }
}

impl Grammar for AxCpt {
    fn task_id(&self) -> TaskId {
        TaskId::AxCpt
    }

    fn observations(&self) -> &Alphabet {
        &self.observations
    }

    fn actions(&self) -> &Alphabet {
        &self.actions
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial> {
        let input = (0..self.size)
            .map(|i| {
                let cues = if i % 2 == 0 {
                    &Self::CONTEXT
                } else {
                    &Self::TARGET
                };
                draw(rng, cues)
            })
            .collect::<TaskResult<String>>()?;
        let target = ax_cpt_targets(&input);
        Ok(Trial::uniform(
            encode(&self.observations, &input),
            encode(&self.actions, &target),
            input,
        ))
    }
}

// ---------------------------------------------------------------------------
// 12-AX-CPT
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TwelveAxCpt {
    size: usize,
    chunks: ClassDistribution,
    observations: Alphabet,
    actions: Alphabet,
}

impl TwelveAxCpt {
    pub fn new(config: &TwelveAxCptConfig) -> TaskResult<Self> {
        if config.size == 0 {
            return Err(TaskError::InvalidConfig("12-AX-CPT size must be at least 1".into()));
        }
        let mut classes = pairs(&["A", "B", "C"], &["X", "Y", "Z"]);
        classes.extend(DIGITS.iter().map(|d| d.to_string()));
        let half_target = config.prob_target / 2.0;
        let half_digit = config.prob_12 / 2.0;
        let chunks = ClassDistribution::with_reserved(
            &classes,
            &[
                ("AX", half_target),
                ("BY", half_target),
                ("1", half_digit),
                ("2", half_digit),
            ],
        )?;
        Ok(Self {
            size: config.size,
            chunks,
            observations: Alphabet::new(&["1", "2", "A", "B", "C", "X", "Y", "Z"])?,
            actions: Alphabet::new(&ACTIONS)?,
        })
    }

    /// The chunk distribution, exposed for inspection.
    pub fn chunk_distribution(&self) -> &ClassDistribution {
        &self.chunks
    }
}

impl Grammar for TwelveAxCpt {
    fn task_id(&self) -> TaskId {
        TaskId::TwelveAxCpt
    }

    fn observations(&self) -> &Alphabet {
        &self.observations
    }

    fn actions(&self) -> &Alphabet {
        &self.actions
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial> {
        let mut chunks: Vec<&str> = vec![draw(rng, &DIGITS)?];
        let mut len = 1;
        while len < self.size {
            let chunk = self.chunks.sample(rng);
            len += chunk.len();
            chunks.push(chunk);
        }
        let input: String = chunks.concat();
        let target = twelve_ax_targets(&chunks);
        Ok(Trial::uniform(
            encode(&self.observations, &input),
            encode(&self.actions, &target),
            input,
        ))
    }
}

// ---------------------------------------------------------------------------
// 12-AX-S
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TwelveAxS {
    size_range: (usize, usize),
    chunks: ClassDistribution,
    observations: Alphabet,
    actions: Alphabet,
}

impl TwelveAxS {
    pub fn new(config: &TwelveAxSConfig) -> TaskResult<Self> {
        let (lo, hi) = config.size_range;
        if lo > hi {
            return Err(TaskError::InvalidConfig(format!(
                "12-AX-S size range is empty: ({lo}, {hi})"
            )));
        }
        let classes = pairs(&["A", "B"], &["X", "Y"]);
        let half = config.prob_target / 2.0;
        let chunks = ClassDistribution::with_reserved(&classes, &[("AX", half), ("BY", half)])?;
        Ok(Self {
            size_range: config.size_range,
            chunks,
            observations: Alphabet::new(&["1", "2", "A", "B", "X", "Y"])?,
            actions: Alphabet::new(&ACTIONS)?,
        })
    }
}

impl Grammar for TwelveAxS {
    fn task_id(&self) -> TaskId {
        TaskId::TwelveAxS
    }

    fn observations(&self) -> &Alphabet {
        &self.observations
    }

    fn actions(&self) -> &Alphabet {
        &self.actions
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial> {
        let (lo, hi) = self.size_range;
        let size = rng.gen_range(lo..=hi);
        let mut chunks: Vec<&str> = Vec::with_capacity(size + 1);
        chunks.push(draw(rng, &DIGITS)?);
        for _ in 0..size {
            chunks.push(self.chunks.sample(rng));
        }
        let input: String = chunks.concat();
        let target = twelve_ax_targets(&chunks);
        Ok(Trial::uniform(
            encode(&self.observations, &input),
            encode(&self.actions, &target),
            input,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn draw_covers_the_set_and_rejects_empty() {
        let mut rng = StdRng::seed_from_u64(12);
        let seen: std::collections::HashSet<&str> =
            (0..100).map(|_| draw(&mut rng, &DIGITS).unwrap()).collect();
        assert_eq!(seen.len(), 2);
        assert!(matches!(draw(&mut rng, &[]), Err(TaskError::InvalidConfig(_))));
    }

    #[test]
    fn ax_cpt_rewards_only_ax() {
        assert_eq!(ax_cpt_targets("AXBY"), "LRLL");
        assert_eq!(ax_cpt_targets("BXAY"), "LLLL");
        assert_eq!(ax_cpt_targets("AXAX"), "LRLR");
        assert_eq!(ax_cpt_targets(""), "");
    }

    #[test]
    fn twelve_ax_lookback() {
        assert_eq!(twelve_ax_targets(&["1", "AX"]), "LLR");
        assert_eq!(twelve_ax_targets(&["1", "BY"]), "LLL");
        assert_eq!(twelve_ax_targets(&["2", "BY"]), "LLR");
        assert_eq!(twelve_ax_targets(&["2", "AX"]), "LLL");
        // The remembered digit switches mid-stream.
        assert_eq!(twelve_ax_targets(&["1", "AX", "2", "AX", "BY"]), "LLRLLLLR");
        // Pairs before any digit are never rewarded.
        assert_eq!(twelve_ax_targets(&["AX", "1"]), "LLL");
    }

    #[test]
    fn ax_cpt_alternates_context_and_target() {
        let g = AxCpt::new(&AxCptConfig { size: 50 }).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let trial = g.generate(&mut rng).unwrap();
        assert_eq!(trial.len(), 50);
        for (i, c) in trial.input.chars().enumerate() {
            if i % 2 == 0 {
                assert!(c == 'A' || c == 'B');
            } else {
                assert!(c == 'X' || c == 'Y');
            }
        }
        assert_eq!(g.actions().render(&trial.targets), ax_cpt_targets(&trial.input));
    }

    #[test]
    fn twelve_ax_cpt_length_and_targets() {
        let cfg = TwelveAxCptConfig {
            size: 101,
            prob_target: 0.5,
            prob_12: 0.1,
        };
        let g = TwelveAxCpt::new(&cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..20 {
            let trial = g.generate(&mut rng).unwrap();
            assert!(trial.len() == 101 || trial.len() == 102);
            assert_eq!(trial.observations.len(), trial.targets.len());
            assert_eq!(trial.input.chars().count(), trial.len());
            let first = trial.input.chars().next().unwrap();
            assert!(first == '1' || first == '2');
        }
    }

    #[test]
    fn twelve_ax_cpt_probabilities() {
        let cfg = TwelveAxCptConfig {
            size: 10,
            prob_target: 0.5,
            prob_12: 0.1,
        };
        let g = TwelveAxCpt::new(&cfg).unwrap();
        let d = g.chunk_distribution();
        assert!((d.prob("AX") - 0.25).abs() < 1e-12);
        assert!((d.prob("2") - 0.05).abs() < 1e-12);
        assert!((d.prob("CZ") - 0.4 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn twelve_ax_cpt_zero_digit_mass_never_repeats_digits() {
        let cfg = TwelveAxCptConfig {
            size: 10_000,
            prob_target: 0.5,
            prob_12: 0.0,
        };
        let g = TwelveAxCpt::new(&cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let trial = g.generate(&mut rng).unwrap();
        let digits = trial.input.chars().filter(|c| c.is_ascii_digit()).count();
        assert_eq!(digits, 1, "only the leading digit may appear");
    }

    #[test]
    fn twelve_ax_cpt_rejects_excess_mass() {
        let cfg = TwelveAxCptConfig {
            size: 10,
            prob_target: 0.8,
            prob_12: 0.4,
        };
        assert!(TwelveAxCpt::new(&cfg).is_err());
    }

    #[test]
    fn twelve_ax_s_size_in_range() {
        let cfg = TwelveAxSConfig {
            size_range: (1, 4),
            prob_target: 0.5,
        };
        let g = TwelveAxS::new(&cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let trial = g.generate(&mut rng).unwrap();
            let pairs = (trial.len() - 1) / 2;
            assert!((1..=4).contains(&pairs));
            seen[pairs] = true;
            assert_eq!(
                g.actions().render(&trial.targets),
                {
                    let mut chunks = vec![trial.input[..1].to_string()];
                    chunks.extend(
                        trial.input.as_bytes()[1..]
                            .chunks(2)
                            .map(|c| String::from_utf8_lossy(c).into_owned()),
                    );
                    twelve_ax_targets(&chunks)
                }
            );
        }
        assert!(seen[1..].iter().all(|&s| s), "every size should be drawn");
    }

    #[test]
    fn twelve_ax_s_only_targets_when_all_mass_on_targets() {
        let cfg = TwelveAxSConfig {
            size_range: (3, 3),
            prob_target: 1.0,
        };
        let g = TwelveAxS::new(&cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let trial = g.generate(&mut rng).unwrap();
            assert!(!trial.input.contains("AY") && !trial.input.contains("BX"));
        }
        assert!(TwelveAxS::new(&TwelveAxSConfig {
            size_range: (4, 1),
            prob_target: 0.5
        })
        .is_err());
    }
}
