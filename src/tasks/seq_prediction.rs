//! Sequence prediction over the two abstract sequences `A-B-C-D` and
//! `X-B-C-Y`.
//!
//! The agent sees `ABC` or `XBC` and must predict the next symbol at every
//! step. After `C` the correct prediction depends on whether the triple opened
//! with `A` (predict `D`) or `X` (predict `Y`).

use rand::Rng;

use super::alphabet::Alphabet;
use super::{Grammar, TaskId, Trial};
use crate::config::SeqPredictionConfig;
use crate::error::{TaskError, TaskResult};

const TRIPLES: [(&str, &str); 2] = [("ABC", "BCD"), ("XBC", "BCY")];

#[derive(Debug, Clone)]
pub struct SeqPrediction {
    size: usize,
    p: f64,
    observations: Alphabet,
    actions: Alphabet,
}

impl SeqPrediction {
    pub fn new(config: &SeqPredictionConfig) -> TaskResult<Self> {
        if config.size == 0 {
            return Err(TaskError::InvalidConfig(
                "sequence prediction size must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&config.p) {
            return Err(TaskError::InvalidConfig(format!(
                "p must be in [0, 1], got {}",
                config.p
            )));
        }
        Ok(Self {
            size: config.size,
            p: config.p,
            observations: Alphabet::new(&["A", "B", "C", "X"])?,
            actions: Alphabet::new(&["B", "C", "D", "Y"])?,
        })
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> (&'static str, &'static str) {
        if rng.gen_bool(self.p) {
            TRIPLES[0]
        } else {
            TRIPLES[1]
        }
    }
}

impl Grammar for SeqPrediction {
    fn task_id(&self) -> TaskId {
        TaskId::SeqPrediction
    }

    fn observations(&self) -> &Alphabet {
        &self.observations
    }

    fn actions(&self) -> &Alphabet {
        &self.actions
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskResult<Trial> {
        let mut input = String::with_capacity(self.size);
        let mut target = String::with_capacity(self.size);
        for _ in 0..self.size / 3 {
            let (i, t) = self.draw(rng);
            input.push_str(i);
            target.push_str(t);
        }
        // A trailing partial triple keeps the requested length exact.
        let remainder = self.size % 3;
        let (i, t) = self.draw(rng);
        input.push_str(&i[..remainder]);
        target.push_str(&t[..remainder]);

        let observations = input
            .chars()
            .map(|c| self.observations.idx(c.encode_utf8(&mut [0u8; 4])))
            .collect();
        let targets = target
            .chars()
            .map(|c| self.actions.idx(c.encode_utf8(&mut [0u8; 4])))
            .collect();
        Ok(Trial::uniform(observations, targets, input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grammar(size: usize, p: f64) -> SeqPrediction {
        SeqPrediction::new(&SeqPredictionConfig { size, p }).unwrap()
    }

    #[test]
    fn exact_length_for_every_remainder() {
        let mut rng = StdRng::seed_from_u64(20);
        for size in 1..=12 {
            let trial = grammar(size, 0.5).generate(&mut rng).unwrap();
            assert_eq!(trial.len(), size);
            assert_eq!(trial.input.len(), size);
        }
    }

    #[test]
    fn prediction_after_c_depends_on_opening_symbol() {
        let g = grammar(99, 0.5);
        let mut rng = StdRng::seed_from_u64(21);
        let trial = g.generate(&mut rng).unwrap();
        let input: Vec<char> = trial.input.chars().collect();
        let target: Vec<char> = g.actions().render(&trial.targets).chars().collect();
        for i in (0..input.len()).step_by(3) {
            assert_eq!(&target[i..i + 2], &['B', 'C']);
            let expected = if input[i] == 'A' { 'D' } else { 'Y' };
            assert_eq!(target[i + 2], expected);
        }
    }

    #[test]
    fn degenerate_probability_fixes_the_sequence() {
        let mut rng = StdRng::seed_from_u64(22);
        let trial = grammar(7, 1.0).generate(&mut rng).unwrap();
        assert_eq!(trial.input, "ABCABCA");
        let trial = grammar(8, 0.0).generate(&mut rng).unwrap();
        assert_eq!(trial.input, "XBCXBCXB");
        assert!(SeqPrediction::new(&SeqPredictionConfig { size: 3, p: 1.5 }).is_err());
    }
}
