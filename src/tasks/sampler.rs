//! Biased categorical sampling over symbol classes.
//!
//! Several grammars draw "chunks" (a pair such as `AX`, or a lone digit) from
//! a small set of classes where a few classes get an explicitly reserved
//! probability and the remaining mass is spread evenly over the rest.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::{TaskError, TaskResult};

/// A categorical distribution over named classes.
#[derive(Debug, Clone)]
pub struct ClassDistribution {
    classes: Vec<String>,
    probs: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl ClassDistribution {
    /// Build a distribution in which each `(class, p)` in `reserved` gets
    /// exactly `p`, and the remaining `1 - sum(p)` is split evenly across the
    /// classes not listed.
    ///
    /// Classes with zero probability are never sampled. When every class is
    /// reserved, the residual mass must be (numerically) zero.
    pub fn with_reserved<S: AsRef<str>>(classes: &[S], reserved: &[(&str, f64)]) -> TaskResult<Self> {
        let classes: Vec<String> = classes.iter().map(|c| c.as_ref().to_string()).collect();
        if classes.is_empty() {
            return Err(TaskError::InvalidConfig("no classes to sample from".into()));
        }

        let mut probs = vec![f64::NAN; classes.len()];
        let mut reserved_mass = 0.0;
        for &(name, p) in reserved {
            if !(0.0..=1.0).contains(&p) {
                return Err(TaskError::InvalidConfig(format!(
                    "probability for {name:?} must be in [0, 1], got {p}"
                )));
            }
            let pos = classes.iter().position(|c| c == name).ok_or_else(|| {
                TaskError::InvalidConfig(format!("unknown class {name:?}"))
            })?;
            if !probs[pos].is_nan() {
                return Err(TaskError::InvalidConfig(format!(
                    "class {name:?} reserved twice"
                )));
            }
            probs[pos] = p;
            reserved_mass += p;
        }

        let residual = 1.0 - reserved_mass;
        if residual < -1e-9 {
            return Err(TaskError::InvalidConfig(format!(
                "reserved probabilities sum to {reserved_mass}, which exceeds 1"
            )));
        }
        let residual = residual.max(0.0);

        let others = probs.iter().filter(|p| p.is_nan()).count();
        if others == 0 {
            if residual > 1e-9 {
                return Err(TaskError::InvalidConfig(format!(
                    "residual probability {residual} has no class to go to"
                )));
            }
        } else {
            let share = residual / others as f64;
            for p in probs.iter_mut().filter(|p| p.is_nan()) {
                *p = share;
            }
        }

        let index = WeightedIndex::new(&probs).map_err(|e| {
            TaskError::InvalidConfig(format!("degenerate class distribution: {e}"))
        })?;

        Ok(Self {
            classes,
            probs,
            index,
        })
    }

    /// Draw one class name.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.classes[self.index.sample(rng)]
    }

    /// Probability assigned to a class (0 for unknown classes).
    pub fn prob(&self, class: &str) -> f64 {
        self.classes
            .iter()
            .position(|c| c == class)
            .map(|i| self.probs[i])
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PAIRS: [&str; 4] = ["AX", "AY", "BX", "BY"];

    #[test]
    fn residual_is_spread_evenly() {
        let d = ClassDistribution::with_reserved(&PAIRS, &[("AX", 0.25), ("BY", 0.25)]).unwrap();
        assert!((d.prob("AX") - 0.25).abs() < 1e-12);
        assert!((d.prob("AY") - 0.25).abs() < 1e-12);
        assert!((d.prob("BX") - 0.25).abs() < 1e-12);
        let total: f64 = PAIRS.iter().map(|c| d.prob(c)).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_mass_class_is_never_drawn() {
        let d = ClassDistribution::with_reserved(&PAIRS, &[("AX", 0.5), ("BY", 0.5)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let c = d.sample(&mut rng);
            assert!(c == "AX" || c == "BY", "drew zero-mass class {c}");
        }
    }

    #[test]
    fn reserved_zero_is_never_drawn() {
        let d = ClassDistribution::with_reserved(&PAIRS, &[("AX", 0.0), ("BY", 0.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10_000 {
            let c = d.sample(&mut rng);
            assert!(c != "AX" && c != "BY");
        }
    }

    #[test]
    fn all_classes_reserved_without_residual() {
        let d = ClassDistribution::with_reserved(&["1", "2"], &[("1", 0.5), ("2", 0.5)]);
        assert!(d.is_ok());
        let d = ClassDistribution::with_reserved(&["1", "2"], &[("1", 0.2), ("2", 0.2)]);
        assert!(matches!(d, Err(TaskError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_bad_configs() {
        assert!(ClassDistribution::with_reserved(&PAIRS, &[("AX", 0.8), ("BY", 0.8)]).is_err());
        assert!(ClassDistribution::with_reserved(&PAIRS, &[("AX", -0.1)]).is_err());
        assert!(ClassDistribution::with_reserved(&PAIRS, &[("QQ", 0.1)]).is_err());
        assert!(ClassDistribution::with_reserved(&PAIRS, &[("AX", 0.1), ("AX", 0.1)]).is_err());
    }
}
