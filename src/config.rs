use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::tasks::CopyMode;

/// Complete configuration: one section per task.
///
/// Every section is optional in JSON; missing sections fall back to their
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CogTasksConfig {
    pub ax_cpt: AxCptConfig,
    pub twelve_ax_cpt: TwelveAxCptConfig,
    pub twelve_ax_s: TwelveAxSConfig,
    pub seq_prediction: SeqPredictionConfig,
    pub simple_copy: SimpleCopyConfig,
    pub copy_v1: CopyV1Config,
    pub copy_repeat: CopyRepeatConfig,
    pub saccade: SaccadeConfig,
}

impl CogTasksConfig {
    /// Read a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

/// AX-CPT.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxCptConfig {
    /// Number of stimuli per episode (default: 500).
    pub size: usize,
}

/// 12-AX-CPT.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwelveAxCptConfig {
    /// Minimum number of symbols per episode; may be exceeded by one
    /// (default: 1000).
    pub size: usize,
    /// Probability of drawing `AX` or `BY`, split evenly (default: 0.5).
    pub prob_target: f64,
    /// Probability of drawing a digit, split evenly (default: 0.1).
    pub prob_12: f64,
}

/// 12-AX-S.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwelveAxSConfig {
    /// Inclusive range for the number of pairs after the digit (default: 1..=4).
    pub size_range: (usize, usize),
    /// Probability of drawing `AX` or `BY`, split evenly (default: 0.5).
    pub prob_target: f64,
}

/// Sequence prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeqPredictionConfig {
    /// Number of symbols per episode (default: 100).
    pub size: usize,
    /// Probability of `ABC` rather than `XBC` (default: 0.5).
    pub p: f64,
}

/// Simple copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleCopyConfig {
    /// Number of distinct letters (default: 5).
    pub n_char: usize,
    /// Length range, upper bound excluded (default: 4..20).
    pub len_range: (usize, usize),
}

/// Simple copy v1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyV1Config {
    /// Number of distinct letters (default: 5).
    pub n_char: usize,
    /// Sequence length (default: 10).
    pub size: usize,
    /// Generation mode (default: full).
    pub mode: CopyMode,
}

/// Copy-repeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyRepeatConfig {
    /// Number of distinct letters (default: 5).
    pub n_char: usize,
    /// Input length (default: 6).
    pub size: usize,
    /// How many copies the agent must produce (default: 3).
    pub repeat: usize,
}

/// Saccade / anti-saccade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SaccadeConfig {
    /// Reward for the correct eye movement in the Go phase (default: 10).
    pub go_reward: f64,
}

impl Default for AxCptConfig {
    fn default() -> Self {
        Self { size: 500 }
    }
}

impl Default for TwelveAxCptConfig {
    fn default() -> Self {
        Self {
            size: 1000,
            prob_target: 0.5,
            prob_12: 0.1,
        }
    }
}

impl Default for TwelveAxSConfig {
    fn default() -> Self {
        Self {
            size_range: (1, 4),
            prob_target: 0.5,
        }
    }
}

impl Default for SeqPredictionConfig {
    fn default() -> Self {
        Self { size: 100, p: 0.5 }
    }
}

impl Default for SimpleCopyConfig {
    fn default() -> Self {
        Self {
            n_char: 5,
            len_range: (4, 20),
        }
    }
}

impl Default for CopyV1Config {
    fn default() -> Self {
        Self {
            n_char: 5,
            size: 10,
            mode: CopyMode::Full,
        }
    }
}

impl Default for CopyRepeatConfig {
    fn default() -> Self {
        Self {
            n_char: 5,
            size: 6,
            repeat: 3,
        }
    }
}

impl Default for SaccadeConfig {
    fn default() -> Self {
        Self { go_reward: 10.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "saccade": { "go_reward": 4.0 }, "copy_v1": { "n_char": 3, "size": 7, "mode": "major" } }"#;
        let config: CogTasksConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.saccade.go_reward, 4.0);
        assert_eq!(config.copy_v1.mode, CopyMode::Major);
        assert_eq!(config.copy_v1.size, 7);
        assert_eq!(config.ax_cpt.size, 500);
        assert_eq!(config.twelve_ax_s.size_range, (1, 4));
    }

    #[test]
    fn load_from_file() {
        let tmp = std::env::temp_dir().join(format!("cogtasks_config_{}.json", std::process::id()));
        let mut config = CogTasksConfig::default();
        config.copy_repeat.repeat = 5;
        std::fs::write(&tmp, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = CogTasksConfig::load(&tmp).unwrap();
        assert_eq!(loaded.copy_repeat.repeat, 5);
        assert_eq!(loaded.simple_copy.len_range, (4, 20));

        let _ = std::fs::remove_file(&tmp);
        assert!(CogTasksConfig::load(&tmp).is_err());
    }
}
