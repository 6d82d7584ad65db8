//! Episode stepping for the task grammars.
//!
//! Every environment implements the [`Environment`] trait so that the trajectory
//! collector and the CLI can interact with it uniformly. [`TaskEnv`] is the one
//! concrete implementation: it pairs any [`Grammar`](crate::tasks::Grammar)
//! with a seeded random source and tracks the running [`Episode`].
//!
//! Use [`make`] to build an environment from a registry id.

pub mod episode;
pub mod render;
pub mod task;
pub mod traits;

pub use episode::Episode;
pub use task::TaskEnv;
pub use traits::{Environment, StepInfo, Transition};

use crate::config::CogTasksConfig;
use crate::error::TaskResult;
use crate::tasks::{AnyGrammar, TaskId};

/// Build the environment registered under `id`, configured from its section
/// of `config`.
pub fn make(id: TaskId, config: &CogTasksConfig, seed: Option<u64>) -> TaskResult<TaskEnv> {
    let grammar = AnyGrammar::build(id, config)?;
    Ok(TaskEnv::new(grammar, seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_every_registered_task() {
        let config = CogTasksConfig::default();
        for id in TaskId::ALL {
            let mut env = make(id, &config, Some(11)).unwrap();
            assert_eq!(env.task_id(), id);
            let first = env.reset().unwrap();
            assert!(first < env.observation_space());
            assert!(!env.is_done());
        }
    }

    #[test]
    fn make_propagates_config_errors() {
        let mut config = CogTasksConfig::default();
        config.simple_copy.len_range = (5, 2);
        assert!(make(TaskId::SimpleCopy, &config, None).is_err());
    }
}
