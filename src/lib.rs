//! cogtasks: cognitive-task environments for sequential decision making.
//!
//! Small discrete-time tasks from working-memory and cognitive-control
//! research (AX-CPT, 12-AX, copy, copy-repeat, sequence prediction and
//! pro/anti-saccade), each exposed through a reset/step/seed/render
//! environment, plus baseline policies and trajectory collection.

pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod tasks;
pub mod trajectory;

pub use error::{TaskError, TaskResult};
