//! Text transcripts of an episode, with ANSI colouring of the responses.

use std::io::{self, Write};

use super::episode::Episode;
use crate::tasks::{Alphabet, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Self::Red => 31,
            Self::Green => 32,
        }
    }
}

/// Wrap `text` in an ANSI colour escape. `highlight` colours the background
/// instead of the foreground.
pub fn colorize(text: &str, color: Color, highlight: bool) -> String {
    let code = if highlight {
        color.code() + 10
    } else {
        color.code()
    };
    format!("\x1b[{code}m{text}\x1b[0m")
}

/// Responses given so far, green where they matched the target and red
/// where they did not.
fn colored_outputs(episode: &Episode, actions: &Alphabet) -> String {
    let sep = if actions.is_compact() { "" } else { " " };
    episode
        .outputs()
        .iter()
        .zip(&episode.trial().targets)
        .map(|(&out, &target)| {
            let color = if out == target { Color::Green } else { Color::Red };
            colorize(actions.symbol(out).unwrap_or("?"), color, true)
        })
        .collect::<Vec<_>>()
        .join(sep)
}

/// Write the transcript of `episode` (or a placeholder before the first
/// reset). Reads only; never changes the episode.
pub fn write_transcript(
    out: &mut dyn Write,
    task: TaskId,
    episode: Option<&Episode>,
    actions: &Alphabet,
) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(20))?;
    writeln!(out, "Task     : {task}")?;
    let Some(episode) = episode else {
        writeln!(out, "(no episode; call reset)")?;
        return writeln!(out);
    };

    let trial = episode.trial();
    writeln!(out, "Length   : {}", trial.input.chars().count())?;
    if trial.len() != trial.input.chars().count() {
        writeln!(out, "T-Length : {}", trial.len())?;
    }
    writeln!(out, "Input    : {}", trial.input)?;
    writeln!(out, "Target   : {}", actions.render(&trial.targets))?;
    writeln!(out, "Output   : {}", colored_outputs(episode, actions))?;
    if !trial.phases.is_empty() {
        let phase = episode.phase().map_or("Done", |p| p.as_str());
        writeln!(out, "Phase    : {phase} (step {})", episode.position())?;
    }
    if let Some(last) = episode.last_reward() {
        writeln!(out, "{}", "-".repeat(20))?;
        writeln!(out, "Current reward:   {last:.2}")?;
        writeln!(out, "Cumulative reward:   {:.2}", episode.total_reward())?;
    }
    writeln!(out)
}
