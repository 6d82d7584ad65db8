//! cogtasks: cognitive-task environments on the command line.
//!
//! Provides subcommands:
//!
//! - `tasks`    -- List the registered tasks
//! - `run`      -- Drive episodes with a baseline policy, optionally rendering
//! - `collect`  -- Collect trajectories and save them as JSON
//! - `inspect`  -- Print statistics of a saved trajectory file

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cogtasks::agent::{AnyPolicy, PolicyKind};
use cogtasks::config::CogTasksConfig;
use cogtasks::env::{self, Environment, TaskEnv};
use cogtasks::tasks::{CopyMode, TaskId};
use cogtasks::trajectory::{AgentPolicy, TrajectoryBuffer, TrajectoryCollector};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Cognitive-task environments for sequential decision making
#[derive(Parser)]
#[command(name = "cogtasks", version, about)]
struct Cli {
    /// Path to a JSON configuration file (uses defaults if not provided).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by `run` and `collect`.
#[derive(clap::Args, Debug)]
struct DriveArgs {
    /// Task id, e.g. `AX_CPT-v0` or `saccade`.
    #[arg(long)]
    task: TaskId,

    /// Baseline policy to drive the task with.
    #[arg(long, default_value = "random")]
    policy: PolicyKind,

    /// Number of episodes.
    #[arg(long, default_value_t = 1)]
    episodes: usize,

    /// Seed for the environment (and the policy). Entropy if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Action index emitted by the constant policy.
    #[arg(long, default_value_t = 0)]
    action: usize,

    /// Probability that the oracle answers at random.
    #[arg(long, default_value_t = 0.0)]
    epsilon: f64,

    /// Input mode for `Simple_Copy_v1-v0` (full, major or minor). Overrides
    /// the configuration file.
    #[arg(long)]
    mode: Option<CopyMode>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered tasks with their observation and action spaces.
    Tasks,

    /// Drive episodes and log the reward of each.
    Run {
        #[command(flatten)]
        drive: DriveArgs,

        /// Print the transcript after every step.
        #[arg(long)]
        render: bool,
    },

    /// Collect trajectories and write them as pretty JSON.
    Collect {
        #[command(flatten)]
        drive: DriveArgs,

        /// Path to save collected trajectories.
        #[arg(long, default_value = "data/trajectories.json")]
        output: PathBuf,

        /// Keep only episode-level data, not every step.
        #[arg(long)]
        summary_only: bool,
    },

    /// Print aggregate statistics of a saved trajectory file.
    Inspect {
        /// Path to the trajectory JSON file.
        #[arg(default_value = "data/trajectories.json")]
        path: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CogTasksConfig::load(path)?,
        None => CogTasksConfig::default(),
    };

    match cli.command {
        Commands::Tasks => cmd_tasks(&config),
        Commands::Run { drive, render } => cmd_run(&config, &drive, render),
        Commands::Collect {
            drive,
            output,
            summary_only,
        } => cmd_collect(&config, &drive, &output, summary_only),
        Commands::Inspect { path } => cmd_inspect(&path),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_tasks(config: &CogTasksConfig) -> Result<()> {
    println!("{:<24} {:>5} {:>5}  description", "task", "obs", "act");
    for id in TaskId::ALL {
        let env = env::make(id, config, Some(0))
            .with_context(|| format!("Failed to build {id} from the configuration"))?;
        println!(
            "{:<24} {:>5} {:>5}  {}",
            id.as_str(),
            env.observation_space(),
            env.action_space(),
            id.description()
        );
    }
    Ok(())
}

fn build_env(config: &CogTasksConfig, drive: &DriveArgs) -> Result<TaskEnv> {
    let mut env = env::make(drive.task, config, drive.seed)
        .with_context(|| format!("Failed to build {}", drive.task))?;
    if let Some(mode) = drive.mode {
        env.grammar_mut()
            .set_copy_mode(mode)
            .with_context(|| format!("Failed to set copy mode {mode}"))?;
    }
    Ok(env)
}

fn build_policy(drive: &DriveArgs) -> Result<AnyPolicy> {
    AnyPolicy::build(drive.policy, drive.seed, drive.action, drive.epsilon)
        .with_context(|| format!("Failed to build the {} policy", drive.policy))
}

fn cmd_run(config: &CogTasksConfig, drive: &DriveArgs, render: bool) -> Result<()> {
    let mut env = build_env(config, drive)?;
    let mut policy = build_policy(drive)?;
    let collector = TrajectoryCollector::summary_only();
    tracing::info!(
        task = %drive.task,
        policy = policy.name(),
        episodes = drive.episodes,
        seed = env.current_seed(),
        "Running episodes"
    );

    let mut buffer = TrajectoryBuffer::with_capacity(drive.episodes);
    let stdout = std::io::stdout();
    for ep in 0..drive.episodes {
        let trajectory = if render {
            collector.run_episode_observed(&mut env, &mut policy, |e| {
                let mut out = stdout.lock();
                e.render(&mut out)?;
                out.flush()?;
                Ok(())
            })?
        } else {
            collector.run_episode(&mut env, &mut policy)?
        };
        tracing::info!(
            episode = ep,
            reward = trajectory.total_reward,
            max_return = trajectory.max_return,
            accuracy = format!("{:.3}", trajectory.accuracy()),
            "Episode finished"
        );
        buffer.push(trajectory);
    }

    tracing::info!(
        mean_reward = buffer.mean_reward(),
        success_rate = format!("{:.2}%", buffer.success_rate() * 100.0),
        "Run complete"
    );
    Ok(())
}

fn cmd_collect(
    config: &CogTasksConfig,
    drive: &DriveArgs,
    output: &Path,
    summary_only: bool,
) -> Result<()> {
    tracing::info!(task = %drive.task, episodes = drive.episodes, "Collecting trajectories");

    let mut env = build_env(config, drive)?;
    let mut policy = build_policy(drive)?;
    let collector = if summary_only {
        TrajectoryCollector::summary_only()
    } else {
        TrajectoryCollector::new()
    };

    let mut buffer = TrajectoryBuffer::with_capacity(drive.episodes);
    buffer.extend(collector.collect_episodes(&mut env, &mut policy, drive.episodes)?);

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    buffer.save_to_file(output)?;
    Ok(())
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let buffer = TrajectoryBuffer::load_from_file(path)?;

    println!("Trajectories: {}", path.display());
    println!("  Total episodes: {}", buffer.len());
    println!("  Success rate: {:.2}%", buffer.success_rate() * 100.0);
    println!("  Mean reward: {:.2}", buffer.mean_reward());
    println!();

    for stats in buffer.stats() {
        println!("{}:", stats.task);
        println!("  Episodes: {} ({} successful)", stats.episodes, stats.successes);
        println!(
            "  Mean reward: {:.2} / {:.2}",
            stats.mean_reward, stats.mean_max_return
        );
        println!("  Mean accuracy: {:.3}", stats.mean_accuracy);
        println!("  Mean length: {:.1}", stats.mean_length);
        println!();
    }

    let groups = buffer.group_by_task();
    for (task, trajectories) in &groups {
        if let Some(t) = trajectories.first() {
            println!(
                "First {task} episode ({} policy, {}):",
                t.policy,
                t.metadata.collected_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("  Input : {}", t.input);
            println!("  Target: {}", t.target);
            println!("  Output: {}", t.output);
        }
    }

    Ok(())
}
