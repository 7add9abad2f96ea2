//! orchsim command line driver.
//!
//! Runs seeded orchestration sessions and prints their transcripts.
//!
//! # Quick Start
//!
//! ```bash
//! # Resolve three prompts on a virtual clock
//! orchsim run --seed 42 "plan" "build" "deploy"
//!
//! # Check that a seed reproduces byte for byte
//! orchsim replay --seed 42 "plan" "build"
//!
//! # Watch resolutions arrive in real time
//! orchsim live --prompt "deploy"
//! ```

mod commands;
mod style;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// orchsim - deterministic message orchestration simulator.
#[derive(Parser)]
#[command(name = "orchsim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Project directory holding orchsim.toml.
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send prompts and print the resolved transcript.
    Run {
        /// Seed for the session (overrides configuration).
        #[arg(short, long)]
        seed: Option<u32>,

        /// Enable chaos mode before sending.
        #[arg(long)]
        chaos: bool,

        /// Print the transcript as JSON.
        #[arg(long)]
        json: bool,

        /// Include the decision log.
        #[arg(long)]
        trace: bool,

        /// Prompts to send, in order.
        #[arg(required = true)]
        prompts: Vec<String>,
    },

    /// Run a session twice and verify both runs are identical.
    Replay {
        /// Seed for both runs.
        #[arg(short, long)]
        seed: u32,

        /// Prompts to send, in order.
        #[arg(required = true)]
        prompts: Vec<String>,
    },

    /// Resolve many prompts and report outcome rates.
    Sweep {
        /// Seed for the session (overrides configuration).
        #[arg(short, long)]
        seed: Option<u32>,

        /// Number of prompts to resolve.
        #[arg(short, long, default_value = "1000")]
        count: usize,

        /// Enable chaos mode for the whole sweep.
        #[arg(long)]
        chaos: bool,
    },

    /// Resolve prompts against the wall clock, polling for updates.
    Live {
        /// Seed for the session (overrides configuration).
        #[arg(short, long)]
        seed: Option<u32>,

        /// Prompt to send; repeat for several.
        #[arg(short, long = "prompt", default_value = "hello")]
        prompts: Vec<String>,

        /// Also start a long-running task.
        #[arg(long)]
        long_running: bool,
    },

    /// Fold events through the module health machine.
    Machine {
        /// Events to apply in order (DEGRADE, RECOVER, CRITICAL_FAULT).
        #[arg(required = true)]
        events: Vec<String>,
    },

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show version information.
    Version,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the merged configuration.
    Show {
        /// Output format (text, json, toml).
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so transcripts stay clean; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    style::set_no_color(cli.no_color);

    match cli.command {
        Commands::Run {
            seed,
            chaos,
            json,
            trace,
            prompts,
        } => commands::run::run(&cli.project, seed, chaos, json, trace, &prompts),
        Commands::Replay { seed, prompts } => commands::replay::run(&cli.project, seed, &prompts),
        Commands::Sweep { seed, count, chaos } => {
            commands::sweep::run(&cli.project, seed, count, chaos)
        }
        Commands::Live {
            seed,
            prompts,
            long_running,
        } => commands::live::run(&cli.project, seed, &prompts, long_running),
        Commands::Machine { events } => {
            commands::machine::run(&events);
            Ok(())
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { format } => commands::config::show(&cli.project, &format),
        },
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
