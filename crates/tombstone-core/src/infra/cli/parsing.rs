// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::factory::{DEFAULT_CHECKPOINT_FILE, DEFAULT_CONCURRENCY, DEFAULT_FLUSH_EVERY, ExecutionSettings};
use crate::infra::cli::parsing::MainCommands::{Audit, Check};
use crate::infra::networking::http::DEFAULT_REQUEST_TIMEOUT;
use crate::tombstone::TombstoneTask;
use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
#[command(version, about, long_about = None)]
struct CheckArguments {
    /// Web URL of the source repository
    pub url: String,

    /// Commit hash known to exist in the repository, used to verify relocations
    #[arg(short, long)]
    pub commit: Option<String>,
}

#[derive(Args, Debug)]
#[command(version, about, long_about = None)]
struct AuditArguments {
    /// JSON file listing catalog entries as { key, url, commit }
    pub index: PathBuf,

    /// Where results are persisted between runs
    #[arg(long, default_value = DEFAULT_CHECKPOINT_FILE)]
    pub checkpoint: PathBuf,

    /// Number of repositories checked at the same time
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Rewrite the checkpoint file after this many checks; zero writes it only at the end
    #[arg(long, default_value_t = DEFAULT_FLUSH_EVERY)]
    pub flush_every: usize,
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = false)]
struct CliParser {
    #[command(subcommand)]
    pub command: MainCommands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_colors: bool,

    /// Timeout applied to every HTTP request, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout_secs: u64,
}

#[derive(Subcommand)]
enum MainCommands {
    /// Check the status of a single source repository
    Check(CheckArguments),
    /// Check every repository listed by a catalog index, resuming from previous runs
    Audit(AuditArguments),
}

pub fn parse_arguments() -> anyhow::Result<(TombstoneTask, ExecutionSettings)> {
    evaluate(CliParser::parse())
}

fn evaluate(cli: CliParser) -> anyhow::Result<(TombstoneTask, ExecutionSettings)> {
    if cli.timeout_secs == 0 {
        bail!("tombstone.cli : request timeout must be at least one second")
    }

    let task = match cli.command {
        Check(args) => TombstoneTask::CheckRepository {
            url: args.url,
            commit: args.commit.filter(|hash| !hash.trim().is_empty()),
        },
        Audit(args) => {
            if !args.index.exists() {
                bail!("tombstone.cli : no such file or directory ({:?})", args.index)
            }

            if args.concurrency == 0 {
                bail!("tombstone.cli : concurrency must be at least one")
            }

            TombstoneTask::AuditCatalog {
                index_path: args.index,
                checkpoint_path: args.checkpoint,
                concurrency: args.concurrency,
                flush_every: args.flush_every,
            }
        },
    };

    let settings = ExecutionSettings {
        use_colors: !cli.no_colors,
        request_timeout: Duration::from_secs(cli.timeout_secs),
    };

    Ok((task, settings))
}
