// SPDX-License-Identifier: AGPL-3.0-or-later
//! resfs CLI
//!
//! Browse and edit the local filesystem through the resource layer.

mod commands;

use clap::{Parser, Subcommand};
use resfs_core::ResfsResult;
use resfs_file::FileConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "resfs")]
#[command(author, version, about = "resfs - cached filesystem resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reload directory listings on every access
    #[arg(long, global = true)]
    no_cache: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List directory contents
    #[command(alias = "dir")]
    Ls {
        /// Directory to list (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Long format with details
        #[arg(short, long)]
        long: bool,

        /// Human-readable sizes
        #[arg(short = 'H', long)]
        human: bool,
    },

    /// Display file contents
    Cat {
        /// File to display
        path: String,
    },

    /// Write standard input to a file
    Put {
        /// File to write
        path: String,

        /// Append instead of replacing the content
        #[arg(short, long)]
        append: bool,
    },

    /// Create a directory inside PARENT
    Mkdir {
        /// Containing directory
        parent: String,

        /// Name of the new directory
        name: String,
    },

    /// Create an empty file inside PARENT
    Touch {
        /// Containing directory
        parent: String,

        /// Name of the new file
        name: String,
    },

    /// Remove a child of PARENT, recursively for directories
    Rm {
        /// Containing directory
        parent: String,

        /// Name of the child to remove
        name: String,
    },

    /// Rename a file or directory in place
    Mv {
        /// Resource to rename
        path: String,

        /// New name, without any path separator
        new_name: String,
    },

    /// Show file or directory information
    Stat {
        /// Resource to inspect
        path: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(level)
        .try_init();
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "resfs", "resfs")
        .map(|d| d.config_dir().join("config.toml"))
}

/// An explicit `--config` must exist; the default location is optional.
fn load_config(explicit: Option<&Path>, no_cache: bool) -> ResfsResult<FileConfig> {
    let config = match explicit {
        Some(path) => FileConfig::load(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => FileConfig::load(&path)?,
            _ => FileConfig::default(),
        },
    };
    Ok(if no_cache { config.with_caching(false) } else { config })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(cli.config.as_deref(), cli.no_cache).and_then(|config| {
        tracing::debug!(
            caching = config.caching,
            ignore_file = %config.ignore_file,
            "configuration loaded"
        );
        let ctx = commands::Context::new(config)?;
        match cli.command {
            Commands::Ls { path, long, human } => commands::ls(&ctx, &path, long, human),
            Commands::Cat { path } => commands::cat(&ctx, &path),
            Commands::Put { path, append } => commands::put(&ctx, &path, append),
            Commands::Mkdir { parent, name } => commands::mkdir(&ctx, &parent, &name),
            Commands::Touch { parent, name } => commands::touch(&ctx, &parent, &name),
            Commands::Rm { parent, name } => commands::rm(&ctx, &parent, &name),
            Commands::Mv { path, new_name } => commands::mv(&ctx, &path, &new_name),
            Commands::Stat { path, json } => commands::stat(&ctx, &path, json),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", console::style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
