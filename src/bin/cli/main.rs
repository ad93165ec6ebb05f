//! CLI tool for editing zip and jar archives in place.

mod commands;
mod exit_codes;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use jarup::{Charset, EditOptions, WorkingCopyFactory};

/// Edit entries of zip and jar archives in place
#[derive(Parser)]
#[command(name = "jarup")]
#[command(author, version, about = "Edit entries of zip and jar archives in place", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Archive to operate on
    archive: PathBuf,

    #[command(subcommand)]
    command: Commands,

    /// Log working-copy activity to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Directory for working copies
    #[arg(long, env = "JARUP_TEMP_DIR", global = true)]
    temp_dir: Option<PathBuf>,

    /// Deflate level for rewritten entries (0-9)
    #[arg(long, short = 'l', value_parser = clap::value_parser!(i64).range(0..=9), global = true)]
    level: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an entry, or copy it out with --to
    Cat {
        /// Entry path; use `:/` to step into nested archives
        path: String,

        /// Copy the entry (or directory) to this file instead of printing it
        #[arg(long)]
        to: Option<PathBuf>,

        /// Text encoding (default: ISO-8859-1 for .properties, else UTF-8)
        #[arg(long)]
        encoding: Option<Charset>,
    },

    /// Copy a file or directory into the archive
    Cp {
        /// File or directory to copy
        source: PathBuf,

        /// Destination entry path
        path: String,
    },

    /// Write standard input to an entry
    Put {
        /// Entry path
        path: String,

        /// Text encoding (default: ISO-8859-1 for .properties, else UTF-8)
        #[arg(long)]
        encoding: Option<Charset>,
    },

    /// Delete an entry; a missing entry is left alone
    Rm {
        /// Entry path
        path: String,
    },

    /// List top-level entries in archive order
    Ls,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let mut options = EditOptions::new().compression_level(cli.level);
    if let Some(dir) = cli.temp_dir {
        options = options.temp_root(dir);
    }
    let factory = WorkingCopyFactory::new(options);
    let archive = cli.archive.as_path();

    let exit_code = match cli.command {
        Commands::Cat { path, to, encoding } => {
            commands::cat(&factory, archive, &path, to.as_deref(), encoding)
        }
        Commands::Cp { source, path } => commands::cp(&factory, archive, &source, &path),
        Commands::Put { path, encoding } => commands::put(&factory, archive, &path, encoding),
        Commands::Rm { path } => commands::rm(&factory, archive, &path),
        Commands::Ls => commands::ls(&factory, archive),
    };

    std::process::exit(exit_code.code());
}
