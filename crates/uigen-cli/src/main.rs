//! UIGen command-line interface.
//!
//! Drives the virtual file tree, the agent edit protocol, and preview
//! assembly from the shell. Projects are exchanged as JSON files holding a
//! serialized tree.
//!
//! # Examples
//!
//! ```bash
//! # Snapshot a directory
//! uigen pack ./my-component -o project.json
//!
//! # Apply a batch of agent tool calls
//! uigen apply project.json calls.json --in-place
//!
//! # Render the preview document
//! uigen preview project.json -o preview.html
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uigen_cli::{commands, settings};
use uigen_core::cli::{ExitCode, OutputFormat};

/// UIGen - virtual component projects and live previews.
#[derive(Parser, Debug)]
#[command(name = "uigen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    format: String,

    /// Preview configuration file (TOML)
    #[arg(long, global = true, env = "UIGEN_CONFIG")]
    config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pack a directory into a project file.
    ///
    /// Hidden entries and `node_modules` are skipped. Prints the project
    /// JSON to stdout when no output file is given.
    Pack {
        /// Directory to read
        dir: PathBuf,

        /// Project file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a project file out as a directory.
    Unpack {
        /// Project file to read
        project: PathBuf,

        /// Directory to write into
        dir: PathBuf,

        /// Leave files that already exist untouched
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Apply agent tool calls to a project.
    ///
    /// Calls run in order and the batch stops at the first rejected call
    /// (exit code 3).
    Apply {
        /// Project file to edit
        project: PathBuf,

        /// JSON file with one tool call or an array of them
        calls: PathBuf,

        /// Save the edited project back to its file
        #[arg(long)]
        in_place: bool,
    },

    /// Build a project and render its preview document.
    ///
    /// Exits with code 2 when only a diagnostic could be rendered.
    Preview {
        /// Project file to build
        project: PathBuf,

        /// HTML file to write; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Publish modules as `blob:{origin}/..` locators instead of inlining them
        #[arg(long)]
        blob_origin: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let output_format = cli
        .format
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let exit_code = execute_command(cli.command, cli.config.as_deref(), output_format)?;

    std::process::exit(exit_code.as_i32());
}

/// Initializes logging on stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

/// Routes a command to its handler.
fn execute_command(
    command: Commands,
    config: Option<&Path>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    match command {
        Commands::Pack { dir, output } => commands::pack::run(&dir, output.as_deref(), output_format),
        Commands::Unpack {
            project,
            dir,
            no_overwrite,
        } => commands::unpack::run(&project, &dir, !no_overwrite, output_format),
        Commands::Apply {
            project,
            calls,
            in_place,
        } => commands::apply::run(&project, &calls, in_place, output_format),
        Commands::Preview {
            project,
            output,
            blob_origin,
        } => {
            let config = settings::load_config(config)?;
            commands::preview::run(
                &project,
                output.as_deref(),
                blob_origin.as_deref(),
                config,
                output_format,
            )
        }
    }
}
