use crate::config::models::SessionMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "molserve - Serve molecular structures to interactive viewers, driven by a TCP command socket and an interactive console.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Accept structure paths on the command socket and console and serve them to viewers.
    Serve(ServeArgs),
    /// Parse a structure file and print a summary without starting a server.
    Inspect(InspectArgs),
}

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Session mode: plain visualization or a physics-backed simulation.
    #[arg(short, long, value_enum)]
    pub mode: Option<SessionMode>,

    /// Override the host the command socket binds to.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Override the command socket port.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the directory the error journal is written to.
    #[arg(long, value_name = "DIR")]
    pub journal_dir: Option<PathBuf>,

    /// Do not read commands from standard input; only the socket is served.
    #[arg(long)]
    pub no_console: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S server.port=7800
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the structure file (.pdb, .ent or .bgf).
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,
}
