use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "bharat-osint",
    version,
    about = "Indian mobile number OSINT console"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML). Default: config/bharat-osint.toml
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Increase verbosity (info, debug, trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log file path
    #[arg(long, global = true, default_value = "data/bharat-osint.log")]
    pub log_file: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and analyse one number
    Scan {
        target: String,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Analyse a newline/comma separated list of numbers
    Batch {
        /// Inline list; ignored when --file is given
        input: Option<String>,
        /// Read the list from a file ("-" for stdin)
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Show, clear or re-run recently analysed numbers
    Recent {
        /// Wipe the recently-used list
        #[arg(long, conflicts_with = "rescan")]
        clear: bool,
        /// Re-run the N-th entry (1 = most recent)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        rescan: Option<u16>,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Interactive terminal console
    Console {
        /// Directory for F2/F3 exports
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Export formats to write after the run
    #[arg(long, value_enum, value_delimiter = ',')]
    pub export: Vec<ExportFormatArg>,

    /// Export directory
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormatArg {
    Json,
    Csv,
}
