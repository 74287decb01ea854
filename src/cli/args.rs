use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lila", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Settings file (.yaml, .yml or .json; default: built-in settings)
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Package whose cached summary answers function lookups
    #[arg(long, global = true, value_name = "NAME")]
    pub package: Option<String>,

    /// Directory holding cached package data
    #[arg(long, global = true, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Print operator.json and exit
    #[arg(long)]
    pub describe: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check one testlog and its sibling artifacts
    Check {
        /// Coverage testlog (.txt)
        #[arg(value_name = "TESTLOG")]
        testlog: PathBuf,

        /// Print only entries that did not pass
        #[arg(long)]
        warnings_only: bool,
    },
    /// Check every testlog below a workspace directory
    Batch {
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Only check testlogs whose file name matches this regex
        #[arg(long, value_name = "REGEX")]
        filter: Option<String>,

        /// Emit progress to stderr
        #[arg(long)]
        progress: bool,
    },
    /// Print the label to analysis item map of one testlog
    Labels {
        #[arg(value_name = "TESTLOG")]
        testlog: PathBuf,
    },
}
