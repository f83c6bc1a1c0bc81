use crate::export::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "orgcluster")]
#[command(about = "Extract, normalize and cluster company names from contact exports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Create default configuration file at ./config/orgcluster.toml
    #[arg(long, global = true)]
    pub init: bool,

    /// Configuration file (defaults to ./config/orgcluster.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging (use -v for INFO, -vv for DEBUG with every merge decision)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank the companies found in one or more contact CSV exports
    Analyze {
        /// CSV files to merge; identical rows across files are counted once
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Column holding the job title (default: "title", then "position")
        #[arg(short = 't', long, value_name = "NAME")]
        title_column: Option<String>,

        /// Number of companies to list (overrides config)
        #[arg(short = 'n', long, value_name = "N")]
        top: Option<usize>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
        format: ReportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// List the contacts of this company instead of the company report
        #[arg(long, value_name = "COMPANY")]
        members: Option<String>,
    },

    /// Show the company extracted from each title
    Extract {
        #[arg(required = true)]
        titles: Vec<String>,
    },

    /// Score two company names against each other
    Compare { a: String, b: String },
}
