//! CLI argument definitions for the registry dashboard.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cadasil",
    version,
    about = "CADASIL registry dashboard - cohort summaries, patient table and data quality",
    long_about = "Summarize the Argentine CADASIL patient registry.\n\n\
                  Records are loaded from REDCap, Supabase or a delimited export \
                  (CSV, TSV, pipe or semicolon separated)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: ./cadasil.toml, then the user config folder).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Data source (overrides the config file and CADASIL_SOURCE).
    #[arg(long = "source", value_enum, global = true)]
    pub source: Option<SourceArg>,

    /// Read records from a delimited export instead of a remote source.
    #[arg(long = "csv", value_name = "PATH", global = true, conflicts_with = "source")]
    pub csv: Option<PathBuf>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient names and other identifying values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the summary tabs for the filtered cohort.
    Summary {
        /// Print the summaries as JSON.
        #[arg(long = "json")]
        json: bool,
    },

    /// Print the filtered patient table.
    Patients {
        /// Click a column header; repeat to cycle ascending, descending, unsorted.
        #[arg(long = "sort", value_name = "KEY")]
        sort: Vec<String>,
    },

    /// Print data-completeness scores for every record, least complete first.
    Quality {
        /// Show only the N least complete records.
        #[arg(long = "limit", value_name = "N")]
        limit: Option<usize>,
    },

    /// Replace the loaded records with an export and compare the two.
    Upload {
        /// Delimited export with a record_id column.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Also import the accepted records into REDCap.
        #[arg(long = "push")]
        push: bool,
    },

    /// List the registry province codes.
    Provinces,

    /// List the REDCap data dictionary.
    Metadata,
}

/// Cohort filters. Anything left out keeps its default.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Minimum age, inclusive.
    #[arg(long = "age-min", value_name = "YEARS", global = true)]
    pub age_min: Option<f64>,

    /// Maximum age, inclusive.
    #[arg(long = "age-max", value_name = "YEARS", global = true)]
    pub age_max: Option<f64>,

    /// Sex: all, 1/m/masculino or 2/f/femenino.
    #[arg(long = "sex", value_name = "SEX", global = true)]
    pub sex: Option<String>,

    /// Province code (see `cadasil provinces`), or all.
    #[arg(long = "province", value_name = "CODE", global = true)]
    pub province: Option<String>,

    /// Initial symptom code, or all.
    #[arg(long = "symptom", value_name = "CODE", global = true)]
    pub symptom: Option<String>,

    /// Diagnostic method code (1 genetic, 2 biopsy, 3 clinical), or all.
    #[arg(long = "diagnosis", value_name = "CODE", global = true)]
    pub diagnosis: Option<String>,

    /// Family history: all, si/yes/1 or no/0.
    #[arg(long = "family-history", value_name = "VALUE", global = true)]
    pub family_history: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Redcap,
    Supabase,
    Csv,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
