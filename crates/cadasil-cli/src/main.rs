//! CADASIL registry dashboard CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use cadasil_cli::config::{Config, SourceKind};
use cadasil_cli::dashboard::Dashboard;
use cadasil_cli::logging::{LogConfig, LogFormat, init_logging};
use cadasil_ingest::RedcapClient;
use clap::{ColorChoice, Parser};
use tracing::debug;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, SourceArg};
use crate::commands::{
    build_filters, run_metadata, run_patients, run_provinces, run_push, run_quality,
    run_summary, run_upload,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Provinces = cli.command {
        run_provinces();
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(error) if error.not_found() => {}
        Err(error) => return Err(error).context("load .env file"),
    }
    let config = load_config(&cli)?;

    if let Command::Metadata = cli.command {
        let client = RedcapClient::new(config.redcap.clone()).context("create REDCap client")?;
        return run_metadata(&client);
    }

    let defaults = config
        .filters
        .to_filter_state()
        .context("read [filters] defaults")?;
    let filters = build_filters(&cli.filters, defaults)?;
    let source = config.record_source().context("select data source")?;
    let mut dashboard = Dashboard::load(&source).with_filters(filters);

    match cli.command {
        Command::Summary { json } => run_summary(&dashboard, json),
        Command::Patients { sort } => run_patients(&mut dashboard, &sort),
        Command::Quality { limit } => run_quality(&dashboard, limit),
        Command::Upload { file, push } => {
            run_upload(&mut dashboard, &file)?;
            if push {
                let client =
                    RedcapClient::new(config.redcap.clone()).context("create REDCap client")?;
                run_push(&dashboard, &client)?;
            }
            Ok(())
        }
        Command::Provinces | Command::Metadata => Ok(()),
    }
}

/// Config file, then environment, then command-line source flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("load configuration")?;
    config
        .apply_process_env()
        .context("read environment overrides")?;
    if let Some(source) = cli.source {
        config.source.kind = match source {
            SourceArg::Redcap => SourceKind::Redcap,
            SourceArg::Supabase => SourceKind::Supabase,
            SourceArg::Csv => SourceKind::Csv,
        };
    }
    if let Some(path) = &cli.csv {
        config.source.kind = SourceKind::Csv;
        config.source.path = Some(path.clone());
    }
    debug!(source = %config.source.kind, redcap = ?config.redcap, supabase = ?config.supabase, "resolved configuration");
    Ok(config)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
