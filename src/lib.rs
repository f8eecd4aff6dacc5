pub mod analyze;
pub mod cli;
pub mod columns;
pub mod combine;
pub mod config;
pub mod data;
pub mod dataset;
pub mod io_utils;
pub mod metrics;
pub mod preview;
pub mod report;
pub mod resolver;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{Cli, Commands, InputArgs},
    config::AnalyzerConfig,
    dataset::{Combined, LoadOptions},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("channel_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => analyze::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Columns(args) => columns::execute(&args),
        Commands::Combine(args) => combine::execute(&args),
        Commands::ConfigTemplate(args) => handle_config_template(&args),
    }
}

/// Loads and unions the exports named by `args`, in order.
pub(crate) fn load_inputs(args: &InputArgs) -> Result<Combined> {
    let options = LoadOptions {
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        skip_invalid: args.skip_invalid,
    };
    if let Some(delimiter) = args.delimiter {
        debug!("Reading inputs with delimiter '{}'", printable_delimiter(delimiter));
    }
    let combined = dataset::combine_files(&args.inputs, &options)
        .with_context(|| format!("Combining {} input file(s)", args.inputs.len()))?;
    if !combined.skipped.is_empty() {
        warn!(
            "{} of {} file(s) skipped as unreadable",
            combined.skipped.len(),
            args.inputs.len()
        );
    }
    Ok(combined)
}

fn handle_config_template(args: &cli::ConfigTemplateArgs) -> Result<()> {
    AnalyzerConfig::default()
        .save(&args.output)
        .with_context(|| format!("Writing configuration to {:?}", args.output))?;
    info!("Default configuration written to {:?}", args.output);
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
