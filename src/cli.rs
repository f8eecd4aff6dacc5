use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Combine channel analytics CSV exports and report performance insights",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Combine exports and report metrics, best posting time, and weak points
    Analyze(AnalyzeArgs),
    /// Show the first rows of the combined exports in a formatted table
    Preview(PreviewArgs),
    /// Show which column was matched for each analytics field
    Columns(ColumnsArgs),
    /// Write the combined exports, tagged with their source file, as one CSV
    Combine(CombineArgs),
    /// Write the default analyzer configuration as YAML
    ConfigTemplate(ConfigTemplateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// One or more CSV exports, combined in the order given
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Skip files that cannot be read as CSV instead of failing
    #[arg(long = "skip-invalid")]
    pub skip_invalid: bool,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// YAML file overriding column synonyms and weak-point thresholds
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Output format for the report
    #[arg(long, value_enum, default_value = "table")]
    pub format: ReportFormat,
    /// Append a preview of this many combined rows (text format only)
    #[arg(long = "preview-rows")]
    pub preview_rows: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of combined rows to display
    #[arg(long, default_value_t = 100)]
    pub rows: usize,
    /// Maximum characters shown per cell (0 = unlimited)
    #[arg(long = "max-width", default_value_t = 40)]
    pub max_width: usize,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// YAML file overriding column synonyms
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CombineArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output (defaults by output extension, else comma)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding for the output file/stdout (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigTemplateArgs {
    /// Destination YAML file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_aliases() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("semicolon"), Ok(b';'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn analyze_accepts_repeated_inputs() {
        let cli = Cli::try_parse_from([
            "channel-insights",
            "analyze",
            "-i",
            "a.csv",
            "-i",
            "b.csv",
            "--format",
            "json",
        ])
        .expect("parse args");
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.input.inputs.len(), 2);
                assert_eq!(args.format, ReportFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn preview_defaults_to_one_hundred_rows() {
        let cli = Cli::try_parse_from(["channel-insights", "preview", "-i", "a.csv"])
            .expect("parse args");
        match cli.command {
            Commands::Preview(args) => assert_eq!(args.rows, 100),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
