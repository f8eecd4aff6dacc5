use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::{AnalyzeArgs, ReportFormat},
    config::AnalyzerConfig,
    load_inputs,
    metrics::aggregate_with,
    preview, report,
};

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let config = AnalyzerConfig::load_or_default(args.config.as_deref())
        .context("Loading analyzer configuration")?;
    let combined = load_inputs(&args.input)?;
    let report = aggregate_with(&combined.dataset, &config);
    info!(
        "Analyzed {} row(s); {} weak point(s) flagged",
        report.rows,
        report.weak_points.iter().filter(|p| p.is_weakness()).count()
    );

    match args.format {
        ReportFormat::Json => {
            println!(
                "{}",
                report::render_json(
                    &report,
                    &combined.loaded,
                    &combined.skipped,
                    args.preview_rows.map(|rows| (&combined.dataset, rows)),
                )?
            );
        }
        ReportFormat::Table => {
            print!("{}", report::render_text(&report, combined.loaded.len()));
            if let Some(rows) = args.preview_rows {
                println!("\nCombined Data");
                print!(
                    "{}",
                    preview::render_preview(&combined.dataset, rows, preview::DEFAULT_MAX_WIDTH)
                );
            }
        }
    }
    Ok(())
}
