//! Text and JSON rendering of an analysis [`Report`].

use std::{fmt::Write as _, path::PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    dataset::Dataset,
    metrics::Report,
    table::{self, TableOptions},
};

pub const GROWTH_STRATEGY: &[&str] = &[
    "Use faces + emotions in thumbnails",
    "Titles = Curiosity + Clear benefit",
    "Hook viewers in first 3-5 seconds",
    "Post Shorts daily (1-2/day)",
    "Long videos 2-3/week",
    "Pin comments & reply fast",
];

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    files: &'a [PathBuf],
    skipped: &'a [PathBuf],
    #[serde(flatten)]
    report: &'a Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<JsonPreview<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonPreview<'a> {
    columns: &'a [String],
    rows: &'a [Vec<Option<String>>],
}

/// Serializes the report; `preview` appends the first rows of the combined data.
pub fn render_json(
    report: &Report,
    files: &[PathBuf],
    skipped: &[PathBuf],
    preview: Option<(&Dataset, usize)>,
) -> Result<String> {
    let preview = preview.map(|(dataset, limit)| JsonPreview {
        columns: dataset.columns(),
        rows: &dataset.rows()[..limit.min(dataset.row_count())],
    });
    serde_json::to_string_pretty(&JsonReport {
        files,
        skipped,
        report,
        preview,
    })
    .context("Serializing report as JSON")
}

pub fn render_text(report: &Report, files: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{files} CSV file(s) combined into {} row(s)",
        format_count(report.rows as f64)
    );

    let _ = writeln!(out, "\nChannel Performance");
    let headers = vec!["metric".to_string(), "value".to_string()];
    let rows = [
        ("Total Views", format_count(report.total_views)),
        ("Avg Views / Video", format_count(report.avg_views as f64)),
        ("Total Likes", format_count(report.total_likes)),
        ("Total Comments", format_count(report.total_comments)),
        ("Avg CTR (%)", format!("{:.2}", report.avg_ctr)),
        ("Avg Watch Time (sec)", report.avg_watch.to_string()),
        ("Engagement (%)", format!("{:.2}", report.engagement_rate)),
    ]
    .into_iter()
    .map(|(label, value)| vec![label.to_string(), value])
    .collect::<Vec<_>>();
    let options = TableOptions {
        right_aligned: vec![1],
        ..TableOptions::default()
    };
    out.push_str(&table::render_table_with(&headers, &rows, &options));

    let _ = writeln!(out, "\nBest Time to Post");
    let _ = writeln!(out, "Best Day: {}", report.best_day);
    let _ = writeln!(out, "Best Time: {}", report.best_time);

    let _ = writeln!(out, "\nAreas to Improve");
    for point in &report.weak_points {
        let marker = if point.is_weakness() { "!" } else { "✓" };
        let _ = writeln!(out, "{marker} {point}");
    }

    let _ = writeln!(out, "\nActionable Growth Strategy");
    for tip in GROWTH_STRATEGY {
        let _ = writeln!(out, "- {tip}");
    }
    out
}

/// Formats a count with comma thousands separators; fractions keep two digits.
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rendered = if value.fract() == 0.0 {
        format!("{:.0}", value.abs())
    } else {
        format!("{:.2}", value.abs())
    };
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };
    let mut grouped = String::with_capacity(rendered.len() + integer.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
