//! Plain-text tables for terminal output.

use std::{borrow::Cow, fmt::Write as _};

const COLUMN_GAP: &str = "  ";
const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Cells wider than this are cut and end with an ellipsis.
    pub max_cell_width: Option<usize>,
    /// Zero-based column positions padded on the left instead of the right.
    pub right_aligned: Vec<usize>,
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    render_table_with(headers, rows, &TableOptions::default())
}

pub fn render_table_with(headers: &[String], rows: &[Vec<String>], options: &TableOptions) -> String {
    let limit = options.max_cell_width;
    let headers = headers
        .iter()
        .map(|h| fit_cell(h, limit))
        .collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|row| {
            row.iter()
                .take(headers.len())
                .map(|c| fit_cell(c, limit))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| width(h).max(1)).collect::<Vec<_>>();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&headers, &widths, options));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths, options));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, options));
    }
    output
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize], options: &TableOptions) -> String {
    let mut line = widths
        .iter()
        .enumerate()
        .map(|(idx, &target)| {
            let cell = cells.get(idx).map(|c| c.as_ref()).unwrap_or("");
            let padding = " ".repeat(target.saturating_sub(width(cell)));
            if options.right_aligned.contains(&idx) {
                format!("{padding}{cell}")
            } else {
                format!("{cell}{padding}")
            }
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    line.truncate(line.trim_end().len());
    line
}

fn width(value: &str) -> usize {
    value.chars().count()
}

/// Flattens control characters to spaces and enforces the width limit.
fn fit_cell(value: &str, limit: Option<usize>) -> Cow<'_, str> {
    let cleaned: Cow<'_, str> = if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    };
    match limit {
        Some(limit) if limit > 0 && width(&cleaned) > limit => {
            let mut cut = cleaned.chars().take(limit - 1).collect::<String>();
            cut.push(ELLIPSIS);
            Cow::Owned(cut)
        }
        _ => cleaned,
    }
}
