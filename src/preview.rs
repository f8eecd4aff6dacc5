use anyhow::Result;
use log::info;

use crate::{
    cli::PreviewArgs,
    dataset::Dataset,
    load_inputs,
    table::{self, TableOptions},
};

pub const DEFAULT_MAX_WIDTH: usize = 40;

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let combined = load_inputs(&args.input)?;
    print!(
        "{}",
        render_preview(&combined.dataset, args.rows, args.max_width)
    );
    info!(
        "Displayed {} of {} combined row(s)",
        args.rows.min(combined.dataset.row_count()),
        combined.dataset.row_count()
    );
    Ok(())
}

/// Renders the first `rows` rows; missing cells show as blanks.
pub fn render_preview(dataset: &Dataset, rows: usize, max_width: usize) -> String {
    let headers = dataset.columns().to_vec();
    let body = dataset
        .rows()
        .iter()
        .take(rows)
        .map(|row| {
            row.iter()
                .map(|cell| cell.clone().unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let options = TableOptions {
        max_cell_width: (max_width > 0).then_some(max_width),
        ..TableOptions::default()
    };
    table::render_table_with(&headers, &body, &options)
}
