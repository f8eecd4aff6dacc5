use anyhow::{Context, Result};
use log::info;

use crate::{cli::CombineArgs, dataset::Dataset, io_utils, load_inputs};

pub fn execute(args: &CombineArgs) -> Result<()> {
    let combined = load_inputs(&args.input)?;
    let output_delimiter =
        io_utils::resolve_output_delimiter(args.output.as_deref(), args.output_delimiter);
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let mut writer =
        io_utils::open_csv_writer(args.output.as_deref(), output_delimiter, output_encoding)?;
    let written = write_dataset(&mut writer, &combined.dataset)?;
    writer.flush().context("Flushing combined output")?;
    for path in &combined.loaded {
        info!("✓ Appended {:?}", path);
    }
    info!("Wrote {written} data row(s) to output");
    Ok(())
}

/// Writes the header and every row; missing cells are written as empty fields.
pub fn write_dataset<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    dataset: &Dataset,
) -> Result<usize> {
    writer
        .write_record(dataset.columns())
        .context("Writing output headers")?;
    for (idx, row) in dataset.rows().iter().enumerate() {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .with_context(|| format!("Writing combined row {}", idx + 1))?;
    }
    Ok(dataset.row_count())
}
