//! Field resolution listing.
//!
//! Shows which header of the combined exports was matched for each canonical
//! field so a user can check the synonyms before trusting the report.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::ColumnsArgs, config::AnalyzerConfig, load_inputs, resolver::FieldMap, table,
};

const UNRESOLVED: &str = "(unresolved)";

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let config = AnalyzerConfig::load_or_default(args.config.as_deref())
        .context("Loading analyzer configuration")?;
    let combined = load_inputs(&args.input)?;
    let fields = FieldMap::resolve(combined.dataset.columns(), &config.synonyms);
    print!("{}", render_fields(&fields, &config));
    info!(
        "Resolved {} of 6 field(s) across {} column(s)",
        fields.iter().filter(|(_, column)| column.is_some()).count(),
        combined.dataset.columns().len()
    );
    Ok(())
}

pub fn render_fields(fields: &FieldMap, config: &AnalyzerConfig) -> String {
    let headers = vec![
        "field".to_string(),
        "column".to_string(),
        "synonyms".to_string(),
    ];
    let rows = fields
        .iter()
        .map(|(field, column)| {
            vec![
                field.name().to_string(),
                column.unwrap_or(UNRESOLVED).to_string(),
                config.synonyms.candidates(field).join(", "),
            ]
        })
        .collect::<Vec<_>>();
    table::render_table(&headers, &rows)
}
