//! CSV export of the topic table.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use std::path::Path;

use crate::topic::{Topic, TopicField};

/// File name offered for the CSV download.
pub const EXPORT_FILE_NAME: &str = "Double_Materiality_Matrix.csv";
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";
/// UTF-8 byte-order mark, so spreadsheet tools detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn topics_frame(topics: &[Topic]) -> PolarsResult<DataFrame> {
    let ids: Vec<&str> = topics.iter().map(|t| t.id.as_str()).collect();
    let names: Vec<&str> = topics.iter().map(|t| t.name.as_str()).collect();
    let dimensions: Vec<Option<&str>> = topics
        .iter()
        .map(|t| t.dimension.map(|d| d.label()))
        .collect();
    let financial: Vec<f64> = topics.iter().map(|t| t.financial_materiality).collect();
    let impact: Vec<f64> = topics.iter().map(|t| t.impact_materiality).collect();
    let colors: Vec<&str> = topics.iter().map(|t| t.color.as_str()).collect();

    df!(
        TopicField::Id.header() => ids,
        TopicField::Name.header() => names,
        TopicField::Dimension.header() => dimensions,
        TopicField::FinancialMateriality.header() => financial,
        TopicField::ImpactMateriality.header() => impact,
        TopicField::Color.header() => colors
    )
}

/// Serialize the full table (derived color included) as BOM-prefixed CSV.
pub fn export_csv(topics: &[Topic]) -> Result<Vec<u8>> {
    let mut df = topics_frame(topics)?;
    let mut buf: Vec<u8> = UTF8_BOM.to_vec();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| eyre!("Failed to write CSV: {}", e))?;
    Ok(buf)
}

/// Write the CSV export to `path`.
pub fn write_csv(path: &Path, topics: &[Topic]) -> Result<()> {
    let bytes = export_csv(topics)?;
    std::fs::write(path, bytes)
        .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
    log::info!("exported {} topics to {}", topics.len(), path.display());
    Ok(())
}
