use std::path::Path;
use polars::prelude::*;
use log::debug;
use crate::error::Result;

/// Cell spellings treated as missing in every input table.
pub const NULL_MARKERS: [&str; 3] = ["NA", "na", "NaN"];

fn read_delimited(path: &Path, separator: u8) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(NULL_MARKERS.iter().map(|marker| (*marker).into()).collect());

    let table = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|parse_options| {
            parse_options
                .with_separator(separator)
                .with_null_values(Some(null_values.clone()))
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        "Read {} rows and {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    Ok(table)
}

pub fn read_csv_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    read_delimited(path.as_ref(), b',')
}

/// Reads a tab separated String-db export.
pub fn read_tsv_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    read_delimited(path.as_ref(), b'\t')
}
