use std::cmp::Ordering;
use polars::prelude::*;
use log::debug;
use crate::analysis::table_filter::{column_f64, column_strings, required_strings};
use crate::error::Result;
use crate::utils::colors::{ColorRamp, Rgb};

pub const GENE_COL: &str = "gene";
pub const CORRELATION_COL: &str = "correlation";
pub const ABS_CORR_COL: &str = "abs_corr";
pub const RELATIVE_CORR_COL: &str = "relative_corr";
pub const LOG_RELATIVE_CORR_COL: &str = "log_relative_corr";
pub const EDGE_COLOR_COLS: [&str; 3] = ["edge_color_r", "edge_color_g", "edge_color_b"];

pub const PROTEIN_COL: &str = "protein";
pub const PARTNER_COL: &str = "n2";
pub const CLUSTER_NUMBER_COL: &str = "cluster number";
pub const GENE_COUNT_COL: &str = "gene count";
pub const X_POSITION_COL: &str = "x_position";
pub const Y_POSITION_COL: &str = "y_position";
pub const COEXPRESSION_COL: &str = "coexpression";
pub const COMBINED_SCORE_COL: &str = "combined_score";

pub const RAW_CLUSTER_PROTEIN_COL: &str = "protein name";
pub const RAW_COORDS_NODE_COL: &str = "#node";
pub const RAW_LEFT_NODE_COL: &str = "#node1";
pub const RAW_RIGHT_NODE_COL: &str = "node2";

pub const DEFAULT_GENE_THRESHOLD: i64 = 5;

/// One row of a preprocessed co-dependency table.
#[derive(Debug, Clone, PartialEq)]
pub struct CodepRecord {
    pub gene: String,
    pub correlation: Option<f64>,
    pub abs_corr: Option<f64>,
    pub relative_corr: Option<f64>,
    pub log_relative_corr: Option<f64>,
    pub edge_color: Option<Rgb>,
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |range, value| match range {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

/// Min-max position of `value` in `[min, max]`; a zero-width range maps to 0.
fn min_max_scale(value: f64, (min, max): (f64, f64)) -> f64 {
    let range = max - min;
    if range > 0.0 {
        (value - min) / range
    } else {
        0.0
    }
}

fn cmp_nulls_last(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn uppercase_column(mut table: DataFrame, name: &str) -> Result<DataFrame> {
    let upper: Vec<Option<String>> = column_strings(&table, name)?
        .into_iter()
        .map(|value| value.map(|v| v.to_uppercase()))
        .collect();
    table.with_column(Series::new(name.into(), upper))?;
    Ok(table)
}

/// Normalizes a raw co-dependency table.
///
/// Keeps `gene` and `correlation`, derives `abs_corr`, the min-max scaled
/// `relative_corr` and its `log_relative_corr = ln(1 + relative_corr)`, and
/// colours each row by its correlation's position in the correlation range.
/// Missing and NaN correlations become null, take no part in either range
/// and sort last. Rows are returned by `relative_corr` descending, ties by
/// correlation ascending.
pub fn preprocess_codep(codep: &DataFrame, ramp: &dyn ColorRamp) -> Result<DataFrame> {
    let subset = codep.select([GENE_COL, CORRELATION_COL])?;
    let genes = required_strings(&subset, GENE_COL)?;
    let correlations = column_f64(&subset, CORRELATION_COL)?;

    let abs_range = value_range(correlations.iter().flatten().map(|c| c.abs()));
    let corr_range = value_range(correlations.iter().flatten().copied());

    let mut records: Vec<CodepRecord> = genes
        .into_iter()
        .zip(correlations)
        .map(|(gene, correlation)| {
            let abs_corr = correlation.map(f64::abs);
            let relative_corr = abs_corr
                .zip(abs_range)
                .map(|(abs_corr, range)| min_max_scale(abs_corr, range));
            let edge_color = correlation
                .zip(corr_range)
                .map(|(corr, range)| ramp.sample(min_max_scale(corr, range)));

            CodepRecord {
                gene: gene.to_uppercase(),
                correlation,
                abs_corr,
                relative_corr,
                log_relative_corr: relative_corr.map(f64::ln_1p),
                edge_color,
            }
        })
        .collect();

    if let Some((min, max)) = abs_range {
        if max - min <= 0.0 {
            debug!("All co-dependency correlations share one magnitude, relative correlation set to 0");
        }
    }

    records.sort_by(|a, b| cmp_nulls_last(a.correlation, b.correlation, false));
    records.sort_by(|a, b| cmp_nulls_last(a.relative_corr, b.relative_corr, true));

    codep_table(&records)
}

fn codep_table(records: &[CodepRecord]) -> Result<DataFrame> {
    let channel = |pick: fn(&Rgb) -> f64| -> Vec<Option<f64>> {
        records.iter().map(|r| r.edge_color.as_ref().map(pick)).collect()
    };

    let table = df!(
        GENE_COL => records.iter().map(|r| r.gene.clone()).collect::<Vec<String>>(),
        CORRELATION_COL => records.iter().map(|r| r.correlation).collect::<Vec<_>>(),
        ABS_CORR_COL => records.iter().map(|r| r.abs_corr).collect::<Vec<_>>(),
        RELATIVE_CORR_COL => records.iter().map(|r| r.relative_corr).collect::<Vec<_>>(),
        LOG_RELATIVE_CORR_COL => records.iter().map(|r| r.log_relative_corr).collect::<Vec<_>>(),
        EDGE_COLOR_COLS[0] => channel(|c| c.r),
        EDGE_COLOR_COLS[1] => channel(|c| c.g),
        EDGE_COLOR_COLS[2] => channel(|c| c.b)
    )?;
    Ok(table)
}

/// Reads a preprocessed co-dependency table back into records.
pub fn codep_records(codep: &DataFrame) -> Result<Vec<CodepRecord>> {
    let genes = required_strings(codep, GENE_COL)?;
    let correlations = column_f64(codep, CORRELATION_COL)?;
    let abs_corrs = column_f64(codep, ABS_CORR_COL)?;
    let relative_corrs = column_f64(codep, RELATIVE_CORR_COL)?;
    let log_relative_corrs = column_f64(codep, LOG_RELATIVE_CORR_COL)?;
    let reds = column_f64(codep, EDGE_COLOR_COLS[0])?;
    let greens = column_f64(codep, EDGE_COLOR_COLS[1])?;
    let blues = column_f64(codep, EDGE_COLOR_COLS[2])?;

    let records = (0..codep.height())
        .map(|row| CodepRecord {
            gene: genes[row].clone(),
            correlation: correlations[row],
            abs_corr: abs_corrs[row],
            relative_corr: relative_corrs[row],
            log_relative_corr: log_relative_corrs[row],
            edge_color: match (reds[row], greens[row], blues[row]) {
                (Some(r), Some(g), Some(b)) => Some(Rgb::new(r, g, b)),
                _ => None,
            },
        })
        .collect();
    Ok(records)
}

/// Drops clusters smaller than `gene_threshold`, renames `protein name` to
/// `protein` and uppercases the identifiers.
pub fn preprocess_clusters(clusters: &DataFrame, gene_threshold: i64) -> Result<DataFrame> {
    let mut kept = clusters
        .clone()
        .lazy()
        .filter(col(GENE_COUNT_COL).gt_eq(lit(gene_threshold)))
        .collect()?;

    debug!(
        "Kept {} of {} cluster rows with at least {} genes",
        kept.height(),
        clusters.height(),
        gene_threshold
    );

    kept.rename(RAW_CLUSTER_PROTEIN_COL, PROTEIN_COL.into())?;
    uppercase_column(kept, PROTEIN_COL)
}

pub fn preprocess_coords(coords: &DataFrame) -> Result<DataFrame> {
    let mut renamed = coords.clone();
    renamed.rename(RAW_COORDS_NODE_COL, PROTEIN_COL.into())?;
    uppercase_column(renamed, PROTEIN_COL)
}

pub fn preprocess_interactions(interactions: &DataFrame) -> Result<DataFrame> {
    let mut subset = interactions.select([
        RAW_LEFT_NODE_COL,
        RAW_RIGHT_NODE_COL,
        COEXPRESSION_COL,
        COMBINED_SCORE_COL,
    ])?;
    subset.rename(RAW_LEFT_NODE_COL, PROTEIN_COL.into())?;
    subset.rename(RAW_RIGHT_NODE_COL, PARTNER_COL.into())?;

    let subset = uppercase_column(subset, PROTEIN_COL)?;
    uppercase_column(subset, PARTNER_COL)
}
