use polars::prelude::PolarsError;
use thiserror::Error;

use crate::analysis::cluster_interactions::ClusterId;

#[derive(Error, Debug)]
pub enum CodepNetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown colormap '{0}'")]
    UnknownColormap(String),

    #[error("Invalid color '{0}', expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    #[error("Filter on column '{0}' mixes value kinds in its criterion set")]
    MixedCriterion(String),

    #[error("No layout position for node '{0}'")]
    MissingPosition(String),

    #[error("No color for cluster {0}")]
    MissingNodeColor(ClusterId),

    #[error("Gene '{0}' has no cluster assignment")]
    MissingCluster(String),

    #[error("Unexpected null in column '{0}'")]
    UnexpectedNull(String),
}

pub type Result<T> = std::result::Result<T, CodepNetError>;
