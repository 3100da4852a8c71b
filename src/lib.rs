//! Gene co-dependency network construction.
//!
//! Loads DepMap-style co-dependency tables together with String-db cluster,
//! coordinate and interaction exports, joins them by cluster membership and
//! prepares a network centred on a root gene for rendering.

pub mod error;

pub mod parsers {
    pub mod table_parser;
    pub mod dataset_parser;
}

pub mod analysis {
    pub mod table_filter;
    pub mod preprocess;
    pub mod cluster_interactions;
    pub mod network_graph;
    pub mod network_plots;
    pub mod network_pipeline;
}

pub mod utils {
    pub mod colors;
    pub mod coordinates;
    pub mod spring_layout;
}

pub use error::{CodepNetError, Result};
