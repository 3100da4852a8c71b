use std::path::{Path, PathBuf};
use polars::prelude::*;
use log::{debug, info};
use crate::analysis::preprocess::*;
use crate::analysis::table_filter::{column_f64, required_strings};
use crate::error::Result;
use crate::parsers::table_parser::{read_csv_table, read_tsv_table};
use crate::utils::colors::ColorRamp;
use crate::utils::coordinates::Positions;

pub const DEFAULT_SPECIES: &str = "homo_sapiens";

/// Input files of one gene, laid out as
///
/// ```text
/// {root}/{gene}_codep.csv
/// {root}/{species}/{gene}_string_MCL_clusters.tsv
/// {root}/{species}/{gene}_string_network_coordinates.tsv
/// {root}/{species}/{gene}_string_interactions.tsv
/// ```
///
/// where `root` defaults to `./{gene}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub codep: PathBuf,
    pub clusters: PathBuf,
    pub coords: PathBuf,
    pub interactions: PathBuf,
}

impl DatasetPaths {
    pub fn new(gene: &str, species: &str, root: Option<&Path>) -> Self {
        let root = root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".").join(gene));
        let species_dir = root.join(species);

        DatasetPaths {
            codep: root.join(format!("{}_codep.csv", gene)),
            clusters: species_dir.join(format!("{}_string_MCL_clusters.tsv", gene)),
            coords: species_dir.join(format!("{}_string_network_coordinates.tsv", gene)),
            interactions: species_dir.join(format!("{}_string_interactions.tsv", gene)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneDatasets {
    pub codep: DataFrame,
    pub clusters: DataFrame,
    pub coords: DataFrame,
    pub interactions: DataFrame,
}

/// Loads the four tables of a gene, normalizing them when `preprocess` is set.
pub fn load_data(
    paths: &DatasetPaths,
    preprocess: bool,
    gene_threshold: i64,
    ramp: &dyn ColorRamp,
) -> Result<GeneDatasets> {
    info!("Reading co-dependency data from: {}", paths.codep.display());
    let codep = read_csv_table(&paths.codep)?;
    let clusters = read_tsv_table(&paths.clusters)?;
    let coords = read_tsv_table(&paths.coords)?;
    let interactions = read_tsv_table(&paths.interactions)?;

    if !preprocess {
        return Ok(GeneDatasets { codep, clusters, coords, interactions });
    }

    Ok(GeneDatasets {
        codep: preprocess_codep(&codep, ramp)?,
        clusters: preprocess_clusters(&clusters, gene_threshold)?,
        coords: preprocess_coords(&coords)?,
        interactions: preprocess_interactions(&interactions)?,
    })
}

/// Layout positions keyed by identifier; rows without both coordinates are skipped.
pub fn positions_from_coords(coords: &DataFrame) -> Result<Positions> {
    let proteins = required_strings(coords, PROTEIN_COL)?;
    let xs = column_f64(coords, X_POSITION_COL)?;
    let ys = column_f64(coords, Y_POSITION_COL)?;

    let mut positions = Positions::default();
    for ((protein, x), y) in proteins.into_iter().zip(xs).zip(ys) {
        match (x, y) {
            (Some(x), Some(y)) => {
                positions.insert(protein.to_uppercase(), (x, y));
            }
            _ => debug!("No coordinates for {}, leaving it out of the layout", protein),
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_paths_follow_directory_convention() {
        let paths = DatasetPaths::new("TP53", DEFAULT_SPECIES, None);
        assert_eq!(paths.codep, PathBuf::from("./TP53/TP53_codep.csv"));
        assert_eq!(
            paths.clusters,
            PathBuf::from("./TP53/homo_sapiens/TP53_string_MCL_clusters.tsv")
        );

        let paths = DatasetPaths::new("TP53", "mus_musculus", Some(Path::new("/data/tp53")));
        assert_eq!(
            paths.interactions,
            PathBuf::from("/data/tp53/mus_musculus/TP53_string_interactions.tsv")
        );
        assert_eq!(
            paths.coords,
            PathBuf::from("/data/tp53/mus_musculus/TP53_string_network_coordinates.tsv")
        );
    }

    #[test]
    fn test_positions_from_coords() {
        let coords = df!(
            "protein" => ["tp53", "MDM2", "ATM"],
            "x_position" => [Some(0.1f64), Some(0.5), None],
            "y_position" => [Some(0.2f64), Some(0.7), Some(0.3)]
        )
        .unwrap();

        let positions = positions_from_coords(&coords).unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions["TP53"], (0.1, 0.2));
        assert!(!positions.contains_key("ATM"));
    }
}
