use std::path::PathBuf;
use log::{info, warn};
use crate::analysis::cluster_interactions::{cluster_ids, get_within_cluster_interactions};
use crate::analysis::network_graph::{build_network, NetworkInputs, NetworkOptions};
use crate::analysis::network_plots::{network_plot, write_network_json, write_network_tables};
use crate::analysis::preprocess::DEFAULT_GENE_THRESHOLD;
use crate::error::Result;
use crate::parsers::dataset_parser::{load_data, positions_from_coords, DatasetPaths, DEFAULT_SPECIES};
use crate::utils::colors::{colormap, colors_for_values};
use crate::utils::coordinates::rotate_positions;

pub const DEFAULT_COLORMAP: &str = "viridis";

/// Settings shared by every gene of a run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub species: String,
    /// Directory holding one dataset folder per gene; `./{gene}` when unset.
    pub data_dir: Option<PathBuf>,
    pub gene_threshold: i64,
    pub codep_colormap: String,
    pub cluster_colormap: String,
    pub output_dir: PathBuf,
    pub options: NetworkOptions,
    /// Rotation applied to the layout around the root, in degrees.
    pub rotate_degrees: Option<f64>,
}

impl PipelineConfig {
    pub fn new(output_dir: PathBuf) -> Self {
        PipelineConfig {
            species: DEFAULT_SPECIES.to_string(),
            data_dir: None,
            gene_threshold: DEFAULT_GENE_THRESHOLD,
            codep_colormap: DEFAULT_COLORMAP.to_string(),
            cluster_colormap: DEFAULT_COLORMAP.to_string(),
            output_dir,
            options: NetworkOptions::default(),
            rotate_degrees: None,
        }
    }

    pub fn dataset_paths(&self, gene: &str) -> DatasetPaths {
        let gene_root = self.data_dir.as_ref().map(|dir| dir.join(gene));
        DatasetPaths::new(gene, &self.species, gene_root.as_deref())
    }
}

/// Files written for one gene.
#[derive(Debug, Clone)]
pub struct GeneOutputs {
    pub gene: String,
    pub plot: PathBuf,
    pub nodes: PathBuf,
    pub edges: PathBuf,
    pub json: PathBuf,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Loads, joins, assembles and renders the network of `gene`.
pub fn run_gene(gene: &str, config: &PipelineConfig) -> Result<GeneOutputs> {
    let codep_ramp = colormap(&config.codep_colormap)?;
    let cluster_ramp = colormap(&config.cluster_colormap)?;

    let paths = config.dataset_paths(gene);
    let datasets = load_data(&paths, true, config.gene_threshold, codep_ramp)?;

    let (within, cluster_map) =
        get_within_cluster_interactions(gene, &datasets.clusters, &datasets.interactions)?;
    if within.height() == 0 {
        warn!("No within-cluster interactions for {}", gene);
    }

    let root = gene.to_uppercase();
    let mut positions = positions_from_coords(&datasets.coords)?;
    if let Some(degrees) = config.rotate_degrees {
        match positions.get(&root).copied() {
            Some(origin) => positions = rotate_positions(&positions, origin, degrees.to_radians()),
            None => warn!("No position for {}, skipping rotation", root),
        }
    }

    let inputs = NetworkInputs {
        codep: &datasets.codep,
        interactions: &within,
        cluster_map: &cluster_map,
        positions: &positions,
        root: Some(gene),
    };
    let network = build_network(&inputs, &config.options)?;

    let node_colors = colors_for_values(cluster_ids(&cluster_map), cluster_ramp);
    let spec = network.render_spec(&node_colors, &config.options)?;

    let gene_dir = config.output_dir.join(&root);
    let plot = gene_dir.join(format!("{}_network.html", root));
    let json = gene_dir.join(format!("{}_network.json", root));
    network_plot(&spec, &root, &plot)?;
    let (nodes, edges) = write_network_tables(&network, &gene_dir)?;
    write_network_json(&spec, &json)?;

    info!("Finished {}: results in {}", root, gene_dir.display());
    Ok(GeneOutputs {
        gene: root,
        plot,
        nodes,
        edges,
        json,
        node_count: network.node_count(),
        edge_count: network.edge_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_dataset_paths_use_gene_folders() {
        let mut config = PipelineConfig::new(PathBuf::from("out"));
        assert_eq!(
            config.dataset_paths("TP53").codep,
            PathBuf::from("./TP53/TP53_codep.csv")
        );

        config.data_dir = Some(PathBuf::from("/data"));
        config.species = "mus_musculus".to_string();
        let paths = config.dataset_paths("TP53");
        assert_eq!(paths.codep, Path::new("/data/TP53/TP53_codep.csv"));
        assert_eq!(
            paths.clusters,
            Path::new("/data/TP53/mus_musculus/TP53_string_MCL_clusters.tsv")
        );
    }

    #[test]
    fn test_unknown_colormap_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::new(dir.path().to_path_buf());
        config.codep_colormap = "rainbow-ish".to_string();
        assert!(matches!(
            run_gene("TP53", &config),
            Err(crate::error::CodepNetError::UnknownColormap(_))
        ));
    }
}
