use std::collections::BTreeMap;
use clap::ValueEnum;
use log::{debug, info};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use polars::prelude::DataFrame;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use crate::analysis::cluster_interactions::{
    interaction_records, ClusterId, ClusterMap, InteractionRecord, ROOT_CLUSTER_ID,
};
use crate::analysis::preprocess::{codep_records, CodepRecord};
use crate::error::{CodepNetError, Result};
use crate::utils::colors::{Rgb, Rgba, NEGATIVE_ROOT_EDGE_COLOR, POSITIVE_ROOT_EDGE_COLOR};
use crate::utils::coordinates::{Position, Positions};
use crate::utils::spring_layout::{spring_layout, SpringParams, DEFAULT_ITERATIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Root,
    Neighbor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneNode {
    pub gene: String,
    pub role: NodeRole,
    pub size: f64,
    pub cluster_id: ClusterId,
    pub relative_corr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneEdge {
    pub coexpression: f64,
    pub combined_score: f64,
    pub correlation: f64,
    pub relative_correlation: f64,
    pub color: Rgba,
    pub weight: f64,
}

impl GeneEdge {
    fn spoke(correlation: f64, relative_correlation: f64) -> Self {
        GeneEdge {
            coexpression: 0.0,
            combined_score: 0.0,
            correlation,
            relative_correlation,
            color: Rgba::new(0, 0, 0, u8::MAX),
            weight: 1.0,
        }
    }

    fn interaction(record: &InteractionRecord) -> Self {
        GeneEdge {
            coexpression: record.coexpression,
            combined_score: record.combined_score,
            ..GeneEdge::spoke(0.0, 0.0)
        }
    }
}

/// Edge attribute feeding edge weights and drawn widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum WeightColumn {
    #[strum(serialize = "corr")]
    Correlation,
    #[strum(serialize = "relcorr")]
    RelativeCorrelation,
    #[strum(serialize = "coex")]
    Coexpression,
    #[strum(serialize = "score")]
    CombinedScore,
}

impl WeightColumn {
    pub fn value(self, edge: &GeneEdge) -> f64 {
        match self {
            WeightColumn::Correlation => edge.correlation,
            WeightColumn::RelativeCorrelation => edge.relative_correlation,
            WeightColumn::Coexpression => edge.coexpression,
            WeightColumn::CombinedScore => edge.combined_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    pub root_size: f64,
    pub neighbor_scaling: f64,
    pub neighbor_size: Option<f64>,
    pub clusters_to_include: Option<Vec<ClusterId>>,
    pub use_default_edge_color: bool,
    pub use_default_node_color: bool,
    pub label_nodes: bool,
    pub add_root_edge: bool,
    pub default_node_color: Rgba,
    pub default_edge_color: Rgba,
    pub edge_size_min: f64,
    pub edge_corr_scale: f64,
    pub spring_layout: bool,
    pub spring_k: Option<f64>,
    pub spring_iterations: usize,
    pub width_column: Option<WeightColumn>,
    pub figure_size: (usize, usize),
}

impl Default for NetworkOptions {
    fn default() -> Self {
        NetworkOptions {
            root_size: 3000.0,
            neighbor_scaling: 2.5,
            neighbor_size: None,
            clusters_to_include: None,
            use_default_edge_color: true,
            use_default_node_color: false,
            label_nodes: true,
            add_root_edge: false,
            default_node_color: Rgba::new(0x00, 0xa5, 0xcf, u8::MAX),
            default_edge_color: Rgba::new(0xbf, 0xbf, 0xbf, u8::MAX),
            edge_size_min: 1.0,
            edge_corr_scale: 20.0,
            spring_layout: false,
            spring_k: None,
            spring_iterations: DEFAULT_ITERATIONS,
            width_column: Some(WeightColumn::Correlation),
            figure_size: (1200, 1200),
        }
    }
}

impl NetworkOptions {
    pub fn neighbor_size(&self) -> f64 {
        self.neighbor_size.unwrap_or(self.root_size / self.neighbor_scaling)
    }

    /// `|scale * value| + min_width` over the selected column, 1 when none is selected.
    pub fn edge_weight(&self, edge: &GeneEdge) -> f64 {
        match self.width_column {
            Some(column) => (self.edge_corr_scale * column.value(edge)).abs() + self.edge_size_min,
            None => 1.0,
        }
    }
}

/// Tables and lookups a network is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct NetworkInputs<'a> {
    /// Preprocessed co-dependency table.
    pub codep: &'a DataFrame,
    /// Within-cluster interactions carrying a `cluster_id` column.
    pub interactions: &'a DataFrame,
    pub cluster_map: &'a ClusterMap,
    pub positions: &'a Positions,
    pub root: Option<&'a str>,
}

/// Gene network with one edge per unordered gene pair.
#[derive(Debug, Clone)]
pub struct GeneNetwork {
    graph: UnGraph<GeneNode, GeneEdge>,
    index: FxHashMap<String, NodeIndex>,
    root: Option<String>,
    positions: Positions,
}

impl GeneNetwork {
    fn new(root: Option<String>) -> Self {
        GeneNetwork {
            graph: UnGraph::new_undirected(),
            index: FxHashMap::default(),
            root,
            positions: Positions::default(),
        }
    }

    fn add_node(&mut self, node: GeneNode) -> NodeIndex {
        match self.index.get(&node.gene) {
            Some(&existing) => {
                self.graph[existing] = node;
                existing
            }
            None => {
                let gene = node.gene.clone();
                let node_index = self.graph.add_node(node);
                self.index.insert(gene, node_index);
                node_index
            }
        }
    }

    fn upsert_edge(&mut self, left: &str, right: &str, edge: GeneEdge) -> bool {
        match (self.index.get(left), self.index.get(right)) {
            (Some(&a), Some(&b)) => {
                self.graph.update_edge(a, b, edge);
                true
            }
            _ => false,
        }
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, gene: &str) -> Option<&GeneNode> {
        self.index.get(gene).map(|&node_index| &self.graph[node_index])
    }

    pub fn edge(&self, left: &str, right: &str) -> Option<&GeneEdge> {
        let a = *self.index.get(left)?;
        let b = *self.index.get(right)?;
        self.graph.find_edge(a, b).map(|edge_index| &self.graph[edge_index])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GeneNode> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&GeneNode, &GeneNode, &GeneEdge)> {
        self.graph.edge_references().map(move |edge| {
            (&self.graph[edge.source()], &self.graph[edge.target()], edge.weight())
        })
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    fn touches_root(&self, left: NodeIndex, right: NodeIndex) -> bool {
        let root_index = self.root.as_ref().and_then(|root| self.index.get(root));
        root_index.map_or(false, |&root| root == left || root == right)
    }

    /// Colours spoke edges by correlation sign and derives every edge weight.
    fn style_edges(&mut self, options: &NetworkOptions) {
        let edge_indices: Vec<_> = self.graph.edge_indices().collect();
        for edge_index in edge_indices {
            let touches_root = match self.graph.edge_endpoints(edge_index) {
                Some((a, b)) => self.touches_root(a, b),
                None => continue,
            };

            let edge = &mut self.graph[edge_index];
            edge.color = match (touches_root, edge.correlation > 0.0) {
                (true, true) => POSITIVE_ROOT_EDGE_COLOR,
                (true, false) => NEGATIVE_ROOT_EDGE_COLOR,
                (false, _) => options.default_edge_color,
            };
            edge.weight = options.edge_weight(edge);
        }
    }

    fn relayout(&mut self, options: &NetworkOptions, center: Position) -> Result<()> {
        let nodes: Vec<String> = self.graph.node_weights().map(|node| node.gene.clone()).collect();
        let edges: Vec<(usize, usize, f64)> = self
            .graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index(), edge.weight().weight))
            .collect();

        let params = SpringParams {
            k: options.spring_k,
            iterations: options.spring_iterations,
            center,
        };
        self.positions = spring_layout(&nodes, &edges, &self.positions, params)?;
        Ok(())
    }

    /// Per-node and per-edge drawing attributes.
    ///
    /// Every node needs a position and, unless the default node colour is
    /// requested, a colour for its cluster.
    pub fn render_spec(
        &self,
        node_colors: &BTreeMap<ClusterId, Rgb>,
        options: &NetworkOptions,
    ) -> Result<RenderSpec> {
        let position_of = |gene: &str| {
            self.positions
                .get(gene)
                .copied()
                .ok_or_else(|| CodepNetError::MissingPosition(gene.to_string()))
        };

        let nodes = self
            .nodes()
            .map(|node| -> Result<RenderNode> {
                let color = if options.use_default_node_color {
                    options.default_node_color
                } else {
                    node_colors
                        .get(&node.cluster_id)
                        .map(|&color| Rgba::from(color))
                        .ok_or(CodepNetError::MissingNodeColor(node.cluster_id))?
                };
                let (x, y) = position_of(&node.gene)?;

                Ok(RenderNode {
                    gene: node.gene.clone(),
                    role: node.role,
                    cluster_id: node.cluster_id,
                    x,
                    y,
                    size: node.size,
                    color,
                    label: options.label_nodes.then(|| node.gene.clone()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let edges = self
            .edges()
            .map(|(source, target, edge)| -> Result<RenderEdge> {
                Ok(RenderEdge {
                    source: source.gene.clone(),
                    target: target.gene.clone(),
                    from: position_of(&source.gene)?,
                    to: position_of(&target.gene)?,
                    color: if options.use_default_edge_color {
                        options.default_edge_color
                    } else {
                        edge.color
                    },
                    width: edge.weight,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RenderSpec {
            nodes,
            edges,
            width: options.figure_size.0,
            height: options.figure_size.1,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub gene: String,
    pub role: NodeRole,
    pub cluster_id: ClusterId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: Rgba,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEdge {
    pub source: String,
    pub target: String,
    pub from: Position,
    pub to: Position,
    pub color: Rgba,
    pub width: f64,
}

/// Everything a renderer needs to draw a network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSpec {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub width: usize,
    pub height: usize,
}

/// Genes drawn in the network: both endpoints of the selected interactions
/// (plus the root without a cluster allowlist), restricted to genes with a
/// layout position.
fn eligible_genes(
    interactions: &[InteractionRecord],
    root: Option<&str>,
    positions: &Positions,
    options: &NetworkOptions,
) -> FxHashSet<String> {
    let selected = interactions.iter().filter(|record| match &options.clusters_to_include {
        Some(allowed) => record.cluster_id.map_or(false, |id| allowed.contains(&id)),
        None => true,
    });

    let mut genes: FxHashSet<String> = selected
        .flat_map(|record| [record.protein.clone(), record.partner.clone()])
        .collect();
    if options.clusters_to_include.is_none() {
        genes.extend(root.map(str::to_string));
    }

    genes.retain(|gene| positions.contains_key(gene));
    genes
}

/// Builds the network around `inputs.root`.
///
/// Neighbors are added in co-dependency order, followed by eligible genes
/// the co-dependency table does not cover. Spoke edges from the root carry
/// the neighbor's correlation; interaction edges carry coexpression and
/// combined score with zeroed correlation fields.
pub fn build_network(inputs: &NetworkInputs, options: &NetworkOptions) -> Result<GeneNetwork> {
    let root = inputs.root.map(str::to_uppercase);
    let codep = codep_records(inputs.codep)?;
    let interactions = interaction_records(inputs.interactions)?;
    let eligible = eligible_genes(&interactions, root.as_deref(), inputs.positions, options);

    let mut network = GeneNetwork::new(root.clone());

    if let Some(root) = &root {
        let position = inputs
            .positions
            .get(root)
            .copied()
            .ok_or_else(|| CodepNetError::MissingPosition(root.clone()))?;
        network.positions.insert(root.clone(), position);
        network.add_node(GeneNode {
            gene: root.clone(),
            role: NodeRole::Root,
            size: options.root_size,
            cluster_id: ROOT_CLUSTER_ID,
            relative_corr: None,
        });
    }

    let codep_by_gene: FxHashMap<&str, &CodepRecord> = codep
        .iter()
        .rev()
        .map(|record| (record.gene.as_str(), record))
        .collect();
    let mut neighbors: Vec<&str> = codep
        .iter()
        .map(|record| record.gene.as_str())
        .filter(|gene| eligible.contains(*gene))
        .collect();
    let mut uncovered: Vec<&str> = eligible
        .iter()
        .map(String::as_str)
        .filter(|gene| !codep_by_gene.contains_key(gene))
        .collect();
    uncovered.sort_unstable();
    neighbors.extend(uncovered);

    for gene in neighbors {
        if root.as_deref() == Some(gene) || network.index.contains_key(gene) {
            continue;
        }
        let cluster_id = inputs
            .cluster_map
            .get(gene)
            .copied()
            .ok_or_else(|| CodepNetError::MissingCluster(gene.to_string()))?;
        let record = codep_by_gene.get(gene);

        let position = inputs
            .positions
            .get(gene)
            .copied()
            .ok_or_else(|| CodepNetError::MissingPosition(gene.to_string()))?;
        network.positions.insert(gene.to_string(), position);
        network.add_node(GeneNode {
            gene: gene.to_string(),
            role: NodeRole::Neighbor,
            size: options.neighbor_size(),
            cluster_id,
            relative_corr: record.and_then(|r| r.relative_corr),
        });

        if let (true, Some(root), Some(record)) = (options.add_root_edge, &root, record) {
            match record.correlation {
                Some(correlation) => {
                    let spoke = GeneEdge::spoke(correlation, record.relative_corr.unwrap_or(0.0));
                    network.upsert_edge(root, gene, spoke);
                }
                None => debug!("No correlation for {}, skipping its root edge", gene),
            }
        }
    }

    for record in &interactions {
        if eligible.contains(&record.protein) && eligible.contains(&record.partner) {
            network.upsert_edge(&record.protein, &record.partner, GeneEdge::interaction(record));
        }
    }

    network.style_edges(options);

    if options.spring_layout {
        let center = root
            .as_ref()
            .and_then(|root| inputs.positions.get(root).copied())
            .unwrap_or((0.0, 0.0));
        network.relayout(options, center)?;
    }

    info!(
        "Assembled network with {} nodes and {} edges",
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use strum::IntoEnumIterator;

    struct Fixture {
        codep: DataFrame,
        interactions: DataFrame,
        cluster_map: ClusterMap,
        positions: Positions,
    }

    impl Fixture {
        fn new() -> Self {
            let codep = df!(
                "gene" => ["A", "B", "C"],
                "correlation" => [0.8f64, -0.4, 0.1],
                "abs_corr" => [0.8f64, 0.4, 0.1],
                "relative_corr" => [1.0f64, 0.5, 0.0],
                "log_relative_corr" => [2f64.ln(), 1.5f64.ln(), 0.0],
                "edge_color_r" => [0.1f64, 0.2, 0.3],
                "edge_color_g" => [0.1f64, 0.2, 0.3],
                "edge_color_b" => [0.1f64, 0.2, 0.3]
            )
            .unwrap();
            let interactions = df!(
                "protein" => ["A", "C", "B"],
                "n2" => ["B", "D", "A"],
                "coexpression" => [0.5f64, 0.2, 0.5],
                "combined_score" => [900.0f64, 300.0, 900.0],
                "cluster_id" => [1i64, 2, 1]
            )
            .unwrap();
            let cluster_map: ClusterMap = [("R", 0), ("A", 1), ("B", 1), ("C", 2), ("D", 2)]
                .iter()
                .map(|(gene, id)| (gene.to_string(), *id))
                .collect();
            let positions: Positions = [
                ("R", (0.0, 0.0)),
                ("A", (1.0, 0.0)),
                ("B", (0.0, 1.0)),
                ("C", (-1.0, 0.0)),
            ]
            .iter()
            .map(|(gene, p)| (gene.to_string(), *p))
            .collect();

            Fixture { codep, interactions, cluster_map, positions }
        }

        fn inputs(&self) -> NetworkInputs<'_> {
            NetworkInputs {
                codep: &self.codep,
                interactions: &self.interactions,
                cluster_map: &self.cluster_map,
                positions: &self.positions,
                root: Some("r"),
            }
        }
    }

    fn node_colors() -> BTreeMap<ClusterId, Rgb> {
        [(0, Rgb::new(1.0, 0.0, 0.0)), (1, Rgb::new(0.0, 1.0, 0.0)), (2, Rgb::new(0.0, 0.0, 1.0))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_nodes_without_position_are_dropped() {
        let fixture = Fixture::new();
        let network = build_network(&fixture.inputs(), &NetworkOptions::default()).unwrap();

        assert_eq!(network.root(), Some("R"));
        assert_eq!(network.node_count(), 4);
        assert!(network.node("D").is_none());

        let root = network.node("R").unwrap();
        assert_eq!(root.role, NodeRole::Root);
        assert_eq!(root.size, 3000.0);
        assert_eq!(root.cluster_id, ROOT_CLUSTER_ID);

        let a = network.node("A").unwrap();
        assert_eq!(a.role, NodeRole::Neighbor);
        assert_eq!(a.size, 1200.0);
        assert_eq!(a.cluster_id, 1);
        assert_eq!(a.relative_corr, Some(1.0));
    }

    #[test]
    fn test_interaction_edges_are_unordered_pairs() {
        let fixture = Fixture::new();
        let network = build_network(&fixture.inputs(), &NetworkOptions::default()).unwrap();

        assert_eq!(network.edge_count(), 1);
        let edge = network.edge("B", "A").unwrap();
        assert_eq!(edge.coexpression, 0.5);
        assert_eq!(edge.combined_score, 900.0);
        assert_eq!(edge.correlation, 0.0);
        assert_eq!(edge.color, NetworkOptions::default().default_edge_color);
        assert_eq!(edge.weight, 1.0);
    }

    #[test]
    fn test_root_spokes_are_colored_by_sign() {
        let fixture = Fixture::new();
        let options = NetworkOptions { add_root_edge: true, ..NetworkOptions::default() };
        let network = build_network(&fixture.inputs(), &options).unwrap();

        assert_eq!(network.edge_count(), 4);

        let positive = network.edge("R", "A").unwrap();
        assert_eq!(positive.color, POSITIVE_ROOT_EDGE_COLOR);
        assert!((positive.weight - 17.0).abs() < 1e-9);
        assert_eq!(positive.relative_correlation, 1.0);

        let negative = network.edge("B", "R").unwrap();
        assert_eq!(negative.color, NEGATIVE_ROOT_EDGE_COLOR);
        assert!((negative.weight - 9.0).abs() < 1e-9);

        assert_eq!(network.edge("A", "B").unwrap().color, options.default_edge_color);
    }

    #[test]
    fn test_uniform_weight_without_column() {
        let fixture = Fixture::new();
        let options = NetworkOptions {
            add_root_edge: true,
            width_column: None,
            ..NetworkOptions::default()
        };
        let network = build_network(&fixture.inputs(), &options).unwrap();
        assert!(network.edges().all(|(_, _, edge)| edge.weight == 1.0));
    }

    #[test]
    fn test_weight_columns() {
        let edge = GeneEdge {
            coexpression: 0.25,
            combined_score: 0.5,
            correlation: -0.1,
            relative_correlation: 0.75,
            color: POSITIVE_ROOT_EDGE_COLOR,
            weight: 1.0,
        };
        let values: Vec<f64> = WeightColumn::iter().map(|column| column.value(&edge)).collect();
        assert_eq!(values, vec![-0.1, 0.75, 0.25, 0.5]);

        let options = NetworkOptions::default();
        assert!((options.edge_weight(&edge) - 3.0).abs() < 1e-9);
        assert_eq!(WeightColumn::Correlation.to_string(), "corr");
    }

    #[test]
    fn test_right_only_endpoints_are_eligible() {
        let mut fixture = Fixture::new();
        fixture.interactions = df!(
            "protein" => ["A"],
            "n2" => ["E"],
            "coexpression" => [0.7f64],
            "combined_score" => [800.0f64],
            "cluster_id" => [1i64]
        )
        .unwrap();
        fixture.cluster_map.insert("E".to_string(), 1);
        fixture.positions.insert("E".to_string(), (2.0, 2.0));

        let network = build_network(&fixture.inputs(), &NetworkOptions::default()).unwrap();

        let e = network.node("E").unwrap();
        assert_eq!(e.role, NodeRole::Neighbor);
        assert_eq!(e.cluster_id, 1);
        assert_eq!(e.relative_corr, None);
        assert_eq!(network.edge("E", "A").unwrap().coexpression, 0.7);
        assert!(network.node("B").is_none());
        assert_eq!(network.node_count(), 3);
    }

    #[test]
    fn test_cluster_allowlist() {
        let fixture = Fixture::new();
        let options = NetworkOptions {
            clusters_to_include: Some(vec![1]),
            ..NetworkOptions::default()
        };
        let network = build_network(&fixture.inputs(), &options).unwrap();

        let mut genes: Vec<&str> = network.nodes().map(|node| node.gene.as_str()).collect();
        genes.sort_unstable();
        assert_eq!(genes, vec!["A", "B", "R"]);
    }

    #[test]
    fn test_missing_root_position_is_fatal() {
        let mut fixture = Fixture::new();
        fixture.positions.remove("R");
        let result = build_network(&fixture.inputs(), &NetworkOptions::default());
        assert!(matches!(result, Err(CodepNetError::MissingPosition(gene)) if gene == "R"));
    }

    #[test]
    fn test_render_spec() {
        let fixture = Fixture::new();
        let options = NetworkOptions { add_root_edge: true, ..NetworkOptions::default() };
        let network = build_network(&fixture.inputs(), &options).unwrap();

        let spec = network.render_spec(&node_colors(), &options).unwrap();
        assert_eq!(spec.nodes.len(), 4);
        assert_eq!(spec.edges.len(), 4);
        assert_eq!((spec.width, spec.height), (1200, 1200));

        let root = spec.nodes.iter().find(|node| node.gene == "R").unwrap();
        assert_eq!(root.color, Rgba::new(255, 0, 0, 255));
        assert_eq!(root.label.as_deref(), Some("R"));
        assert!(spec.edges.iter().all(|edge| edge.color == options.default_edge_color));

        let colored = NetworkOptions { use_default_edge_color: false, ..options.clone() };
        let spec = network.render_spec(&node_colors(), &colored).unwrap();
        let spoke = spec
            .edges
            .iter()
            .find(|edge| (edge.source.as_str(), edge.target.as_str()) == ("R", "B"))
            .unwrap();
        assert_eq!(spoke.color, NEGATIVE_ROOT_EDGE_COLOR);
        assert_eq!(spoke.from, (0.0, 0.0));
        assert_eq!(spoke.to, (0.0, 1.0));
    }

    #[test]
    fn test_render_spec_requires_cluster_colors() {
        let fixture = Fixture::new();
        let options = NetworkOptions::default();
        let network = build_network(&fixture.inputs(), &options).unwrap();

        let mut colors = node_colors();
        colors.remove(&2);
        let result = network.render_spec(&colors, &options);
        assert!(matches!(result, Err(CodepNetError::MissingNodeColor(2))));

        let uniform = NetworkOptions { use_default_node_color: true, ..options };
        let spec = network.render_spec(&colors, &uniform).unwrap();
        assert!(spec.nodes.iter().all(|node| node.color == uniform.default_node_color));
    }

    #[test]
    fn test_spring_layout_is_centered_on_root() {
        let mut fixture = Fixture::new();
        for position in fixture.positions.values_mut() {
            position.0 += 10.0;
        }
        let options = NetworkOptions {
            add_root_edge: true,
            spring_layout: true,
            ..NetworkOptions::default()
        };
        let network = build_network(&fixture.inputs(), &options).unwrap();

        let positions = network.positions();
        assert_eq!(positions.len(), 4);
        let mean_x = positions.values().map(|p| p.0).sum::<f64>() / 4.0;
        let mean_y = positions.values().map(|p| p.1).sum::<f64>() / 4.0;
        assert!((mean_x - 10.0).abs() < 1e-9);
        assert!(mean_y.abs() < 1e-9);
    }
}
