use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use csv::WriterBuilder;
use log::info;
use plotly::{
    Plot, Layout, Scatter,
    common::{
        Title, Font, Mode, Line, Marker, HoverInfo, Position
    },
    layout::{
        Axis, Margin, HoverMode
    }
};
use serde::Serialize;
use crate::analysis::network_graph::{GeneNetwork, NodeRole, RenderSpec};
use crate::error::Result;

const BUFFER_SIZE: usize = 8192 * 32;

fn hidden_axis() -> Axis {
    Axis::new()
        .show_grid(false)
        .zero_line(false)
        .show_line(false)
        .show_tick_labels(false)
}

/// Node sizes are areas; plotly markers take a diameter in pixels.
fn marker_diameter(area: f64) -> usize {
    area.max(0.0).sqrt().round() as usize
}

/// Draws the network into an interactive HTML figure.
pub fn network_plot(spec: &RenderSpec, title: &str, plot_path: &Path) -> Result<()> {
    if let Some(parent) = plot_path.parent() {
        create_dir_all(parent)?;
    }

    let mut plot = Plot::new();

    for edge in &spec.edges {
        let edge_trace = Scatter::new(vec![edge.from.0, edge.to.0], vec![edge.from.1, edge.to.1])
            .mode(Mode::Lines)
            .line(Line::new().color(edge.color.to_css()).width(edge.width))
            .hover_info(HoverInfo::Skip)
            .show_legend(false);
        plot.add_trace(edge_trace);
    }

    let xs: Vec<f64> = spec.nodes.iter().map(|node| node.x).collect();
    let ys: Vec<f64> = spec.nodes.iter().map(|node| node.y).collect();
    let sizes: Vec<usize> = spec.nodes.iter().map(|node| marker_diameter(node.size)).collect();
    let colors: Vec<String> = spec.nodes.iter().map(|node| node.color.to_css()).collect();
    let hover: Vec<String> = spec
        .nodes
        .iter()
        .map(|node| match node.role {
            NodeRole::Root => format!("{} (root)", node.gene),
            NodeRole::Neighbor => format!("{} (cluster {})", node.gene, node.cluster_id),
        })
        .collect();
    let labels: Vec<String> = spec
        .nodes
        .iter()
        .map(|node| node.label.clone().unwrap_or_default())
        .collect();

    let show_labels = spec.nodes.iter().any(|node| node.label.is_some());
    let node_trace = Scatter::new(xs, ys)
        .mode(if show_labels { Mode::MarkersText } else { Mode::Markers })
        .text_array(labels)
        .text_position(Position::MiddleCenter)
        .text_font(Font::new().size(10))
        .hover_text_array(hover)
        .hover_info(HoverInfo::Text)
        .marker(Marker::new().size_array(sizes).color_array(colors))
        .show_legend(false);
    plot.add_trace(node_trace);

    let layout = Layout::new()
        .title(Title::with_text(title).font(Font::new().size(16)))
        .width(spec.width)
        .height(spec.height)
        .margin(Margin::new().left(20).right(20).top(50).bottom(20))
        .hover_mode(HoverMode::Closest)
        .show_legend(false)
        .x_axis(hidden_axis())
        .y_axis(hidden_axis());
    plot.set_layout(layout);

    plot.write_html(plot_path);
    info!("Wrote network plot to: {}", plot_path.display());
    Ok(())
}

#[derive(Debug, Serialize)]
struct EdgeRow<'a> {
    source: &'a str,
    target: &'a str,
    coexpression: f64,
    combined_score: f64,
    correlation: f64,
    relative_correlation: f64,
    color: String,
    weight: f64,
}

/// Writes `nodes.tsv` and `edges.tsv` into `output_dir` and returns their paths.
pub fn write_network_tables(network: &GeneNetwork, output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    create_dir_all(output_dir)?;
    let nodes_path = output_dir.join("nodes.tsv");
    let edges_path = output_dir.join("edges.tsv");

    let mut node_writer = WriterBuilder::new().delimiter(b'\t').from_path(&nodes_path)?;
    for node in network.nodes() {
        node_writer.serialize(node)?;
    }
    node_writer.flush()?;

    let mut edge_writer = WriterBuilder::new().delimiter(b'\t').from_path(&edges_path)?;
    for (source, target, edge) in network.edges() {
        edge_writer.serialize(EdgeRow {
            source: &source.gene,
            target: &target.gene,
            coexpression: edge.coexpression,
            combined_score: edge.combined_score,
            correlation: edge.correlation,
            relative_correlation: edge.relative_correlation,
            color: edge.color.to_hex(),
            weight: edge.weight,
        })?;
    }
    edge_writer.flush()?;

    Ok((nodes_path, edges_path))
}

/// Serializes a render spec for renderers outside this crate.
pub fn write_network_json(spec: &RenderSpec, json_path: &Path) -> Result<()> {
    if let Some(parent) = json_path.parent() {
        create_dir_all(parent)?;
    }
    let writer = BufWriter::with_capacity(BUFFER_SIZE, File::create(json_path)?);
    serde_json::to_writer_pretty(writer, spec)?;
    Ok(())
}
