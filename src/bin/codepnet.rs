use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{Context, Result};
use log::error;
use rayon::prelude::*;

use codepnet::analysis::{
    network_graph::*,
    network_pipeline::*,
    preprocess::DEFAULT_GENE_THRESHOLD,
};
use codepnet::parsers::dataset_parser::DEFAULT_SPECIES;
use codepnet::utils::colors::colormap_names;

#[derive(Parser, Debug)]
#[command(name = "codepnet", about, version, author)]
struct CliArgs {
    #[arg(
        value_name = "GENE",
        help = "Root genes to build co-dependency networks for.",
        required = true,
        num_args = 1..
    )]
    genes: Vec<String>,

    #[arg(
        short = 's',
        long = "species",
        value_name = "SPECIES",
        help = "Species folder holding the String-db exports.",
        default_value = DEFAULT_SPECIES
    )]
    species: String,

    #[arg(
        short = 'i',
        long = "input",
        value_name = "DIRECTORY",
        help = "Directory containing one dataset folder per gene. Defaults to ./<GENE> for each gene.",
    )]
    data_dir: Option<PathBuf>,

    #[arg(
        short = 'd',
        long = "dir",
        value_name = "DIRECTORY",
        help = "Directory to write the network plot and tables of each gene.",
        required = true
    )]
    output_dir: PathBuf,

    #[arg(
        short = 't',
        long = "gene-threshold",
        value_name = "COUNT",
        help = "Minimum number of genes a String-db cluster must have to be kept.",
        default_value_t = DEFAULT_GENE_THRESHOLD
    )]
    gene_threshold: i64,

    #[arg(
        long = "codep-colormap",
        value_name = "NAME",
        help = "Colormap for co-dependency edge colours.",
        default_value = DEFAULT_COLORMAP
    )]
    codep_colormap: String,

    #[arg(
        long = "cluster-colormap",
        value_name = "NAME",
        help = "Colormap for cluster node colours.",
        default_value = DEFAULT_COLORMAP
    )]
    cluster_colormap: String,

    #[arg(
        short = 'o',
        long = "options",
        value_name = "FILE",
        help = "JSON file with network drawing options. Missing fields keep their defaults.",
    )]
    options_file: Option<PathBuf>,

    #[arg(
        short = 'c',
        long = "clusters",
        value_name = "IDS",
        help = "Only draw genes from these cluster ids.",
        value_delimiter = ','
    )]
    clusters: Option<Vec<i64>>,

    #[arg(
        long = "root-edges",
        help = "Connect the root to every co-dependent neighbour.",
    )]
    root_edges: bool,

    #[arg(
        long = "spring",
        help = "Relax the String-db layout with a force-directed layout centred on the root.",
    )]
    spring: bool,

    #[arg(
        short = 'w',
        long = "width-column",
        value_enum,
        help = "Edge attribute used for edge widths.",
    )]
    width_column: Option<WeightColumn>,

    #[arg(
        long = "rotate",
        value_name = "DEGREES",
        help = "Rotate the layout around the root gene.",
        allow_negative_numbers = true
    )]
    rotate: Option<f64>,

    #[arg(
        long = "cores",
        value_name = "NUMBER",
        help = "Number of cores to use. Uses all available by default.",
        default_value_t = num_cpus::get()
    )]
    num_cores: usize,
}

fn read_options(path: &Path) -> Result<NetworkOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    let options = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse options file {}", path.display()))?;
    Ok(options)
}

fn network_options(cli_args: &CliArgs) -> Result<NetworkOptions> {
    let mut options = match &cli_args.options_file {
        Some(path) => read_options(path)?,
        None => NetworkOptions::default(),
    };
    if let Some(clusters) = &cli_args.clusters {
        options.clusters_to_include = Some(clusters.clone());
    }
    if cli_args.root_edges {
        options.add_root_edge = true;
    }
    if cli_args.spring {
        options.spring_layout = true;
    }
    if cli_args.width_column.is_some() {
        options.width_column = cli_args.width_column;
    }
    Ok(options)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli_args: CliArgs = CliArgs::parse();

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(cli_args.num_cores)
        .build_global() {
        eprintln!("Failed to initialize Rayon global thread pool: {:?}", e);
    };

    let options = match network_options(&cli_args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error loading network options: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = PipelineConfig {
        species: cli_args.species.clone(),
        data_dir: cli_args.data_dir.clone(),
        gene_threshold: cli_args.gene_threshold,
        codep_colormap: cli_args.codep_colormap.clone(),
        cluster_colormap: cli_args.cluster_colormap.clone(),
        output_dir: cli_args.output_dir.clone(),
        options,
        rotate_degrees: cli_args.rotate,
    };

    println!("Building networks for {} gene(s)\n", cli_args.genes.len());

    let results: Vec<(String, codepnet::Result<GeneOutputs>)> = cli_args
        .genes
        .par_iter()
        .map(|gene| (gene.clone(), run_gene(gene, &config)))
        .collect();

    let mut failures = 0;
    for (gene, result) in results {
        match result {
            Ok(outputs) => println!(
                "{}: {} nodes, {} edges -> {}",
                outputs.gene,
                outputs.node_count,
                outputs.edge_count,
                outputs.plot.display()
            ),
            Err(codepnet::CodepNetError::UnknownColormap(name)) => {
                error!("{}: unknown colormap '{}'", gene, name);
                eprintln!("Available colormaps: {}", colormap_names().join(", "));
                failures += 1;
            }
            Err(e) => {
                error!("{}: {}", gene, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("\n{} of {} gene(s) failed", failures, cli_args.genes.len());
        return ExitCode::FAILURE;
    }

    println!("\nDone");
    ExitCode::SUCCESS
}
