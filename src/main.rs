use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use meshcluster::error::MeshClusterError;
use meshcluster::parser::ply::{DiscoveryOrder, DEFAULT_EXTENSION};
use meshcluster::pipeline::{Pipeline, PipelineConfig, DEFAULT_MESH_FILE, DEFAULT_PARTITIONS_DIR};
use meshcluster::writer::txt_writer::TxtWriter;
use meshcluster::writer::xml_writer::VTUWriter;
use meshcluster::{ClusterRegistry, PointCloud};

/// Assign mesh elements to the nearest point-cloud cluster
#[derive(Parser)]
#[command(name = "meshcluster")]
#[command(version)]
#[command(about = "Assign each tetrahedral element of a mesh to the nearest point-cloud cluster")]
struct Args {
    /// Mesh file (node and element records)
    #[arg(short, long, default_value = DEFAULT_MESH_FILE)]
    mesh: PathBuf,

    /// Directory holding one point-cloud file per cluster
    #[arg(short, long, default_value = DEFAULT_PARTITIONS_DIR)]
    partitions: PathBuf,

    /// Extension of the cluster files
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Number clusters in directory listing order instead of by file name
    #[arg(long)]
    directory_order: bool,

    /// Worker threads (0 = one per CPU)
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// Also write the assignment list to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a .vtu file with the cluster id of every assigned element
    #[arg(long)]
    vtu: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            mesh_file: self.mesh.clone(),
            partitions_dir: self.partitions.clone(),
            extension: self.extension.clone(),
            order: if self.directory_order { DiscoveryOrder::Directory } else { DiscoveryOrder::Sorted },
            threads: self.threads,
        }
    }
}

fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the report
    let filter = match args.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&args) {
        match &e {
            MeshClusterError::Parse(err) if err.is_not_found() => {
                eprintln!("Error: mesh file {} not found", args.mesh.display());
            }
            _ => eprintln!("Error: {}", e),
        }
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), MeshClusterError> {
    let config = args.pipeline_config();

    let mesh_data = Pipeline::load_mesh(&config)?;
    println!("Number of nodes: {}", mesh_data.num_nodes);
    println!("Number of elements: {}", mesh_data.num_elements);

    let clouds = Pipeline::load_clusters(&config)?;
    println!("Found {} clusters (.{} files).", clouds.len(), config.extension);
    if clouds.is_empty() {
        println!("No .{} files in {}.", config.extension, config.partitions_dir.display());
        return Ok(());
    }

    let registry = ClusterRegistry::build(&clouds);
    print_cluster_table(&clouds);

    let report = Pipeline::assign(&config, &mesh_data, &registry)?;

    println!("Element - cluster:");
    TxtWriter::write_assignments(&mut io::stdout().lock(), &report.assignments)?;

    if !report.excluded.is_empty() {
        eprintln!("{} element(s) skipped, see warnings above.", report.excluded.len());
    }

    if let Some(path) = &args.output {
        TxtWriter::write_assignments_file(path, &report.assignments)?;
    }
    if let Some(path) = &args.vtu {
        VTUWriter::write_assignment_vtu(&mesh_data, &report, path)?;
    }

    Ok(())
}

/// Cluster ids are positions in discovery order; show which file each one is.
fn print_cluster_table(clouds: &[PointCloud]) {
    for (i, cloud) in clouds.iter().enumerate() {
        let cluster_id = i + 1;
        if cloud.is_empty() {
            println!("  cluster {}: {} (empty, ignored)", cluster_id, cloud.name);
        } else {
            println!("  cluster {}: {} ({} points)", cluster_id, cloud.name, cloud.len());
        }
    }
}
