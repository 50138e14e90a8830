//! tessel CLI - polygon Booleans and plane slicing of triangle meshes.
//!
//! Inputs and outputs are JSON. Polygon sets are lists of rings of `[x, y]`
//! points; meshes are objects with `vertices` and `triangles`.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::{de::DeserializeOwned, Serialize};
use tessel_kernel_math::{Plane, Vec3};
use tessel_kernel_mesh::{MeshData, TessellatedSolid};
use tessel_kernel_polygon::{boolean_operation, BooleanOp, Polygon, ResultPath};
use tessel_slicer::slice_on_flat;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
use config::Config;

#[derive(Parser)]
#[command(name = "tessel")]
#[command(about = "Polygon Booleans and plane slicing of triangle meshes", long_about = None)]
struct Cli {
    /// Settings file (TOML with [boolean] and [slice] tables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine two polygon sets
    Boolean {
        /// Operation to apply
        #[arg(value_enum)]
        op: Operation,
        /// Subject polygon set
        subject: PathBuf,
        /// Clip polygon set
        clip: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Cut a mesh in two along a plane
    Slice {
        /// Mesh to cut
        mesh: PathBuf,
        /// Plane normal
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true, default_values_t = [0.0, 0.0, 1.0])]
        normal: Vec<f64>,
        /// Plane offset along the normal
        #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
        distance: f64,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Operation {
    Union,
    Intersection,
    Difference,
    Xor,
}

impl From<Operation> for BooleanOp {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Union => BooleanOp::Union,
            Operation::Intersection => BooleanOp::Intersection,
            Operation::Difference => BooleanOp::Difference,
            Operation::Xor => BooleanOp::Xor,
        }
    }
}

#[derive(Serialize)]
struct SliceOutput {
    positive: Vec<MeshData>,
    negative: Vec<MeshData>,
    loops: Vec<LoopSummary>,
}

#[derive(Serialize)]
struct LoopSummary {
    is_positive: bool,
    area: f64,
    perimeter: f64,
    points: Vec<[f64; 2]>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Boolean {
            op,
            subject,
            clip,
            output,
        } => {
            let paths = run_boolean(op.into(), &subject, &clip, &config)?;
            write_json(output.as_deref(), &paths)?;
        }
        Commands::Slice {
            mesh,
            normal,
            distance,
            output,
        } => {
            let result = run_slice(&mesh, &normal, distance, &config)?;
            write_json(output.as_deref(), &result)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("tessel", level)
        .with_target("tessel_kernel_polygon", level)
        .with_target("tessel_kernel_mesh", level)
        .with_target("tessel_slicer", level);
    let format = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    tracing_subscriber::registry().with(filter).with(format).init();
}

fn run_boolean(op: BooleanOp, subject: &Path, clip: &Path, config: &Config) -> Result<Vec<ResultPath>> {
    let subject = read_polygons(subject)?;
    let clip = read_polygons(clip)?;
    info!(?op, subject = subject.len(), clip = clip.len(), "Running boolean");
    let paths = boolean_operation(&subject, &clip, op, &config.boolean)?;
    info!(rings = paths.len(), "Boolean done");
    Ok(paths)
}

fn run_slice(path: &Path, normal: &[f64], distance: f64, config: &Config) -> Result<SliceOutput> {
    let data: MeshData = read_json(path)?;
    let [x, y, z] = normal else {
        anyhow::bail!("plane normal needs three components");
    };
    let plane =
        Plane::try_from_raw(Vec3::new(*x, *y, *z), distance).context("plane normal has zero length")?;

    let mut mesh = TessellatedSolid::from_data(&data)?;
    info!(
        vertices = mesh.num_vertices(),
        faces = mesh.num_faces(),
        "Loaded {}",
        path.display()
    );
    let result = slice_on_flat(&mut mesh, &plane, &config.slice)?;
    let (positive, negative) = result.volumes();
    info!(positive, negative, "Sliced");

    Ok(SliceOutput {
        positive: result.positive_data(),
        negative: result.negative_data(),
        loops: result
            .loops
            .iter()
            .map(|l| LoopSummary {
                is_positive: l.is_positive,
                area: l.area,
                perimeter: l.perimeter,
                points: l.polygon.to_coords(),
            })
            .collect(),
    })
}

fn read_polygons(path: &Path) -> Result<Vec<Polygon>> {
    let rings: Vec<Vec<[f64; 2]>> = read_json(path)?;
    Ok(rings.iter().map(|r| Polygon::from_coords(r)).collect())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let string = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&string).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            fs::write(path, json)?;
            info!("Wrote {}", path.display());
        }
        None => writeln!(io::stdout(), "{json}")?,
    }
    Ok(())
}
