//! Whittle CLI - mesh simplification command-line tool.
//!
//! Usage: whittle <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `whittle --help` for available commands. Set `RUST_LOG=whittle=debug`
//! to see the per-sweep trace.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use whittle::io;
use whittle::progress::Progress;
use whittle::simplify::{self, SimplifyOptions, DEFAULT_AGGRESSIVENESS, DEFAULT_MAX_ITERATIONS};

#[derive(Parser)]
#[command(name = "whittle")]
#[command(author, version, about = "Quadric-error mesh simplification", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Simplify a mesh by collapsing low-error edges
    Simplify {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Target number of triangles
        #[arg(short = 'f', long, conflicts_with = "ratio")]
        faces: Option<usize>,

        /// Target ratio of triangles to keep (0.0 to 1.0)
        #[arg(short, long, default_value = "0.5")]
        ratio: f64,

        /// Growth exponent of the per-sweep error threshold
        #[arg(short, long, default_value_t = DEFAULT_AGGRESSIVENESS)]
        aggressiveness: f64,

        /// Maximum number of sweeps
        #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
        max_iterations: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Simplify {
            input,
            output,
            faces,
            ratio,
            aggressiveness,
            max_iterations,
        } => {
            cmd_simplify(&input, &output, faces, ratio, aggressiveness, max_iterations)?;
        }
    }

    Ok(())
}

/// Fail early with a readable message instead of an OS error code.
fn require_input(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.is_file() {
        return Err(format!("input file not found: {}", input.display()).into());
    }
    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Monotonic: the sweep loop usually stops well before the cap.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        let percent = previous.max(raw_percent);
        if percent == previous && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {:<20}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    require_input(input)?;
    let mut mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Triangles: {}", mesh.num_triangles());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    mesh.rebuild_adjacency(true);
    let border = mesh.vertices().iter().filter(|v| v.is_border()).count();
    if border == 0 {
        println!("Topology: Closed (no border vertices)");
    } else {
        println!("Topology: Open ({} border vertices)", border);
    }

    Ok(())
}

fn cmd_simplify(
    input: &Path,
    output: &Path,
    faces: Option<usize>,
    ratio: f64,
    aggressiveness: f64,
    max_iterations: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    require_input(input)?;
    let mut mesh = io::load(input)?;

    println!("Loaded: {} vertices, {} triangles", mesh.num_vertices(), mesh.num_triangles());

    let options = match faces {
        Some(target) => {
            println!("Simplifying to {} triangles...", target);
            SimplifyOptions::with_target_triangles(target)
        }
        None => {
            println!("Simplifying to {:.0}% of triangles...", ratio * 100.0);
            SimplifyOptions::with_target_ratio(ratio)
        }
    }
    .with_aggressiveness(aggressiveness)
    .with_max_iterations(max_iterations);
    options.validate()?;

    let progress = create_progress();

    let start = Instant::now();
    let report = simplify::simplify_with_progress(&mut mesh, &options, &progress);
    let elapsed = start.elapsed();

    println!("{}", report);
    println!("Result: {} vertices, {} triangles", mesh.num_vertices(), mesh.num_triangles());
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
