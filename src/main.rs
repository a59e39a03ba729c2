//! Ortho Router CLI
//!
//! Usage:
//!   ortho-router [OPTIONS] [FILE]
//!
//! Options:
//!   -o, --output <FILE>  Write the SVG to a file instead of stdout
//!   -d, --debug          Overlay visited search nodes and log at debug level
//!   --no-refine          Skip route clearance and simplification
//!   -h, --help           Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ortho_router::{render_scene, RenderConfig, Scene};

#[derive(Parser)]
#[command(name = "ortho-router")]
#[command(about = "Route orthogonal connectors between boxes and render them as SVG")]
struct Cli {
    /// Scene file in TOML format (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug mode: overlay visited search nodes
    #[arg(short, long)]
    debug: bool,

    /// Skip route refinement
    #[arg(long)]
    no_refine: bool,
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if cli.input.is_none() && io::stdin().is_terminal() {
        eprintln!("ortho-router: pass a scene file or pipe one on stdin (see --help)");
        std::process::exit(2);
    }

    let loaded = match &cli.input {
        Some(path) => Scene::from_file(path),
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            Scene::from_str(&buffer)
        }
    };
    let scene = match loaded {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = RenderConfig::new()
        .with_refine(!cli.no_refine)
        .with_debug(cli.debug);
    let svg = match render_scene(&scene, &config) {
        Ok(svg) => svg,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, svg) {
                eprintln!("Error writing file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => print!("{}", svg),
    }
}
