// SPDX-License-Identifier: MIT OR Apache-2.0
//! `visject` - inspect and rewrite Visject graph blobs.
//!
//! ```bash
//! visject info graph.bin
//! visject dump graph.bin > graph.json
//! visject format graph.bin -o formatted.bin
//! visject upgrade old.bin -o new.bin
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use visject_graph::{codec, NodeFactory};
use visject_surface::{GraphReport, SurfaceSettings, VisjectSurface, SETTINGS_FILE_NAME};

#[derive(Parser)]
#[command(name = "visject")]
#[command(about = "Inspect and rewrite Visject graph blobs", long_about = None)]
struct Cli {
    /// Surface settings file (RON)
    #[arg(long, global = true, default_value = SETTINGS_FILE_NAME)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a short summary of a graph
    Info {
        /// Graph blob
        file: PathBuf,
    },

    /// Print a graph as JSON
    Dump {
        /// Graph blob
        file: PathBuf,
    },

    /// Auto-layout every node and save
    Format {
        /// Graph blob
        file: PathBuf,

        /// Output file; rewrites the input when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-save a graph of any version in the current format
    Upgrade {
        /// Graph blob
        file: PathBuf,

        /// Output file; rewrites the input when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("visject_surface=info,visject_graph=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = SurfaceSettings::load(&cli.settings)
        .with_context(|| format!("Failed to read settings {}", cli.settings.display()))?;

    match cli.command {
        Commands::Info { file } => {
            let (surface, version) = open(&file, settings)?;
            let report = GraphReport::new(surface.root(), version);
            println!("{}", file.display());
            println!("  version:     {}", report.version);
            println!("  nodes:       {}", report.nodes.len());
            println!("  missing:     {}", report.missing_count());
            println!("  connections: {}", report.connections.len());
            println!("  parameters:  {}", report.parameters.len());
        }
        Commands::Dump { file } => {
            let (surface, version) = open(&file, settings)?;
            let report = GraphReport::new(surface.root(), version);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Format { file, output } => {
            let (mut surface, _) = open(&file, settings)?;
            let moved = surface.format_graph(&[])?;
            tracing::info!("Moved {} nodes", moved);
            write(&mut surface, output.as_deref().unwrap_or(&file))?;
        }
        Commands::Upgrade { file, output } => {
            let (mut surface, version) = open(&file, settings)?;
            tracing::info!("Upgrading from version {} to {}", version, codec::VERSION);
            write(&mut surface, output.as_deref().unwrap_or(&file))?;
        }
    }
    Ok(())
}

fn open(path: &Path, settings: SurfaceSettings) -> Result<(VisjectSurface, u32)> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let version = codec::read_version(&bytes).with_context(|| format!("{} is not a graph", path.display()))?;
    let mut surface = VisjectSurface::new(NodeFactory::with_builtin(), settings);
    surface
        .load(&bytes)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok((surface, version))
}

fn write(surface: &mut VisjectSurface, path: &Path) -> Result<()> {
    let bytes = surface.save()?;
    std::fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
