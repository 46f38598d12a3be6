//! Terrain Studio - headless host for the terrain sculpting engine
//!
//! Plays the part of the editor shell: loads configuration, builds or
//! imports the terrain, replays a pointer script through a perspective
//! camera, drains renderer notifications and writes the exported snapshot.
//!
//! ```bash
//! # Sculpt the built-in demo on a fresh plane
//! terrain-studio --output terrain.json
//!
//! # Re-open a previous export in edit mode and replay a script on it
//! terrain-studio --import terrain.json --script strokes.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use terrain_config::TerrainConfig;
use terrain_ipc::{EditorCommand, Modifiers, TerrainType};
use terrain_sculpting::{PerspectiveCamera, SceneMesh, SculptSession, TerrainSnapshot, Topology};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod renderer;
mod script;

use renderer::RendererStats;
use script::ScriptStep;

#[derive(Parser, Debug)]
#[command(name = "terrain-studio")]
#[command(about = "Sculpt and paint height-field terrain from a pointer script")]
#[command(version)]
struct Args {
    /// Configuration file (JSON); falls back to $TERRAIN_CONFIG, then defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pointer script to replay (JSON); the built-in demo when omitted
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Exported snapshot to open in edit mode instead of generating a plane
    #[arg(short, long)]
    import: Option<PathBuf>,

    /// Where to write the exported snapshot
    #[arg(short, long, default_value = "terrain.json")]
    output: PathBuf,

    /// Vertical field of view in degrees
    #[arg(long, default_value = "45")]
    fov: f32,

    /// Viewport aspect ratio
    #[arg(long, default_value = "1.7778")]
    aspect: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TerrainConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TerrainConfig::from_env().context("Failed to load config from TERRAIN_CONFIG")?,
    };
    config.validate().context("Invalid configuration")?;

    let steps = match &args.script {
        Some(path) => script::load(path)?,
        None => script::demo(),
    };

    let extent = config.map.size;
    let (mut session, receiver) = SculptSession::new(config);

    match &args.import {
        Some(path) => {
            let handle = SceneMesh::from(read_snapshot(path)?).into_handle();
            session
                .apply_command(EditorCommand::SetTerrainType(TerrainType::Edit))
                .context("Failed to switch to edit mode")?;
            session
                .enter_edit(handle)
                .with_context(|| format!("Cannot edit {}", path.display()))?;
        }
        None => {
            session.enter_create().context("Failed to generate terrain plane")?;
        }
    }

    info!(
        "Starting terrain studio in {} mode, {} script steps",
        session.terrain_type().label(),
        steps.len()
    );

    let camera = PerspectiveCamera::look_at(
        Vec3::new(0.0, extent * 0.8, extent * 0.8),
        Vec3::ZERO,
        args.fov.to_radians(),
        args.aspect,
    );

    let mut renderer = RendererStats::default();
    session.on_frame();
    renderer.drain(&receiver);

    for step in steps {
        match step {
            ScriptStep::Command(command) => {
                if let Err(e) = session.apply_command(command) {
                    warn!("Command rejected: {}", e);
                }
            }
            ScriptStep::Pointer(event) => {
                session.handle_pointer(event, &camera);
            }
            ScriptStep::Invert(held) => session.set_modifiers(Modifiers { invert: held }),
            ScriptStep::Frame => {
                session.on_frame();
                renderer.drain(&receiver);
                renderer.frames += 1;
                if let Some(mesh) = session.active_mesh() {
                    mesh.handle().borrow_mut().take_dirty();
                }
            }
        }
    }
    session.on_frame();
    renderer.drain(&receiver);

    info!(
        "Replay finished: {} frames, {} geometry uploads, {} cursor updates",
        renderer.frames, renderer.geometry_uploads, renderer.cursor_updates
    );

    let snapshot = session
        .export_snapshot()
        .context("No terrain to export")?;
    let json = serde_json::to_string(&snapshot).context("Failed to serialize snapshot")?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        "Wrote {} ({} vertices, {} triangles, peak height {:.3})",
        args.output.display(),
        snapshot.vertex_count(),
        snapshot.triangle_count(),
        peak_height(&snapshot)
    );

    Ok(())
}

fn read_snapshot(path: &Path) -> Result<TerrainSnapshot> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid snapshot {}", path.display()))
}

/// Highest vertex along the snapshot's local up axis.
fn peak_height(snapshot: &TerrainSnapshot) -> f32 {
    let axis = match snapshot.topology {
        Topology::Grid { .. } => 2,
        Topology::Arbitrary => 1,
    };
    snapshot
        .positions
        .iter()
        .map(|p| p[axis])
        .fold(f32::NEG_INFINITY, f32::max)
}
