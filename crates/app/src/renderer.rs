//! Stand-in for the renderer side of the engine channel.
//!
//! Consumes [`EngineToRenderer`] notifications the way a render loop would
//! once per frame, keeping counts for the end-of-run summary.

use crossbeam_channel::Receiver;
use terrain_ipc::EngineToRenderer;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RendererStats {
    pub geometry_uploads: usize,
    pub cursor_updates: usize,
    pub frames: usize,
    pub wireframe: bool,
    pub camera_controls: bool,
    pub camera_speed: f32,
}

impl RendererStats {
    /// Apply every pending notification.
    pub fn drain(&mut self, receiver: &Receiver<EngineToRenderer>) {
        for message in receiver.try_iter() {
            self.apply(&message);
        }
    }

    fn apply(&mut self, message: &EngineToRenderer) {
        match message {
            EngineToRenderer::GeometryDirty { mesh_id, positions, colors } => {
                self.geometry_uploads += 1;
                debug!("Upload mesh {} (positions={}, colors={})", mesh_id, positions, colors);
            }
            EngineToRenderer::VertexColorsEnabled { mesh_id } => {
                info!("Mesh {} now renders vertex colors", mesh_id);
            }
            EngineToRenderer::MeshBound { mesh_id, terrain_type } => {
                info!("Rendering mesh {} ({})", mesh_id, terrain_type.label());
            }
            EngineToRenderer::MeshReleased { mesh_id } => {
                debug!("Mesh {} released", mesh_id);
            }
            EngineToRenderer::BrushCursor { .. } => self.cursor_updates += 1,
            EngineToRenderer::CameraControlsEnabled { enabled } => self.camera_controls = *enabled,
            EngineToRenderer::WireframeChanged { enabled } => self.wireframe = *enabled,
            EngineToRenderer::CameraSpeedChanged { speed } => self.camera_speed = *speed,
            EngineToRenderer::BindRejected { reason } => warn!("Cannot edit mesh: {}", reason),
        }
    }
}
