//! Main message enums for communication between the editor, the engine and
//! the renderer.

use serde::{Deserialize, Serialize};

use crate::error::IpcError;
use crate::types::{BrushKind, TerrainType};

/// Messages from the sculpting engine to the renderer.
///
/// The engine pushes these as changes happen; the renderer never has to
/// compare cached state against live buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineToRenderer {
    /// Vertex buffers of a mesh changed and must be re-uploaded
    GeometryDirty {
        mesh_id: u32,
        positions: bool,
        colors: bool,
    },

    /// The mesh material must switch to vertex-color mode (sent once per geometry)
    VertexColorsEnabled { mesh_id: u32 },

    /// A mesh became the sculpting target
    MeshBound {
        mesh_id: u32,
        terrain_type: TerrainType,
    },

    /// The previous sculpting target was detached
    MeshReleased { mesh_id: u32 },

    /// Brush indicator placement (None hides it)
    BrushCursor {
        position: Option<[f32; 3]>,
        radius: f32,
    },

    /// Orbit camera enablement (disabled while the brush is active)
    CameraControlsEnabled { enabled: bool },

    /// Wireframe overlay toggled
    WireframeChanged { enabled: bool },

    /// Orbit camera speed multiplier changed
    CameraSpeedChanged { speed: f32 },

    /// An edit-mode bind was refused; the host should block with a message
    BindRejected { reason: String },
}

/// Messages from the editor UI to the sculpting engine.
///
/// Values are plain and already validated by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EditorCommand {
    SetBrushKind(BrushKind),
    SetBrushRadius(f32),
    SetBrushStrength(f32),
    /// RGB, 0.0-1.0
    SetBrushColor([f32; 3]),
    /// World-space edge length of a create-mode plane
    SetMapSize(f32),
    /// Subdivisions per edge of a create-mode plane
    SetMapResolution(u32),
    SetWireframe(bool),
    /// Orbit camera speed multiplier
    SetCameraSpeed(f32),
    /// Edit (brush active) vs view (camera navigation)
    SetEditActive(bool),
    SetTerrainType(TerrainType),
}

impl EngineToRenderer {
    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl EditorCommand {
    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_command_tagging() {
        let cmd = EditorCommand::from_json(r#"{"type":"SetBrushRadius","data":2.5}"#).unwrap();
        assert_eq!(cmd, EditorCommand::SetBrushRadius(2.5));

        let cmd = EditorCommand::from_json(r#"{"type":"SetBrushKind","data":"Paint"}"#).unwrap();
        assert_eq!(cmd, EditorCommand::SetBrushKind(BrushKind::Paint));
    }

    #[test]
    fn test_engine_message_json() {
        let msg = EngineToRenderer::GeometryDirty {
            mesh_id: 3,
            positions: true,
            colors: false,
        };
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"GeometryDirty\""));
        assert!(json.contains("\"mesh_id\":3"));
    }

    #[test]
    fn test_malformed_command_is_error() {
        let err = EditorCommand::from_json(r#"{"type":"Nope"}"#);
        assert!(matches!(err, Err(IpcError::Serialize(_))));
    }
}
