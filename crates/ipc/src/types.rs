//! Value types shared by the UI, the engine and the configuration crate.

use serde::{Deserialize, Serialize};

/// Which brush behavior a sculpt sample applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BrushKind {
    /// Add height along the up axis (inverted: lower)
    #[default]
    Raise = 0,
    /// Snap height to the impact point's height
    Flatten = 1,
    /// Blend vertex colors toward the brush color
    Paint = 2,
}

/// Whether the terrain is a generated plane or an imported mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TerrainType {
    /// Freshly generated procedural plane
    #[default]
    Create,
    /// Pre-existing mesh owned by the scene
    Edit,
}

impl TerrainType {
    pub fn label(&self) -> &'static str {
        match self {
            TerrainType::Create => "create",
            TerrainType::Edit => "edit",
        }
    }
}
