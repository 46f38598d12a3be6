//! Shared configuration for the terrain editor
//!
//! This crate is the single source of truth for the values the editor UI
//! exposes upward: brush kind/radius/strength/color, map size and
//! resolution, and view toggles. All values are plain parameters; the only
//! engine-side constraints are `radius > 0` and `strength > 0` (plus a
//! non-degenerate grid for create mode).

use std::path::Path;

use serde::{Deserialize, Serialize};
use terrain_ipc::{BrushKind, TerrainType};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "TERRAIN_CONFIG";

/// Default brush radius in world units
pub const DEFAULT_BRUSH_RADIUS: f32 = 5.0;

/// Default brush strength (sane range is roughly 0.01-0.3)
pub const DEFAULT_BRUSH_STRENGTH: f32 = 0.1;

/// Default paint color (RGB, 0.0-1.0)
pub const DEFAULT_BRUSH_COLOR: [f32; 3] = [0.35, 0.55, 0.25];

/// Default create-mode plane edge length in world units
pub const DEFAULT_MAP_SIZE: f32 = 100.0;

/// Default create-mode subdivisions per edge
pub const DEFAULT_MAP_RESOLUTION: u32 = 64;

/// Default orbit camera speed multiplier
pub const DEFAULT_CAMERA_SPEED: f32 = 1.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Brush radius must be positive, got {0}")]
    InvalidRadius(f32),
    #[error("Brush strength must be positive, got {0}")]
    InvalidStrength(f32),
    #[error("Map size must be positive, got {0}")]
    InvalidMapSize(f32),
    #[error("Map resolution must be at least 1, got {0}")]
    InvalidResolution(u32),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Brush parameters as exposed by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub kind: BrushKind,
    /// World units
    pub radius: f32,
    pub strength: f32,
    pub color: [f32; 3],
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            kind: BrushKind::default(),
            radius: DEFAULT_BRUSH_RADIUS,
            strength: DEFAULT_BRUSH_STRENGTH,
            color: DEFAULT_BRUSH_COLOR,
        }
    }
}

/// Create-mode plane parameters and the active terrain type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub size: f32,
    pub resolution: u32,
    pub terrain_type: TerrainType,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_MAP_SIZE,
            resolution: DEFAULT_MAP_RESOLUTION,
            terrain_type: TerrainType::default(),
        }
    }
}

impl MapSettings {
    /// Number of vertices a create-mode plane with these settings has.
    pub fn vertex_count(&self) -> usize {
        let per_edge = self.resolution as usize + 1;
        per_edge * per_edge
    }
}

/// View toggles that are applied once per rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub wireframe: bool,
    /// Brush active (true) or camera navigation (false)
    pub edit_active: bool,
    pub camera_speed: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            wireframe: false,
            edit_active: true,
            camera_speed: DEFAULT_CAMERA_SPEED,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub brush: BrushSettings,
    pub map: MapSettings,
    pub view: ViewSettings,
}

impl TerrainConfig {
    /// Check the constraints the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.brush.radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.brush.radius));
        }
        if !(self.brush.strength > 0.0) {
            return Err(ConfigError::InvalidStrength(self.brush.strength));
        }
        if !(self.map.size > 0.0) {
            return Err(ConfigError::InvalidMapSize(self.map.size));
        }
        if self.map.resolution == 0 {
            return Err(ConfigError::InvalidResolution(self.map.resolution));
        }
        Ok(())
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        info!("Loaded terrain config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        debug!("Saved terrain config to {}", path.as_ref().display());
        Ok(())
    }

    /// Load from the file named by `TERRAIN_CONFIG`, or fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}
