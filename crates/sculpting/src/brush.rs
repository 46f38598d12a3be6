//! Terrain brushes.
//!
//! Three mutations over a set of [`VertexInfluence`]s produced by
//! [`query_near`]:
//! - **Raise**: `height += strength * weight`, negated when inverted
//! - **Flatten**: height snaps to the impact point's height, ignoring weight
//! - **Paint**: color blends toward the brush color by `1 - distance / radius`
//!
//! Height always means the mesh's up-axis component in local space.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use terrain_config::BrushSettings;
use terrain_ipc::BrushKind;
use tracing::trace;

use crate::mesh::HeightFieldMesh;
use crate::spatial::{VertexInfluence, query_near};
use crate::types::lerp_rgb;

/// Immutable brush parameters for one application.
///
/// The engine does not clamp these; the UI supplies validated values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushConfig {
    pub kind: BrushKind,
    /// World units
    pub radius: f32,
    pub strength: f32,
    /// RGB, used by Paint only
    pub color: [f32; 3],
    /// Lower instead of raise (Raise only)
    pub invert: bool,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self::from(&BrushSettings::default())
    }
}

impl From<&BrushSettings> for BrushConfig {
    fn from(settings: &BrushSettings) -> Self {
        Self {
            kind: settings.kind,
            radius: settings.radius,
            strength: settings.strength,
            color: settings.color,
            invert: false,
        }
    }
}

impl BrushConfig {
    pub fn raise(radius: f32, strength: f32) -> Self {
        Self {
            kind: BrushKind::Raise,
            radius,
            strength,
            ..Default::default()
        }
    }

    pub fn flatten(radius: f32) -> Self {
        Self {
            kind: BrushKind::Flatten,
            radius,
            ..Default::default()
        }
    }

    pub fn paint(radius: f32, color: [f32; 3]) -> Self {
        Self {
            kind: BrushKind::Paint,
            radius,
            color,
            ..Default::default()
        }
    }

    /// Copy with `invert` forced on when `held` is set.
    pub fn with_invert_held(self, held: bool) -> Self {
        Self {
            invert: self.invert || held,
            ..self
        }
    }

    /// Sign applied to raise displacement.
    pub fn direction(&self) -> f32 {
        if self.invert { -1.0 } else { 1.0 }
    }
}

/// What a brush application changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrushEffect {
    pub vertices_touched: usize,
    pub positions_changed: bool,
    pub colors_changed: bool,
    /// The material switched to vertex colors during this application
    pub vertex_colors_enabled: bool,
}

/// Raise (or lower when inverted) each influenced vertex by
/// `strength * weight`.
pub fn apply_raise(
    mesh: &mut HeightFieldMesh,
    influences: &[VertexInfluence],
    config: &BrushConfig,
) -> usize {
    if influences.is_empty() {
        return 0;
    }

    let axis = mesh.up_axis().index();
    let scale = config.strength * config.direction();

    mesh.with_positions_mut(|positions| {
        let mut touched = 0;
        for influence in influences {
            if let Some(p) = positions.get_mut(influence.index) {
                p[axis] += scale * influence.weight;
                touched += 1;
            }
        }
        touched
    })
}

/// Set every influenced vertex's height to the impact point's height.
///
/// Binary within the radius: weights are ignored, which makes a second
/// application at the same point a no-op.
pub fn apply_flatten(
    mesh: &mut HeightFieldMesh,
    influences: &[VertexInfluence],
    impact_point: Vec3,
) -> usize {
    if influences.is_empty() {
        return 0;
    }

    let up_axis = mesh.up_axis();
    let target = up_axis.component(mesh.world_to_local(impact_point));
    let axis = up_axis.index();

    mesh.with_positions_mut(|positions| {
        let mut touched = 0;
        for influence in influences {
            if let Some(p) = positions.get_mut(influence.index) {
                p[axis] = target;
                touched += 1;
            }
        }
        touched
    })
}

/// Blend influenced vertex colors toward the brush color.
///
/// Allocates the color buffer on first use. Returns the number of vertices
/// painted and whether the material was switched to vertex colors.
pub fn apply_paint(
    mesh: &mut HeightFieldMesh,
    influences: &[VertexInfluence],
    config: &BrushConfig,
) -> (usize, bool) {
    if influences.is_empty() {
        return (0, false);
    }

    let radius = config.radius;
    let target = config.color;

    mesh.with_colors_mut(|colors| {
        let mut touched = 0;
        for influence in influences {
            if let Some(color) = colors.get_mut(influence.index) {
                let t = (1.0 - influence.distance() / radius).clamp(0.0, 1.0);
                *color = lerp_rgb(*color, target, t);
                touched += 1;
            }
        }
        touched
    })
}

/// Query the footprint around `impact_point` (world space) and apply the
/// configured brush.
pub fn apply_brush(mesh: &mut HeightFieldMesh, impact_point: Vec3, config: &BrushConfig) -> BrushEffect {
    let influences = query_near(mesh, impact_point, config.radius);
    if influences.is_empty() {
        return BrushEffect::default();
    }

    let effect = match config.kind {
        BrushKind::Raise => BrushEffect {
            vertices_touched: apply_raise(mesh, &influences, config),
            positions_changed: true,
            ..Default::default()
        },
        BrushKind::Flatten => BrushEffect {
            vertices_touched: apply_flatten(mesh, &influences, impact_point),
            positions_changed: true,
            ..Default::default()
        },
        BrushKind::Paint => {
            let (vertices_touched, vertex_colors_enabled) = apply_paint(mesh, &influences, config);
            BrushEffect {
                vertices_touched,
                colors_changed: true,
                vertex_colors_enabled,
                ..Default::default()
            }
        }
    };

    trace!(
        "apply_brush: {:?} at {:?} touched {} vertices",
        config.kind, impact_point, effect.vertices_touched
    );

    effect
}
