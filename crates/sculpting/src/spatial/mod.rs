//! Proximity queries for brush footprints.
//!
//! Every sample scans all vertices: the footprint moves with the pointer on
//! every event and grid resolution is bounded, so nothing is cached between
//! samples. Positions are authored in local space while the impact point is
//! world space, so each vertex is transformed before the distance test.

use glam::Vec3;
use tracing::trace;

use crate::mesh::HeightFieldMesh;

/// A vertex inside the brush footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexInfluence {
    /// Index into the mesh's position buffer
    pub index: usize,
    /// Falloff weight in (0, 1], 1 at the impact point
    pub weight: f32,
    /// Squared world-space distance to the impact point
    pub distance_squared: f32,
}

impl VertexInfluence {
    /// World-space distance to the impact point.
    pub fn distance(&self) -> f32 {
        self.distance_squared.sqrt()
    }
}

/// Falloff weight for a squared distance: `1 - d² / r²`.
///
/// Linear in squared-distance space rather than radial. Brush strength
/// defaults are tuned against this curve, so it is kept as is.
pub fn falloff_weight(distance_squared: f32, radius_squared: f32) -> f32 {
    1.0 - distance_squared / radius_squared
}

/// Find every vertex strictly within `radius` (world units) of `point`
/// (world space).
pub fn query_near(mesh: &HeightFieldMesh, point: Vec3, radius: f32) -> Vec<VertexInfluence> {
    if !(radius > 0.0) {
        return Vec::new();
    }

    let radius_squared = radius * radius;
    let affine = mesh.world_affine();

    let influences: Vec<VertexInfluence> = mesh.with_positions(|positions| {
        positions
            .iter()
            .enumerate()
            .filter_map(|(index, local)| {
                let world = affine.transform_point3(Vec3::from(*local));
                let distance_squared = world.distance_squared(point);
                (distance_squared < radius_squared).then(|| VertexInfluence {
                    index,
                    weight: falloff_weight(distance_squared, radius_squared),
                    distance_squared,
                })
            })
            .collect()
    });

    trace!(
        "query_near: point={:?} radius={} hits={}/{}",
        point,
        radius,
        influences.len(),
        mesh.vertex_count()
    );

    influences
}
