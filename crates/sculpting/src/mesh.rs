//! Height-field mesh: the vertex buffer the brushes mutate.
//!
//! Two ways to get one:
//! - [`HeightFieldMesh::create_plane`] generates a regular grid of
//!   `(resolution + 1)²` vertices spanning `size × size` on local XY
//! - [`HeightFieldMesh::bind_existing`] wraps scene geometry in place
//!
//! The vertex count never changes once created or bound.

use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SculptError;
use crate::scene::{MeshHandle, SceneMesh};
use crate::snapshot::TerrainSnapshot;
use crate::types::{MeshId, NEUTRAL_VERTEX_COLOR, Transform, UpAxis};

/// How the mesh's vertices are organized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Topology {
    /// Generated plane: index `iy * (resolution + 1) + ix`
    Grid { size: f32, resolution: u32 },
    /// Scene mesh with its own index buffer (or none)
    Arbitrary,
}

/// A sculptable mesh bound to scene geometry.
#[derive(Debug)]
pub struct HeightFieldMesh {
    handle: MeshHandle,
    id: MeshId,
    topology: Topology,
    up_axis: UpAxis,
    vertex_count: usize,
}

impl HeightFieldMesh {
    /// Generate a flat plane for create mode.
    ///
    /// Vertices lie on local XY with Z = 0; the plane is rotated -90° about X
    /// for display so local Z points world-up.
    pub fn create_plane(id: MeshId, size: f32, resolution: u32) -> Result<Self, SculptError> {
        if resolution == 0 || !(size > 0.0) || !size.is_finite() {
            return Err(SculptError::InvalidGrid { size, resolution });
        }

        let per_edge = resolution as usize + 1;
        let half = size * 0.5;
        let step = size / resolution as f32;

        let mut positions = Vec::with_capacity(per_edge * per_edge);
        for iy in 0..per_edge {
            let y = half - iy as f32 * step;
            for ix in 0..per_edge {
                let x = ix as f32 * step - half;
                positions.push([x, y, 0.0]);
            }
        }

        let row = per_edge as u32;
        let mut indices = Vec::with_capacity((resolution * resolution * 6) as usize);
        for iy in 0..resolution {
            for ix in 0..resolution {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = (ix + 1) + row * (iy + 1);
                let d = (ix + 1) + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let vertex_count = positions.len();
        let scene_mesh = SceneMesh::new(id, positions, Some(indices))
            .with_transform(Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)));

        debug!(
            "create_plane: id={:?} size={} resolution={} vertices={}",
            id, size, resolution, vertex_count
        );

        Ok(Self {
            handle: scene_mesh.into_handle(),
            id,
            topology: Topology::Grid { size, resolution },
            up_axis: UpAxis::Z,
            vertex_count,
        })
    }

    /// Wrap existing scene geometry for edit mode without copying it.
    ///
    /// A non-identity rotation is baked into the positions once and the
    /// mesh's own rotation reset, so brush math can work in a frame where
    /// local Y is up. Binding an already-baked mesh changes nothing.
    pub fn bind_existing(handle: MeshHandle) -> Result<Self, SculptError> {
        let (id, vertex_count) = {
            let mut mesh = handle.borrow_mut();
            validate_bindable(&mesh)?;
            bake_rotation(&mut mesh);
            (mesh.id, mesh.vertex_count())
        };

        info!("Bound mesh {:?} for editing ({} vertices)", id, vertex_count);

        Ok(Self {
            handle,
            id,
            topology: Topology::Arbitrary,
            up_axis: UpAxis::Y,
            vertex_count,
        })
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Shared handle to the scene geometry (for the renderer).
    pub fn handle(&self) -> &MeshHandle {
        &self.handle
    }

    /// Whether this mesh wraps the same scene geometry as `handle`.
    pub fn is_bound_to(&self, handle: &MeshHandle) -> bool {
        Rc::ptr_eq(&self.handle, handle)
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn up_axis(&self) -> UpAxis {
        self.up_axis
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn transform(&self) -> Transform {
        self.handle.borrow().transform
    }

    /// Local-to-world affine of the whole mesh.
    pub fn world_affine(&self) -> Affine3A {
        self.handle.borrow().transform.compute_affine()
    }

    /// Map a world-space point into this mesh's local space.
    pub fn world_to_local(&self, point: Vec3) -> Vec3 {
        self.world_affine().inverse().transform_point3(point)
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.with_positions(|positions| positions.get(index).map(|&p| Vec3::from(p)))
    }

    /// Local-space height of a vertex along the mesh's up axis.
    pub fn height(&self, index: usize) -> Option<f32> {
        let axis = self.up_axis.index();
        self.with_positions(|positions| positions.get(index).map(|p| p[axis]))
    }

    pub fn color(&self, index: usize) -> Option<[f32; 3]> {
        self.handle
            .borrow()
            .colors
            .as_ref()
            .and_then(|colors| colors.get(index).copied())
    }

    pub fn has_colors(&self) -> bool {
        self.handle.borrow().colors.is_some()
    }

    /// Whether the material already renders vertex colors.
    pub fn vertex_colors_enabled(&self) -> bool {
        self.handle.borrow().material.vertex_colors
    }

    /// Run `f` over the local-space positions.
    ///
    /// If the scene swapped the attribute for one that cannot be addressed
    /// as float triples after binding, `f` sees an empty slice.
    pub fn with_positions<R>(&self, f: impl FnOnce(&[[f32; 3]]) -> R) -> R {
        let mesh = self.handle.borrow();
        match mesh.positions.as_float3() {
            Some(positions) => f(positions),
            None => {
                warn!("Mesh {:?} position buffer is no longer Float32x3", self.id);
                f(&[])
            }
        }
    }

    /// Mutate positions in place and flag them for upload.
    pub(crate) fn with_positions_mut<R>(&mut self, f: impl FnOnce(&mut [[f32; 3]]) -> R) -> R {
        let mut mesh = self.handle.borrow_mut();
        mesh.dirty.positions = true;
        match mesh.positions.as_float3_mut() {
            Some(positions) => f(positions),
            None => {
                warn!("Mesh {:?} position buffer is no longer Float32x3", self.id);
                f(&mut [])
            }
        }
    }

    /// Mutate the color buffer in place, allocating it on first use.
    ///
    /// Returns `f`'s result and whether this call switched the material to
    /// vertex-color mode (true at most once per geometry).
    pub(crate) fn with_colors_mut<R>(&mut self, f: impl FnOnce(&mut [[f32; 3]]) -> R) -> (R, bool) {
        let vertex_count = self.vertex_count;
        let mut mesh = self.handle.borrow_mut();

        let mesh = &mut *mesh;
        let colors = mesh.colors.get_or_insert_with(|| {
            debug!("Allocating color buffer for mesh {:?}", mesh.id);
            vec![NEUTRAL_VERTEX_COLOR; vertex_count]
        });
        mesh.dirty.colors = true;
        let result = f(colors);

        let newly_enabled = !mesh.material.vertex_colors;
        if newly_enabled {
            mesh.material.vertex_colors = true;
            mesh.dirty.material = true;
        }

        (result, newly_enabled)
    }

    /// Immutable copy of the geometry for an exporter.
    ///
    /// The snapshot owns its buffers, so sculpting after export does not
    /// change it.
    pub fn export_snapshot(&self) -> TerrainSnapshot {
        let mesh = self.handle.borrow();
        let positions = mesh
            .positions
            .as_float3()
            .map(|p| p.to_vec())
            .unwrap_or_default();
        let indices = mesh
            .indices
            .clone()
            .unwrap_or_else(|| (0..positions.len() as u32).collect());

        TerrainSnapshot {
            mesh_id: self.id,
            positions,
            colors: mesh.colors.clone(),
            indices,
            topology: self.topology,
            transform: mesh.transform,
        }
    }
}

/// Reject geometry the brushes cannot address.
pub(crate) fn validate_bindable(mesh: &SceneMesh) -> Result<(), SculptError> {
    let Some(positions) = mesh.positions.as_float3() else {
        return Err(SculptError::unsupported(format!(
            "mesh {:?} stores positions as {}, expected Float32x3",
            mesh.id,
            mesh.positions.layout_name()
        )));
    };

    if positions.is_empty() {
        return Err(SculptError::unsupported(format!(
            "mesh {:?} has no vertices",
            mesh.id
        )));
    }

    if let Some(colors) = &mesh.colors {
        if colors.len() != positions.len() {
            return Err(SculptError::unsupported(format!(
                "mesh {:?} has {} colors for {} vertices",
                mesh.id,
                colors.len(),
                positions.len()
            )));
        }
    }

    Ok(())
}

/// Apply the mesh rotation to every position and reset it to identity.
///
/// World-space geometry is preserved only for uniform scale.
fn bake_rotation(mesh: &mut SceneMesh) {
    if mesh.transform.has_identity_rotation() {
        return;
    }

    let rotation = mesh.transform.rotation;
    if let Some(positions) = mesh.positions.as_float3_mut() {
        for p in positions.iter_mut() {
            *p = (rotation * Vec3::from(*p)).to_array();
        }
    }
    mesh.transform.rotation = Quat::IDENTITY;
    mesh.dirty.positions = true;

    debug!("Baked rotation {:?} into mesh {:?}", rotation, mesh.id);
}
