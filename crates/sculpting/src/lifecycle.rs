//! Which mesh is being sculpted, and how it got there.
//!
//! Exactly one mesh is in focus at a time. Switching targets detaches the
//! previous mesh before the next one is attached, so two bindings never
//! mutate the same buffer.

use terrain_ipc::TerrainType;
use tracing::{info, warn};

use crate::error::SculptError;
use crate::mesh::{HeightFieldMesh, validate_bindable};
use crate::scene::MeshHandle;
use crate::snapshot::TerrainSnapshot;
use crate::types::{GENERATED_MESH_ID_BASE, MeshId};

/// Meshes detached and attached by a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleChange {
    pub released: Option<MeshId>,
    pub bound: MeshId,
    /// The requested handle was already the edit target; nothing changed.
    pub rebound: bool,
}

/// Owner of the active [`HeightFieldMesh`].
#[derive(Debug)]
pub struct TerrainLifecycle {
    terrain_type: TerrainType,
    active: Option<HeightFieldMesh>,
    next_generated_id: u32,
}

impl Default for TerrainLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainLifecycle {
    pub fn new() -> Self {
        Self {
            terrain_type: TerrainType::Create,
            active: None,
            next_generated_id: GENERATED_MESH_ID_BASE,
        }
    }

    pub fn terrain_type(&self) -> TerrainType {
        self.terrain_type
    }

    pub fn active(&self) -> Option<&HeightFieldMesh> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut HeightFieldMesh> {
        self.active.as_mut()
    }

    /// Start over on a freshly generated plane.
    ///
    /// Always produces a new mesh; whatever was sculpted on a previous plane
    /// is discarded. On an invalid grid the current binding is kept.
    pub fn enter_create(&mut self, size: f32, resolution: u32) -> Result<LifecycleChange, SculptError> {
        let id = MeshId(self.next_generated_id);
        let mesh = HeightFieldMesh::create_plane(id, size, resolution)?;
        self.next_generated_id = self.next_generated_id.wrapping_add(1).max(GENERATED_MESH_ID_BASE);

        let released = self.release();
        self.terrain_type = TerrainType::Create;
        self.active = Some(mesh);

        info!(
            "Entered create mode: plane {:?} ({}x{} cells, size {})",
            id, resolution, resolution, size
        );

        Ok(LifecycleChange {
            released,
            bound: id,
            rebound: false,
        })
    }

    /// Bind scene geometry for editing.
    ///
    /// Rebinding the mesh that is already being edited is a no-op. A buffer
    /// the brushes cannot address is rejected before anything is detached.
    pub fn enter_edit(&mut self, handle: MeshHandle) -> Result<LifecycleChange, SculptError> {
        if self.terrain_type == TerrainType::Edit {
            if let Some(active) = &self.active {
                if active.is_bound_to(&handle) {
                    return Ok(LifecycleChange {
                        released: None,
                        bound: active.id(),
                        rebound: true,
                    });
                }
            }
        }

        if let Err(e) = validate_bindable(&handle.borrow()) {
            warn!("Rejected edit-mode bind: {}", e);
            return Err(e);
        }

        let released = self.release();
        self.terrain_type = TerrainType::Edit;
        let mesh = HeightFieldMesh::bind_existing(handle)?;
        let bound = mesh.id();
        self.active = Some(mesh);

        info!("Entered edit mode on mesh {:?}", bound);

        Ok(LifecycleChange {
            released,
            bound,
            rebound: false,
        })
    }

    /// Switch the terrain type without binding anything yet.
    ///
    /// Leaving create mode drops the generated plane; entering create mode
    /// from here still requires [`Self::enter_create`].
    pub fn set_terrain_type(&mut self, terrain_type: TerrainType) -> Option<MeshId> {
        if self.terrain_type == terrain_type {
            return None;
        }
        self.terrain_type = terrain_type;
        self.release()
    }

    /// Detach the active mesh, if any.
    pub fn release(&mut self) -> Option<MeshId> {
        let mesh = self.active.take()?;
        info!("Released mesh {:?}", mesh.id());
        Some(mesh.id())
    }

    /// Owned copy of the active mesh's geometry.
    pub fn export_snapshot(&self) -> Option<TerrainSnapshot> {
        let mesh = self.active.as_ref()?;
        let snapshot = mesh.export_snapshot();
        info!(
            "Exported snapshot of {:?}: {} vertices, {} triangles",
            snapshot.mesh_id,
            snapshot.vertex_count(),
            snapshot.triangle_count()
        );
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneMesh, VertexAttribute};

    fn scene_mesh(id: u32) -> MeshHandle {
        SceneMesh::new(MeshId(id), vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]], Some(vec![0, 1, 2]))
            .into_handle()
    }

    #[test]
    fn test_enter_create_always_fresh() {
        let mut lifecycle = TerrainLifecycle::new();
        let first = lifecycle.enter_create(10.0, 4).unwrap();
        assert_eq!(first.released, None);
        assert_eq!(first.bound, MeshId(GENERATED_MESH_ID_BASE));

        let second = lifecycle.enter_create(10.0, 8).unwrap();
        assert_eq!(second.released, Some(first.bound));
        assert_ne!(second.bound, first.bound);
        assert_eq!(lifecycle.active().unwrap().vertex_count(), 81);
    }

    #[test]
    fn test_invalid_grid_keeps_current_mesh() {
        let mut lifecycle = TerrainLifecycle::new();
        let change = lifecycle.enter_create(10.0, 4).unwrap();
        assert!(lifecycle.enter_create(10.0, 0).is_err());
        assert_eq!(lifecycle.active().unwrap().id(), change.bound);
    }

    #[test]
    fn test_enter_edit_detaches_plane() {
        let mut lifecycle = TerrainLifecycle::new();
        let plane = lifecycle.enter_create(10.0, 2).unwrap().bound;

        let change = lifecycle.enter_edit(scene_mesh(3)).unwrap();
        assert_eq!(
            change,
            LifecycleChange {
                released: Some(plane),
                bound: MeshId(3),
                rebound: false,
            }
        );
        assert_eq!(lifecycle.terrain_type(), TerrainType::Edit);
    }

    #[test]
    fn test_rebinding_same_mesh_is_noop() {
        let mut lifecycle = TerrainLifecycle::new();
        let handle = scene_mesh(5);
        lifecycle.enter_edit(handle.clone()).unwrap();
        let again = lifecycle.enter_edit(handle).unwrap();
        assert_eq!(again.released, None);
        assert_eq!(again.bound, MeshId(5));
        assert!(again.rebound);
    }

    #[test]
    fn test_same_id_different_buffer_is_rebind() {
        let mut lifecycle = TerrainLifecycle::new();
        lifecycle.enter_edit(scene_mesh(5)).unwrap();

        let change = lifecycle.enter_edit(scene_mesh(5)).unwrap();
        assert!(!change.rebound);
        assert_eq!(change.released, Some(MeshId(5)));
        assert_eq!(change.bound, MeshId(5));
    }

    #[test]
    fn test_rejected_bind_keeps_previous_binding() {
        let mut lifecycle = TerrainLifecycle::new();
        lifecycle.enter_edit(scene_mesh(1)).unwrap();

        let instanced = SceneMesh::with_attribute(
            MeshId(2),
            VertexAttribute::Instanced {
                data: vec![[0.0; 3]; 4],
                divisor: 1,
            },
            None,
        )
        .into_handle();

        assert!(matches!(
            lifecycle.enter_edit(instanced),
            Err(SculptError::UnsupportedBuffer { .. })
        ));
        assert_eq!(lifecycle.active().unwrap().id(), MeshId(1));
    }

    #[test]
    fn test_set_terrain_type_releases_plane() {
        let mut lifecycle = TerrainLifecycle::new();
        let plane = lifecycle.enter_create(10.0, 2).unwrap().bound;
        assert_eq!(lifecycle.set_terrain_type(TerrainType::Create), None);
        assert_eq!(lifecycle.set_terrain_type(TerrainType::Edit), Some(plane));
        assert!(lifecycle.active().is_none());
        assert!(lifecycle.export_snapshot().is_none());
    }
}
