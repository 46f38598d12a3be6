//! Scene-side mesh storage.
//!
//! A [`SceneMesh`] is the geometry the host scene graph owns and the renderer
//! draws. The sculpting engine never copies it: create mode builds a fresh
//! one, edit mode wraps one the scene already has through a [`MeshHandle`].
//! Everything is single-threaded, so shared ownership is `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::{MeshId, Transform};

/// Shared, single-threaded reference to scene geometry.
pub type MeshHandle = Rc<RefCell<SceneMesh>>;

/// Layout of a mesh's position attribute.
///
/// Only [`VertexAttribute::Float32x3`] can be sculpted; the other layouts
/// exist because scenes carry them and binding must reject them cleanly.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexAttribute {
    /// One `[x, y, z]` per vertex
    Float32x3(Vec<[f32; 3]>),
    /// Homogeneous positions
    Float32x4(Vec<[f32; 4]>),
    /// Positions embedded in a shared buffer with other attributes
    Interleaved {
        data: Vec<f32>,
        stride: usize,
        offset: usize,
    },
    /// Per-instance attribute data, not per-vertex
    Instanced { data: Vec<[f32; 3]>, divisor: u32 },
}

impl VertexAttribute {
    pub fn len(&self) -> usize {
        match self {
            VertexAttribute::Float32x3(v) => v.len(),
            VertexAttribute::Float32x4(v) => v.len(),
            VertexAttribute::Interleaved { data, stride, .. } => {
                if *stride == 0 {
                    0
                } else {
                    data.len() / stride
                }
            }
            VertexAttribute::Instanced { data, .. } => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name used in log and error messages.
    pub fn layout_name(&self) -> &'static str {
        match self {
            VertexAttribute::Float32x3(_) => "Float32x3",
            VertexAttribute::Float32x4(_) => "Float32x4",
            VertexAttribute::Interleaved { .. } => "Interleaved",
            VertexAttribute::Instanced { .. } => "Instanced",
        }
    }

    pub fn as_float3(&self) -> Option<&[[f32; 3]]> {
        match self {
            VertexAttribute::Float32x3(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_float3_mut(&mut self) -> Option<&mut [[f32; 3]]> {
        match self {
            VertexAttribute::Float32x3(v) => Some(v.as_mut_slice()),
            _ => None,
        }
    }
}

/// Material state the sculpting engine is allowed to change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialState {
    /// Render with the per-vertex color buffer
    pub vertex_colors: bool,
    pub wireframe: bool,
}

/// Buffers that changed since the renderer last uploaded them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferDirty {
    pub positions: bool,
    pub colors: bool,
    pub material: bool,
}

impl BufferDirty {
    pub fn any(&self) -> bool {
        self.positions || self.colors || self.material
    }
}

/// Geometry owned by the host scene.
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub id: MeshId,
    pub positions: VertexAttribute,
    /// RGB per vertex, same indexing as `positions`
    pub colors: Option<Vec<[f32; 3]>>,
    /// Triangle list; `None` for non-indexed geometry
    pub indices: Option<Vec<u32>>,
    pub transform: Transform,
    pub material: MaterialState,
    pub dirty: BufferDirty,
}

impl SceneMesh {
    /// Build an indexed triangle mesh with plain float-triple positions.
    pub fn new(id: MeshId, positions: Vec<[f32; 3]>, indices: Option<Vec<u32>>) -> Self {
        Self::with_attribute(id, VertexAttribute::Float32x3(positions), indices)
    }

    pub fn with_attribute(id: MeshId, positions: VertexAttribute, indices: Option<Vec<u32>>) -> Self {
        Self {
            id,
            positions,
            colors: None,
            indices,
            transform: Transform::IDENTITY,
            material: MaterialState::default(),
            dirty: BufferDirty::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_colors(mut self, colors: Vec<[f32; 3]>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Wrap into a shared handle for the scene and the engine.
    pub fn into_handle(self) -> MeshHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Consume the pending upload flags (renderer side).
    pub fn take_dirty(&mut self) -> BufferDirty {
        std::mem::take(&mut self.dirty)
    }
}
