//! Terrain sculpting engine.
//!
//! Interactive deformation and vertex painting of a height-field mesh with a
//! pointer-driven brush, either on a freshly generated plane (create mode)
//! or on geometry the scene already owns (edit mode).
//!
//! # Architecture
//!
//! Data flows leaf-first through the modules:
//!
//! ```text
//! pointer event -> raycast -> impact point -> spatial -> influences
//!               -> brush -> mesh mutation -> EngineToRenderer push
//! ```
//!
//! ## Key Components
//!
//! - **Mesh**: [`HeightFieldMesh`], the vertex buffer the brushes mutate
//! - **Spatial**: [`query_near`], vertices within the brush radius plus falloff
//! - **Brush**: Raise/Flatten/Paint mutations over those vertices
//! - **Raycast**: camera ray to terrain impact point ([`RayCaster`], [`CameraRay`])
//! - **Session**: the Idle/Dragging state machine and edit/view toggle
//! - **Lifecycle**: create/edit switching and export snapshots
//!
//! Everything runs on the caller's thread; geometry is shared with the host
//! scene through [`MeshHandle`].

pub mod brush;
pub mod error;
pub mod lifecycle;
pub mod mesh;
pub mod raycast;
pub mod scene;
pub mod session;
pub mod snapshot;
pub mod spatial;
pub mod types;

pub use brush::{BrushConfig, BrushEffect, apply_brush, apply_flatten, apply_paint, apply_raise};
pub use error::SculptError;
pub use lifecycle::{LifecycleChange, TerrainLifecycle};
pub use mesh::{HeightFieldMesh, Topology};
pub use raycast::{CameraRay, MeshRayCaster, PerspectiveCamera, Ray, RayCaster, RayHit, resolve_pointer};
pub use scene::{BufferDirty, MaterialState, MeshHandle, SceneMesh, VertexAttribute};
pub use session::{ApplyOutcome, SculptSession, StrokePhase};
pub use snapshot::TerrainSnapshot;
pub use spatial::{VertexInfluence, falloff_weight, query_near};
pub use types::{MeshId, NEUTRAL_VERTEX_COLOR, Transform, UpAxis};

pub use terrain_config::TerrainConfig;
pub use terrain_ipc::{BrushKind, EditorCommand, EngineToRenderer, Modifiers, PointerEvent, TerrainType};
