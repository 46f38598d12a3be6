//! Message protocol for the terrain editor
//!
//! Defines the message types exchanged between the editor UI, the sculpting
//! engine and the renderer:
//! - [`EditorCommand`] - configuration changes pushed down from the UI
//! - [`EngineToRenderer`] - change notifications pushed by the engine
//! - [`PointerEvent`] - raw pointer input in normalized device coordinates

pub mod error;
pub mod input;
pub mod messages;
pub mod types;

pub use error::IpcError;
pub use input::{Modifiers, PointerEvent};
pub use messages::{EditorCommand, EngineToRenderer};
pub use types::{BrushKind, TerrainType};
