//! Input event types for pointer and keyboard.

use serde::{Deserialize, Serialize};

/// Pointer input events in normalized device coordinates (-1..1, y up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    /// Window blur or any other loss of input focus.
    FocusLost,
}

/// Keyboard modifier state relevant to sculpting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Held key that inverts the raise brush
    pub invert: bool,
}
