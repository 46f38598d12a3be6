//! Scripted editor input.
//!
//! A script is a JSON array of steps replayed in order against a session,
//! standing in for the window, UI and render loop of an interactive host:
//!
//! ```json
//! [
//!   { "command": { "type": "SetBrushRadius", "data": 4.0 } },
//!   { "pointer": { "kind": "Down", "x": 0.0, "y": 0.0 } },
//!   { "pointer": { "kind": "Move", "x": 0.1, "y": 0.0 } },
//!   "frame",
//!   { "pointer": { "kind": "Up" } }
//! ]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use terrain_ipc::{BrushKind, EditorCommand, PointerEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    /// Editor UI configuration change
    Command(EditorCommand),
    /// Raw pointer input in NDC
    Pointer(PointerEvent),
    /// Hold or release the invert modifier
    Invert(bool),
    /// End of a rendered frame
    Frame,
}

pub fn load(path: &Path) -> Result<Vec<ScriptStep>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid script {}", path.display()))
}

/// Built-in demo: a raised ridge, a flattened notch across it and a painted
/// patch, one frame per pointer sample.
pub fn demo() -> Vec<ScriptStep> {
    let mut steps = vec![ScriptStep::Command(EditorCommand::SetBrushKind(BrushKind::Raise))];
    steps.extend(stroke((-0.5, 0.0), (0.5, 0.0), 20));
    steps.extend(stroke((-0.5, 0.05), (0.5, 0.05), 20));

    steps.push(ScriptStep::Command(EditorCommand::SetBrushKind(BrushKind::Flatten)));
    steps.extend(stroke((0.0, -0.3), (0.0, 0.3), 10));

    steps.push(ScriptStep::Invert(true));
    steps.push(ScriptStep::Command(EditorCommand::SetBrushKind(BrushKind::Raise)));
    steps.extend(stroke((-0.4, -0.4), (-0.2, -0.4), 6));
    steps.push(ScriptStep::Invert(false));

    steps.push(ScriptStep::Command(EditorCommand::SetBrushKind(BrushKind::Paint)));
    steps.extend(stroke((0.3, 0.3), (0.45, 0.4), 8));
    steps
}

/// Down, `samples` moves and up along a straight line.
fn stroke(from: (f32, f32), to: (f32, f32), samples: usize) -> Vec<ScriptStep> {
    let mut steps = vec![ScriptStep::Pointer(PointerEvent::Down { x: from.0, y: from.1 })];
    for i in 1..=samples {
        let t = i as f32 / samples as f32;
        steps.push(ScriptStep::Pointer(PointerEvent::Move {
            x: from.0 + (to.0 - from.0) * t,
            y: from.1 + (to.1 - from.1) * t,
        }));
        steps.push(ScriptStep::Frame);
    }
    steps.push(ScriptStep::Pointer(PointerEvent::Up));
    steps
}
