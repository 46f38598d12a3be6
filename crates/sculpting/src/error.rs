//! Error types for the sculpting engine.
//!
//! Only binding failures are errors. A brush applied with no mesh bound and a
//! ray that misses the terrain are ordinary outcomes, see
//! [`crate::session::ApplyOutcome`] and [`crate::raycast::RayHit`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SculptError {
    /// The mesh's vertex buffer cannot be addressed as plain float triples.
    #[error("Unsupported vertex buffer: {reason}")]
    UnsupportedBuffer { reason: String },

    /// A create-mode plane was requested with a degenerate grid.
    #[error("Invalid terrain grid: size={size}, resolution={resolution}")]
    InvalidGrid { size: f32, resolution: u32 },
}

impl SculptError {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        SculptError::UnsupportedBuffer {
            reason: reason.into(),
        }
    }
}
