//! Core sculpting types shared by the mesh, brush and session modules.

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Color given to every vertex when a color buffer is first allocated.
pub const NEUTRAL_VERTEX_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// First id handed out to generated (create-mode) planes. Scene-owned meshes
/// are expected to use ids below this.
pub const GENERATED_MESH_ID_BASE: u32 = 0x8000_0000;

/// Identifier of a mesh in the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshId(pub u32);

/// Local-space axis a brush treats as "up".
///
/// Create-mode planes are authored flat on XY and rotated for display, so
/// their height is local Z. Edit-mode meshes have their rotation baked at
/// bind time and use local Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpAxis {
    Y,
    Z,
}

impl UpAxis {
    /// Component index into an `[f32; 3]` position.
    pub fn index(self) -> usize {
        match self {
            UpAxis::Y => 1,
            UpAxis::Z => 2,
        }
    }

    /// Read the up component of a local-space point.
    pub fn component(self, point: Vec3) -> f32 {
        match self {
            UpAxis::Y => point.y,
            UpAxis::Z => point.z,
        }
    }
}

/// Position/rotation/scale of a mesh in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Local-to-world affine (scale, then rotate, then translate).
    pub fn compute_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Whether the rotation is exactly the identity (`q` or `-q`).
    pub fn has_identity_rotation(&self) -> bool {
        self.rotation == Quat::IDENTITY || self.rotation == -Quat::IDENTITY
    }
}

/// Component-wise `a * (1 - t) + b * t`.
///
/// Written in this form so that `t == 1` yields `b` and `t == 0` yields `a`
/// exactly.
pub fn lerp_rgb(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let s = 1.0 - t;
    [
        a[0] * s + b[0] * t,
        a[1] * s + b[1] * t,
        a[2] * s + b[2] * t,
    ]
}
