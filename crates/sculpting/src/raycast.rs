//! Pointer-to-surface resolution.
//!
//! The engine does not own a camera or a scene graph, so turning a pointer
//! position into a point on the terrain goes through two seams:
//! - [`CameraRay`] builds a world-space [`Ray`] from normalized device
//!   coordinates
//! - [`RayCaster`] intersects that ray with the bound [`HeightFieldMesh`]
//!
//! [`MeshRayCaster`] is the default caster: brute-force Moller-Trumbore over
//! every triangle, run in mesh-local space.

use glam::{Mat3, Quat, Vec2, Vec3};
use tracing::trace;

use crate::mesh::HeightFieldMesh;
use crate::types::MeshId;

/// Epsilon for floating point comparisons in ray intersection
const EPSILON: f32 = 1e-7;

/// A world-space half-line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`.
    ///
    /// Returns `None` for a zero or non-finite direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        origin.is_finite().then_some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of resolving a ray against the terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayHit {
    Hit {
        /// World-space intersection point
        point: Vec3,
        /// World-space face normal, facing the ray origin
        normal: Vec3,
        object: MeshId,
        /// World-space distance from the ray origin
        distance: f32,
    },
    Miss,
}

impl RayHit {
    pub fn is_hit(&self) -> bool {
        matches!(self, RayHit::Hit { .. })
    }

    pub fn point(&self) -> Option<Vec3> {
        match self {
            RayHit::Hit { point, .. } => Some(*point),
            RayHit::Miss => None,
        }
    }
}

/// Intersects a ray with terrain geometry.
pub trait RayCaster {
    fn cast(&self, ray: &Ray, mesh: &HeightFieldMesh) -> RayHit;
}

/// Closest-hit triangle caster over the mesh's index buffer.
///
/// Geometry without indices is treated as a plain triangle list.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshRayCaster;

impl RayCaster for MeshRayCaster {
    fn cast(&self, ray: &Ray, mesh: &HeightFieldMesh) -> RayHit {
        let affine = mesh.world_affine();
        let inverse = affine.inverse();
        let local_origin = inverse.transform_point3(ray.origin);
        let Some(local_dir) = inverse.transform_vector3(ray.direction).try_normalize() else {
            return RayHit::Miss;
        };

        let scene_mesh = mesh.handle().borrow();
        let Some(positions) = scene_mesh.positions.as_float3() else {
            return RayHit::Miss;
        };

        let sequential: Vec<u32>;
        let indices: &[u32] = match &scene_mesh.indices {
            Some(indices) => indices.as_slice(),
            None => {
                sequential = (0..positions.len() as u32).collect();
                sequential.as_slice()
            }
        };

        let mut closest: Option<(f32, [Vec3; 3])> = None;
        for triangle in indices.chunks_exact(3) {
            let corner = |i: u32| positions.get(i as usize).map(|&p| Vec3::from(p));
            let (Some(v0), Some(v1), Some(v2)) =
                (corner(triangle[0]), corner(triangle[1]), corner(triangle[2]))
            else {
                continue;
            };

            if let Some(hit) = ray_triangle_intersection(local_origin, local_dir, v0, v1, v2) {
                if closest.is_none_or(|(t, _)| hit.t < t) {
                    closest = Some((hit.t, [v0, v1, v2]));
                }
            }
        }

        let Some((t, [v0, v1, v2])) = closest else {
            trace!("MeshRayCaster: miss on {:?}", mesh.id());
            return RayHit::Miss;
        };

        let point = affine.transform_point3(local_origin + local_dir * t);

        let normal_matrix = Mat3::from(affine.matrix3).inverse().transpose();
        let mut normal = (normal_matrix * (v1 - v0).cross(v2 - v0))
            .try_normalize()
            .unwrap_or(Vec3::Y);
        if normal.dot(ray.direction) > 0.0 {
            normal = -normal;
        }

        RayHit::Hit {
            point,
            normal,
            object: mesh.id(),
            distance: ray.origin.distance(point),
        }
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection.
///
/// Both faces count as hits. Returns `None` when the ray is parallel to the
/// triangle, misses it, or the intersection lies behind the origin.
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray_origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    (t > EPSILON).then_some(TriangleHit { t, u, v })
}

/// Builds world-space rays from normalized device coordinates.
///
/// NDC spans `[-1, 1]` on both axes with +Y up. Returning `None` means the
/// pointer is not over a view that can produce a ray.
pub trait CameraRay {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray>;
}

impl<F> CameraRay for F
where
    F: Fn(Vec2) -> Option<Ray>,
{
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        self(ndc)
    }
}

/// Minimal pinhole camera looking down its local -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
}

impl PerspectiveCamera {
    /// Camera at `eye` looking at `target` with +Y as the up hint.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32) -> Self {
        let forward = (target - eye).try_normalize().unwrap_or(Vec3::NEG_Z);
        let up_hint = if forward.cross(Vec3::Y).length_squared() < EPSILON {
            Vec3::NEG_Z
        } else {
            Vec3::Y
        };
        let right = forward.cross(up_hint).normalize();
        let up = right.cross(forward);

        Self {
            position: eye,
            rotation: Quat::from_mat3(&Mat3::from_cols(right, up, -forward)),
            fov_y,
            aspect,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl CameraRay for PerspectiveCamera {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        if !ndc.is_finite() {
            return None;
        }
        let half_height = (self.fov_y * 0.5).tan();
        let local = Vec3::new(ndc.x * half_height * self.aspect, ndc.y * half_height, -1.0);
        Ray::new(self.position, self.rotation * local)
    }
}

/// Resolve a pointer position against the bound terrain, if any.
pub fn resolve_pointer(
    camera: &impl CameraRay,
    caster: &impl RayCaster,
    mesh: Option<&HeightFieldMesh>,
    ndc: Vec2,
) -> RayHit {
    let Some(mesh) = mesh else {
        return RayHit::Miss;
    };
    match camera.ray_from_ndc(ndc) {
        Some(ray) => caster.cast(&ray, mesh),
        None => RayHit::Miss,
    }
}
