//! Export snapshots handed to an external mesh-container exporter.

use serde::{Deserialize, Serialize};

use crate::mesh::Topology;
use crate::scene::SceneMesh;
use crate::types::{MeshId, Transform};

/// Owned copy of a terrain's geometry at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    pub mesh_id: MeshId,
    /// Local-space positions
    pub positions: Vec<[f32; 3]>,
    /// RGB per vertex, if the terrain was ever painted
    pub colors: Option<Vec<[f32; 3]>>,
    /// Triangle list
    pub indices: Vec<u32>,
    pub topology: Topology,
    pub transform: Transform,
}

impl TerrainSnapshot {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw position bytes (tightly packed little-endian f32 triples).
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions.as_slice())
    }

    /// Raw color bytes, if a color buffer exists.
    pub fn color_bytes(&self) -> Option<&[u8]> {
        self.colors.as_deref().map(|colors| bytemuck::cast_slice(colors))
    }

    /// Indices of vertices whose position or color differs from `other`.
    ///
    /// Both snapshots must come from the same mesh; vertices past the shorter
    /// buffer are reported as changed.
    pub fn changed_vertices(&self, other: &TerrainSnapshot) -> Vec<usize> {
        let count = self.positions.len().max(other.positions.len());
        (0..count)
            .filter(|&i| {
                let position_changed = self.positions.get(i) != other.positions.get(i);
                let color_changed = color_at(self, i) != color_at(other, i);
                position_changed || color_changed
            })
            .collect()
    }
}

impl From<TerrainSnapshot> for SceneMesh {
    /// Re-import an exported terrain as scene geometry, e.g. for edit mode.
    fn from(snapshot: TerrainSnapshot) -> Self {
        let mut mesh = SceneMesh::new(snapshot.mesh_id, snapshot.positions, Some(snapshot.indices))
            .with_transform(snapshot.transform);
        mesh.colors = snapshot.colors;
        mesh.material.vertex_colors = mesh.colors.is_some();
        mesh
    }
}

fn color_at(snapshot: &TerrainSnapshot, index: usize) -> Option<[f32; 3]> {
    snapshot
        .colors
        .as_ref()
        .and_then(|colors| colors.get(index).copied())
}

#[cfg(feature = "bevy")]
mod bevy_export {
    use bevy::asset::RenderAssetUsages;
    use bevy::mesh::{Indices, PrimitiveTopology};
    use bevy::prelude::*;

    use super::TerrainSnapshot;

    impl From<&TerrainSnapshot> for Mesh {
        fn from(snapshot: &TerrainSnapshot) -> Self {
            let mut mesh = Mesh::new(
                PrimitiveTopology::TriangleList,
                RenderAssetUsages::default(),
            );
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, snapshot.positions.clone());
            if let Some(colors) = &snapshot.colors {
                let rgba: Vec<[f32; 4]> = colors.iter().map(|c| [c[0], c[1], c[2], 1.0]).collect();
                mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, rgba);
            }
            mesh.insert_indices(Indices::U32(snapshot.indices.clone()));
            mesh.compute_normals();
            mesh
        }
    }

    #[cfg(test)]
    mod tests {
        use bevy::mesh::VertexAttributeValues;

        use super::*;
        use crate::mesh::Topology;
        use crate::types::{MeshId, Transform};

        #[test]
        fn test_snapshot_to_bevy_mesh() {
            let snapshot = TerrainSnapshot {
                mesh_id: MeshId(1),
                positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
                colors: Some(vec![[1.0, 0.0, 0.0]; 3]),
                indices: vec![0, 2, 1],
                topology: Topology::Arbitrary,
                transform: Transform::IDENTITY,
            };

            let mesh = Mesh::from(&snapshot);
            assert_eq!(mesh.count_vertices(), 3);
            assert!(matches!(mesh.indices(), Some(Indices::U32(indices)) if indices == &snapshot.indices));
            assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());

            match mesh.attribute(Mesh::ATTRIBUTE_COLOR) {
                Some(VertexAttributeValues::Float32x4(colors)) => {
                    assert_eq!(colors.len(), 3);
                    assert_eq!(colors[0], [1.0, 0.0, 0.0, 1.0]);
                }
                other => panic!("unexpected color attribute: {:?}", other),
            }
        }

        #[test]
        fn test_unpainted_snapshot_has_no_colors() {
            let snapshot = TerrainSnapshot {
                mesh_id: MeshId(2),
                positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
                colors: None,
                indices: vec![0, 2, 1],
                topology: Topology::Arbitrary,
                transform: Transform::IDENTITY,
            };
            let mesh = Mesh::from(&snapshot);
            assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_none());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(positions: Vec<[f32; 3]>, colors: Option<Vec<[f32; 3]>>) -> TerrainSnapshot {
        TerrainSnapshot {
            mesh_id: MeshId(1),
            indices: (0..positions.len() as u32).collect(),
            positions,
            colors,
            topology: Topology::Arbitrary,
            transform: Transform::IDENTITY,
        }
    }

    #[test]
    fn test_changed_vertices() {
        let a = snapshot(vec![[0.0; 3], [1.0; 3], [2.0; 3]], None);
        let mut b = a.clone();
        b.positions[1][1] += 0.5;
        assert_eq!(a.changed_vertices(&b), vec![1]);

        let c = snapshot(a.positions.clone(), Some(vec![[1.0; 3], [1.0; 3], [0.0; 3]]));
        assert_eq!(a.changed_vertices(&c), vec![0, 1, 2]);
    }

    #[test]
    fn test_position_bytes_are_packed() {
        let s = snapshot(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], None);
        assert_eq!(s.position_bytes().len(), 2 * 3 * 4);
        assert!(s.color_bytes().is_none());
        assert_eq!(s.triangle_count(), 0);
    }

    #[test]
    fn test_reimport_as_scene_mesh() {
        let s = snapshot(vec![[0.0; 3], [1.0; 3], [2.0; 3]], Some(vec![[0.5; 3]; 3]));
        let mesh = SceneMesh::from(s.clone());
        assert_eq!(mesh.id, s.mesh_id);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, Some(vec![0, 1, 2]));
        assert!(mesh.material.vertex_colors);
        assert!(!mesh.dirty.any());
    }

    #[test]
    fn test_snapshot_serializes() {
        let s = snapshot(vec![[1.0, 2.0, 3.0]], Some(vec![[0.5, 0.5, 0.5]]));
        let json = serde_json::to_string(&s).unwrap();
        let back: TerrainSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
