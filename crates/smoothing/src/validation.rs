use crate::types::MeshWithSmoothingGroups;
use smoothing_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error(
        "Triangle {triangle} corner {corner} references position {index}, but the mesh has {position_count} positions"
    )]
    IndexOutOfBounds {
        triangle: usize,
        corner: usize,
        index: u32,
        position_count: usize,
    },
    #[error("Mesh has {0} triangles; corner references must fit in u32")]
    TooManyTriangles(usize),
    #[error("Normal buffer has {normals} slots for {positions} positions")]
    NormalCountMismatch { normals: usize, positions: usize },
    #[error("Invalid normal config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Check that every triangle index is in range and the normal buffer is sized.
///
/// An empty normal buffer is accepted and resized by synthesis.
pub fn validate_mesh(mesh: &MeshWithSmoothingGroups) -> Result<(), MeshError> {
    if mesh.triangle_count() > (u32::MAX / 3) as usize {
        return Err(MeshError::TooManyTriangles(mesh.triangle_count()));
    }

    let position_count = mesh.vertex_count();
    for (triangle, tri) in mesh.triangles.iter().enumerate() {
        for (corner, &index) in tri.indices.iter().enumerate() {
            if index as usize >= position_count {
                return Err(MeshError::IndexOutOfBounds {
                    triangle,
                    corner,
                    index,
                    position_count,
                });
            }
        }
    }

    if !mesh.normals.is_empty() && mesh.normals.len() != position_count {
        return Err(MeshError::NormalCountMismatch {
            normals: mesh.normals.len(),
            positions: position_count,
        });
    }

    Ok(())
}
