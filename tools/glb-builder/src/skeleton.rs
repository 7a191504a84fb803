//! Skin joint nodes and inverse bind matrices

use crate::buffer::{AccessorIndex, BufferBuilder};

/// Accessor indices for skeleton data
#[derive(Debug, Clone)]
pub struct SkeletonAccessors {
    pub inverse_bind_matrices: AccessorIndex,
}

/// Builder for skeleton data
pub struct SkeletonBuilder {
    inverse_bind_matrices: Vec<[f32; 16]>,
    name: Option<String>,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self {
            inverse_bind_matrices: Vec::new(),
            name: None,
        }
    }

    /// Set all inverse bind matrices (column-major)
    pub fn inverse_bind_matrices(mut self, matrices: &[[f32; 16]]) -> Self {
        self.inverse_bind_matrices = matrices.to_vec();
        self
    }

    /// Name the inverse bind matrix accessor
    pub fn accessor_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Build and pack into buffer
    pub fn build(self, buffer: &mut BufferBuilder) -> SkeletonAccessors {
        let inverse_bind_matrices = buffer.pack_mat4(&self.inverse_bind_matrices);
        if let Some(name) = &self.name {
            buffer.name_accessor(inverse_bind_matrices, name);
        }
        SkeletonAccessors {
            inverse_bind_matrices,
        }
    }
}

impl Default for SkeletonBuilder {
    fn default() -> Self {
        Self::new()
    }
}
