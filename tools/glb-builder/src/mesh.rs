//! Skinned mesh construction

use crate::buffer::{AccessorIndex, BufferBuilder};

/// Accessor indices for a mesh
#[derive(Debug, Clone)]
pub struct MeshAccessors {
    pub positions: AccessorIndex,
    pub joints: Option<AccessorIndex>,
    pub weights: Option<AccessorIndex>,
    pub indices: Option<AccessorIndex>,
}

/// JOINTS_0 payload; the component width follows the skeleton size.
#[derive(Debug, Clone, PartialEq)]
pub enum JointIndices {
    U8(Vec<[u8; 4]>),
    U16(Vec<[u16; 4]>),
}

impl JointIndices {
    pub fn len(&self) -> usize {
        match self {
            JointIndices::U8(j) => j.len(),
            JointIndices::U16(j) => j.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for mesh data
pub struct MeshBuilder {
    positions: Vec<[f32; 3]>,
    joints: Option<JointIndices>,
    weights: Option<Vec<[f32; 4]>>,
    indices: Option<Vec<u32>>,
    names: Option<MeshAccessorNames>,
}

/// Debug names attached to the packed mesh accessors
#[derive(Debug, Clone)]
pub struct MeshAccessorNames {
    pub positions: String,
    pub indices: String,
    pub joints: String,
    pub weights: String,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            joints: None,
            weights: None,
            indices: None,
            names: None,
        }
    }

    /// Set positions (required)
    pub fn positions(mut self, positions: &[[f32; 3]]) -> Self {
        self.positions = positions.to_vec();
        self
    }

    /// Set joint indices (optional, for skinned meshes)
    pub fn joints(mut self, joints: JointIndices) -> Self {
        self.joints = Some(joints);
        self
    }

    /// Set joint weights (optional, for skinned meshes)
    pub fn weights(mut self, weights: &[[f32; 4]]) -> Self {
        self.weights = Some(weights.to_vec());
        self
    }

    /// Set triangle indices (optional)
    pub fn indices(mut self, indices: &[u32]) -> Self {
        self.indices = Some(indices.to_vec());
        self
    }

    /// Name the packed accessors
    pub fn accessor_names(mut self, names: MeshAccessorNames) -> Self {
        self.names = Some(names);
        self
    }

    /// Build and pack into buffer
    pub fn build(self, buffer: &mut BufferBuilder) -> MeshAccessors {
        let positions = buffer.pack_positions(&self.positions);
        let indices = self.indices.as_ref().map(|i| buffer.pack_indices_u32(i));
        let joints = self.joints.as_ref().map(|j| match j {
            JointIndices::U8(j) => buffer.pack_joints_u8(j),
            JointIndices::U16(j) => buffer.pack_joints_u16(j),
        });
        let weights = self.weights.as_ref().map(|w| buffer.pack_vertex_vec4(w));

        if let Some(names) = &self.names {
            buffer.name_accessor(positions, &names.positions);
            if let Some(i) = indices {
                buffer.name_accessor(i, &names.indices);
            }
            if let Some(j) = joints {
                buffer.name_accessor(j, &names.joints);
            }
            if let Some(w) = weights {
                buffer.name_accessor(w, &names.weights);
            }
        }

        MeshAccessors {
            positions,
            joints,
            weights,
            indices,
        }
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}
