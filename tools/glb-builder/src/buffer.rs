//! Low-level buffer packing with automatic alignment and accessor creation

use crate::utils::{align_buffer, compute_bounds};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Element layout of a packed accessor
#[derive(Debug, Clone, Copy)]
struct Layout {
    component: json::accessor::ComponentType,
    kind: json::accessor::Type,
    target: Option<json::buffer::Target>,
}

/// Builder for a single binary buffer with automatic alignment
pub struct BufferBuilder {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Create a new empty buffer builder
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            views: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Get the binary buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer views
    pub fn views(&self) -> &[json::buffer::View] {
        &self.views
    }

    /// Get the accessors
    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// Attach a debug name to a previously packed accessor
    pub fn name_accessor(&mut self, index: AccessorIndex, name: &str) {
        if let Some(accessor) = self.accessors.get_mut(index.0 as usize) {
            accessor.name = Some(name.to_string());
        }
    }

    /// Append raw bytes as a new view + accessor, then pad to 4 bytes.
    fn push(
        &mut self,
        bytes: &[u8],
        count: usize,
        layout: Layout,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> AccessorIndex {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: bytes.len().into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: layout.target.map(Valid),
        });

        let (min, max) = match bounds {
            Some((min, max)) => (
                Some(json::Value::Array(
                    min.into_iter().map(json::Value::from).collect(),
                )),
                Some(json::Value::Array(
                    max.into_iter().map(json::Value::from).collect(),
                )),
            ),
            None => (None, None),
        };

        let accessor_idx = self.accessors.len() as u32;
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(layout.component)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(layout.kind),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });

        align_buffer(&mut self.buffer);
        AccessorIndex(accessor_idx)
    }

    /// Pack Vec3 positions with bounds calculation
    pub fn pack_positions(&mut self, positions: &[[f32; 3]]) -> AccessorIndex {
        let bounds = compute_bounds(positions);
        self.push(
            bytemuck::cast_slice(positions),
            positions.len(),
            Layout {
                component: json::accessor::ComponentType::F32,
                kind: json::accessor::Type::Vec3,
                target: Some(json::buffer::Target::ArrayBuffer),
            },
            Some(bounds),
        )
    }

    /// Pack Vec3 animation output (translations, scales). No GPU target.
    pub fn pack_vec3(&mut self, data: &[[f32; 3]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            Layout {
                component: json::accessor::ComponentType::F32,
                kind: json::accessor::Type::Vec3,
                target: None,
            },
            None,
        )
    }

    /// Pack Vec4 animation output (rotations). No GPU target.
    pub fn pack_vec4(&mut self, data: &[[f32; 4]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            Layout {
                component: json::accessor::ComponentType::F32,
                kind: json::accessor::Type::Vec4,
                target: None,
            },
            None,
        )
    }

    /// Pack Vec4 vertex attribute data (weights)
    pub fn pack_vertex_vec4(&mut self, data: &[[f32; 4]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            Layout {
                component: json::accessor::ComponentType::F32,
                kind: json::accessor::Type::Vec4,
                target: Some(json::buffer::Target::ArrayBuffer),
            },
            None,
        )
    }

    /// Pack joint indices (Vec4<u8>)
    pub fn pack_joints_u8(&mut self, joints: &[[u8; 4]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(joints),
            joints.len(),
            Layout {
                component: json::accessor::ComponentType::U8,
                kind: json::accessor::Type::Vec4,
                target: Some(json::buffer::Target::ArrayBuffer),
            },
            None,
        )
    }

    /// Pack joint indices (Vec4<u16>) for skeletons with more than 256 joints
    pub fn pack_joints_u16(&mut self, joints: &[[u16; 4]]) -> AccessorIndex {
        let mut bytes = Vec::with_capacity(joints.len() * 8);
        for joint in joints {
            for idx in joint {
                bytes.extend_from_slice(&idx.to_le_bytes());
            }
        }
        self.push(
            &bytes,
            joints.len(),
            Layout {
                component: json::accessor::ComponentType::U16,
                kind: json::accessor::Type::Vec4,
                target: Some(json::buffer::Target::ArrayBuffer),
            },
            None,
        )
    }

    /// Pack u32 triangle indices
    pub fn pack_indices_u32(&mut self, indices: &[u32]) -> AccessorIndex {
        let mut bytes = Vec::with_capacity(indices.len() * 4);
        for idx in indices {
            bytes.extend_from_slice(&idx.to_le_bytes());
        }
        self.push(
            &bytes,
            indices.len(),
            Layout {
                component: json::accessor::ComponentType::U32,
                kind: json::accessor::Type::Scalar,
                target: Some(json::buffer::Target::ElementArrayBuffer),
            },
            None,
        )
    }

    /// Pack Mat4 data (inverse bind matrices), column-major
    pub fn pack_mat4(&mut self, matrices: &[[f32; 16]]) -> AccessorIndex {
        let mut bytes = Vec::with_capacity(matrices.len() * 64);
        for mat in matrices {
            for f in mat {
                bytes.extend_from_slice(&f.to_le_bytes());
            }
        }
        self.push(
            &bytes,
            matrices.len(),
            Layout {
                component: json::accessor::ComponentType::F32,
                kind: json::accessor::Type::Mat4,
                target: None,
            },
            None,
        )
    }

    /// Pack scalar f32 data with min/max (animation times)
    pub fn pack_scalars_with_bounds(&mut self, scalars: &[f32]) -> AccessorIndex {
        let mut bytes = Vec::with_capacity(scalars.len() * 4);
        for scalar in scalars {
            bytes.extend_from_slice(&scalar.to_le_bytes());
        }

        let min_val = scalars.iter().copied().fold(f32::INFINITY, f32::min);
        let max_val = scalars.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        self.push(
            &bytes,
            scalars.len(),
            Layout {
                component: json::accessor::ComponentType::F32,
                kind: json::accessor::Type::Scalar,
                target: None,
            },
            Some((vec![min_val], vec![max_val])),
        )
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}
