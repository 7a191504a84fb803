//! GLTF document construction

use crate::{AnimationAccessors, MeshAccessors, SkeletonAccessors};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Builder for a single scene node
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    name: String,
    translation: Option<[f32; 3]>,
    rotation: Option<[f32; 4]>,
    scale: Option<[f32; 3]>,
    children: Vec<u32>,
    mesh: Option<u32>,
    skin: Option<u32>,
}

impl NodeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            translation: None,
            rotation: None,
            scale: None,
            children: Vec::new(),
            mesh: None,
            skin: None,
        }
    }

    /// Set local translation, rotation (xyzw) and scale
    pub fn trs(mut self, translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        self.translation = Some(translation);
        self.rotation = Some(rotation);
        self.scale = Some(scale);
        self
    }

    pub fn child(mut self, node: u32) -> Self {
        self.children.push(node);
        self
    }

    pub fn mesh(mut self, mesh: u32) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn skin(mut self, skin: u32) -> Self {
        self.skin = Some(skin);
        self
    }

    pub fn build(self) -> json::Node {
        json::Node {
            camera: None,
            children: if self.children.is_empty() {
                None
            } else {
                Some(self.children.into_iter().map(json::Index::new).collect())
            },
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: self.mesh.map(json::Index::new),
            name: Some(self.name),
            rotation: self.rotation.map(json::scene::UnitQuaternion),
            scale: self.scale,
            skin: self.skin.map(json::Index::new),
            translation: self.translation,
            weights: None,
        }
    }
}

/// Builder for complete GLTF documents
pub struct GltfBuilder {
    nodes: Vec<json::Node>,
    meshes: Vec<json::Mesh>,
    skins: Vec<json::Skin>,
    animations: Vec<json::Animation>,
    scenes: Vec<json::Scene>,
    buffer_byte_length: u64,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            meshes: Vec::new(),
            skins: Vec::new(),
            animations: Vec::new(),
            scenes: Vec::new(),
            buffer_byte_length: 0,
        }
    }

    /// Set buffer byte length (required before building)
    pub fn buffer_byte_length(mut self, length: u64) -> Self {
        self.buffer_byte_length = length;
        self
    }

    /// Add a node
    pub fn add_node(mut self, node: json::Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a mesh with a single triangle-list primitive
    pub fn add_mesh_from_accessors(mut self, name: &str, accessors: &MeshAccessors) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            accessors.positions.as_json_index(),
        );

        if let Some(joints) = accessors.joints {
            attributes.insert(
                Valid(json::mesh::Semantic::Joints(0)),
                joints.as_json_index(),
            );
        }

        if let Some(weights) = accessors.weights {
            attributes.insert(
                Valid(json::mesh::Semantic::Weights(0)),
                weights.as_json_index(),
            );
        }

        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: accessors.indices.map(|i| i.as_json_index()),
            material: None,
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        };

        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives: vec![primitive],
            weights: None,
        });

        self
    }

    /// Add a skin
    pub fn add_skin(
        mut self,
        name: &str,
        skeleton_root: u32,
        joints: &[u32],
        accessors: &SkeletonAccessors,
    ) -> Self {
        self.skins.push(json::Skin {
            extensions: Default::default(),
            extras: Default::default(),
            inverse_bind_matrices: Some(accessors.inverse_bind_matrices.as_json_index()),
            joints: joints.iter().map(|j| json::Index::new(*j)).collect(),
            name: Some(name.to_string()),
            skeleton: Some(json::Index::new(skeleton_root)),
        });
        self
    }

    /// Add an animation, one linear sampler per channel
    pub fn add_animation(mut self, name: &str, accessors: &AnimationAccessors) -> Self {
        let mut samplers = Vec::with_capacity(accessors.channels.len());
        let mut channels = Vec::with_capacity(accessors.channels.len());

        for channel in &accessors.channels {
            samplers.push(json::animation::Sampler {
                input: accessors.times.as_json_index(),
                interpolation: Valid(json::animation::Interpolation::Linear),
                output: channel.output.as_json_index(),
                extensions: Default::default(),
                extras: Default::default(),
            });
            channels.push(json::animation::Channel {
                sampler: json::Index::new(samplers.len() as u32 - 1),
                target: json::animation::Target {
                    node: json::Index::new(channel.node),
                    path: Valid(channel.property),
                    extensions: Default::default(),
                    extras: Default::default(),
                },
                extensions: Default::default(),
                extras: Default::default(),
            });
        }

        self.animations.push(json::Animation {
            channels,
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            samplers,
        });
        self
    }

    /// Add a scene
    pub fn add_scene(mut self, name: &str, root_nodes: &[u32]) -> Self {
        self.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            nodes: root_nodes.iter().map(|n| json::Index::new(*n)).collect(),
        });
        self
    }

    /// Build final GLTF Root (requires buffer views and accessors from BufferBuilder)
    pub fn build(
        self,
        buffer_views: &[json::buffer::View],
        accessors: &[json::Accessor],
        generator: &str,
    ) -> json::Root {
        let buffers = vec![json::Buffer {
            byte_length: self.buffer_byte_length.into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }];

        json::Root {
            accessors: accessors.to_vec(),
            animations: self.animations,
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views: buffer_views.to_vec(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images: Vec::new(),
            materials: Vec::new(),
            meshes: self.meshes,
            nodes: self.nodes,
            samplers: Vec::new(),
            scene: if self.scenes.is_empty() {
                None
            } else {
                Some(json::Index::new(0))
            },
            scenes: self.scenes,
            skins: self.skins,
            textures: Vec::new(),
        }
    }
}

impl Default for GltfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnimationBuilder, BufferBuilder, MeshBuilder, SkeletonBuilder, TrackValues};

    #[test]
    fn test_node_builder_chain() {
        let node = NodeBuilder::new("joint0")
            .trs([0.5, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0])
            .child(1)
            .build();

        assert_eq!(node.name.as_deref(), Some("joint0"));
        assert_eq!(node.translation, Some([0.5, 0.0, 0.0]));
        assert_eq!(node.children.map(|c| c.len()), Some(1));
        assert!(node.mesh.is_none());
    }

    #[test]
    fn test_gltf_builder_skinned() {
        let mut buffer = BufferBuilder::new();
        let mesh = MeshBuilder::new()
            .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
            .indices(&[0, 1, 2])
            .build(&mut buffer);
        let skeleton = SkeletonBuilder::new()
            .inverse_bind_matrices(&[identity_mat4()])
            .build(&mut buffer);
        let animation = AnimationBuilder::new()
            .times(&[0.0, 1.0])
            .named_track(
                0,
                TrackValues::Translations(vec![[0.0; 3], [1.0, 0.0, 0.0]]),
                "positions",
            )
            .build(&mut buffer);

        let gltf = GltfBuilder::new()
            .buffer_byte_length(buffer.data().len() as u64)
            .add_node(NodeBuilder::new("joint0").build())
            .add_node(NodeBuilder::new("polygon").mesh(0).skin(0).build())
            .add_mesh_from_accessors("mesh", &mesh)
            .add_skin("skin", 0, &[0], &skeleton)
            .add_animation("animation", &animation)
            .add_scene("Scene", &[0, 1]);

        let root = gltf.build(buffer.views(), buffer.accessors(), "test");

        assert_eq!(root.meshes.len(), 1);
        assert_eq!(root.skins.len(), 1);
        assert_eq!(root.animations[0].channels.len(), 1);
        assert_eq!(root.animations[0].samplers.len(), 1);
        assert_eq!(root.scene.map(|s| s.value()), Some(0));
        assert_eq!(root.asset.version, "2.0");
    }

    #[rustfmt::skip]
    fn identity_mat4() -> [f32; 16] {
        [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]
    }
}
