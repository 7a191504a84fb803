//! GLB assembly and round-trip verification
//!
//! Node layout:
//! - `0..J`: joints, chained parent to child
//! - `J`: `polygon`, the skinned mesh node
//! - `J + 1`: `container`, scene root holding `polygon` and the skeleton root

use glb_builder::{
    assemble_glb, AnimationBuilder, BufferBuilder, GltfBuilder, MeshAccessorNames, MeshBuilder,
    NodeBuilder, SkeletonBuilder, TrackValues,
};

use crate::animation::{Animation, ChannelOutput};
use crate::error::{ConsistencyError, GenerateError, Result};
use crate::geometry::FanMesh;
use crate::skeleton::Skeleton;
use crate::skin::SkinInfluences;

pub const GENERATOR: &str = "gen-skinned-fan";

/// Counts checked after re-parsing the serialized asset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetSummary {
    pub vertices: usize,
    pub triangles: usize,
    pub joints: usize,
    pub skins: usize,
    pub meshes: usize,
    pub channels: usize,
    pub duration: f32,
}

/// Everything the assembler consumes
pub struct AssetParts<'a> {
    pub mesh: &'a FanMesh,
    pub skeleton: &'a Skeleton,
    pub inverse_bind_matrices: &'a [glam::Mat4],
    pub influences: &'a SkinInfluences,
    pub animation: &'a Animation,
}

impl AssetParts<'_> {
    /// Counts the serialized asset must reproduce
    pub fn summary(&self) -> AssetSummary {
        AssetSummary {
            vertices: self.mesh.vertex_count(),
            triangles: self.mesh.triangle_count(),
            joints: self.skeleton.joint_count(),
            skins: 1,
            meshes: 1,
            channels: self.animation.channels.len(),
            duration: self.animation.duration(),
        }
    }

    /// Cross-component invariants that must hold before serialization
    fn check(&self) -> std::result::Result<(), ConsistencyError> {
        let joint_count = self.skeleton.joint_count();
        if self.inverse_bind_matrices.len() != joint_count {
            return Err(ConsistencyError::PartCount {
                what: "inverse bind matrix count",
                expected: joint_count,
                actual: self.inverse_bind_matrices.len(),
            });
        }
        if self.influences.influences.len() != self.mesh.vertex_count() {
            return Err(ConsistencyError::PartCount {
                what: "influence count",
                expected: self.mesh.vertex_count(),
                actual: self.influences.influences.len(),
            });
        }
        self.animation.validate(joint_count)?;

        let channels = &self.animation.channels;
        if let Some(first) = channels.first() {
            if let Some(index) = channels
                .iter()
                .position(|c| c.sampler.times != first.sampler.times)
            {
                return Err(ConsistencyError::SharedTimes(index));
            }
        }
        Ok(())
    }
}

/// Build the GLB bytes for a fully generated asset
pub fn build_glb(parts: &AssetParts<'_>) -> Result<Vec<u8>> {
    parts.check()?;

    let skeleton = parts.skeleton;
    let joint_count = skeleton.joint_count() as u32;
    let mesh_node = joint_count;
    let container_node = joint_count + 1;

    let mut buffer = BufferBuilder::new();

    let mesh = MeshBuilder::new()
        .positions(&parts.mesh.position_arrays())
        .indices(&parts.mesh.indices())
        .joints(parts.influences.joint_indices())
        .weights(&parts.influences.weights())
        .accessor_names(MeshAccessorNames {
            positions: "vertsAccessor".into(),
            indices: "indicesAccessor".into(),
            joints: "jointAssignments".into(),
            weights: "weights".into(),
        })
        .build(&mut buffer);

    let matrices: Vec<[f32; 16]> = parts
        .inverse_bind_matrices
        .iter()
        .map(|m| m.to_cols_array())
        .collect();
    let skin = SkeletonBuilder::new()
        .inverse_bind_matrices(&matrices)
        .accessor_name("inverseBindMatrices")
        .build(&mut buffer);

    // One shared time accessor; validated channels all carry the same times
    let times = parts
        .animation
        .channels
        .first()
        .map(|c| c.sampler.times.clone())
        .unwrap_or_default();
    let mut animation = AnimationBuilder::new().times(&times).times_name("times");
    for channel in &parts.animation.channels {
        let node = channel.joint as u32;
        animation = match &channel.sampler.output {
            ChannelOutput::Translation(values) => animation.named_track(
                node,
                TrackValues::Translations(values.iter().map(|v| v.to_array()).collect()),
                "positions",
            ),
            ChannelOutput::Rotation(values) => animation.named_track(
                node,
                TrackValues::Rotations(values.iter().map(|q| q.to_array()).collect()),
                "rotations",
            ),
        };
    }
    let animation = animation.build(&mut buffer);

    let mut gltf = GltfBuilder::new().buffer_byte_length(buffer.data().len() as u64);
    for (index, joint) in skeleton.joints.iter().enumerate() {
        let mut node = NodeBuilder::new(&joint.name).trs(
            joint.translation.to_array(),
            joint.rotation.to_array(),
            joint.scale.to_array(),
        );
        if let Some(child) = skeleton.child_of(index) {
            node = node.child(child as u32);
        }
        gltf = gltf.add_node(node.build());
    }

    let joint_nodes: Vec<u32> = (0..joint_count).collect();
    let root = gltf
        .add_node(NodeBuilder::new("polygon").mesh(0).skin(0).build())
        .add_node(
            NodeBuilder::new("container")
                .child(mesh_node)
                .child(skeleton.root() as u32)
                .build(),
        )
        .add_mesh_from_accessors("mesh", &mesh)
        .add_skin("skin", skeleton.root() as u32, &joint_nodes, &skin)
        .add_animation(&parts.animation.name, &animation)
        .add_scene("Scene", &[container_node])
        .build(buffer.views(), buffer.accessors(), GENERATOR);

    assemble_glb(&root, buffer.data()).map_err(GenerateError::Serialize)
}

/// Re-parse `glb` and compare its counts against `expected`
pub fn verify_round_trip(glb: &[u8], expected: &AssetSummary) -> Result<()> {
    let (document, buffers, _images) = gltf::import_slice(glb)?;

    let primitive = document
        .meshes()
        .next()
        .and_then(|mesh| mesh.primitives().next());
    let (vertices, indices) = match &primitive {
        Some(p) => {
            let reader = p.reader(|b| buffers.get(b.index()).map(|d| &d.0[..]));
            (
                reader.read_positions().map_or(0, |it| it.count()),
                reader.read_indices().map_or(0, |it| it.into_u32().count()),
            )
        }
        None => (0, 0),
    };

    let skin_joints = document.skins().next().map_or(0, |s| s.joints().count());
    let channels = document
        .animations()
        .next()
        .map_or(0, |a| a.channels().count());

    let checks = [
        ("vertex count", expected.vertices, vertices),
        ("triangle count", expected.triangles, indices / 3),
        ("joint count", expected.joints, skin_joints),
        ("skin count", expected.skins, document.skins().count()),
        ("mesh count", expected.meshes, document.meshes().count()),
        ("channel count", expected.channels, channels),
    ];
    for (what, expected, parsed) in checks {
        if expected != parsed {
            return Err(ConsistencyError::RoundTrip {
                what,
                expected,
                parsed,
            }
            .into());
        }
    }

    tracing::debug!("Round trip verified: {:?}", expected);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::author_animation;
    use crate::config::FanConfig;
    use crate::geometry::generate_fan;
    use crate::skin::{assign_influences, SkinInfluences};
    use glam::{Mat4, Vec3};

    struct Generated {
        mesh: FanMesh,
        skeleton: Skeleton,
        inverse_bind_matrices: Vec<Mat4>,
        influences: SkinInfluences,
        animation: Animation,
    }

    impl Generated {
        fn parts(&self) -> AssetParts<'_> {
            AssetParts {
                mesh: &self.mesh,
                skeleton: &self.skeleton,
                inverse_bind_matrices: &self.inverse_bind_matrices,
                influences: &self.influences,
                animation: &self.animation,
            }
        }
    }

    fn generated() -> Generated {
        let config = FanConfig::default();
        let offsets: Vec<Vec3> = config
            .joint_offsets
            .iter()
            .map(|o| Vec3::from_array(*o))
            .collect();
        let skeleton = Skeleton::chain((0..2).map(|i| config.joint_name(i)), &offsets);
        let mesh = generate_fan(config.divisions);
        let influences =
            assign_influences(mesh.vertex_count(), 2, 0, &config.bindings).unwrap();
        Generated {
            inverse_bind_matrices: skeleton.inverse_bind_matrices().unwrap(),
            animation: author_animation(&skeleton, &config).unwrap(),
            mesh,
            skeleton,
            influences,
        }
    }

    fn consistency_error(parts: &AssetParts<'_>) -> ConsistencyError {
        match build_glb(parts) {
            Err(GenerateError::Consistency(err)) => err,
            other => panic!("expected consistency error, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn builds_and_round_trips() {
        let generated = generated();
        let parts = generated.parts();
        let glb = build_glb(&parts).unwrap();
        verify_round_trip(&glb, &parts.summary()).unwrap();
    }

    #[test]
    fn missing_inverse_bind_matrix() {
        let mut generated = generated();
        generated.inverse_bind_matrices.pop();
        assert_eq!(
            consistency_error(&generated.parts()),
            ConsistencyError::PartCount {
                what: "inverse bind matrix count",
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn missing_vertex_influence() {
        let mut generated = generated();
        generated.influences.influences.pop();
        assert_eq!(
            consistency_error(&generated.parts()),
            ConsistencyError::PartCount {
                what: "influence count",
                expected: 7,
                actual: 6,
            }
        );
    }

    #[test]
    fn channels_must_share_times() {
        let mut generated = generated();
        generated.animation.channels[1].sampler.times = vec![0.0, 2.0, 4.0, 6.0, 8.0];
        assert_eq!(
            consistency_error(&generated.parts()),
            ConsistencyError::SharedTimes(1)
        );
    }

    #[test]
    fn round_trip_detects_count_mismatch() {
        let generated = generated();
        let parts = generated.parts();
        let glb = build_glb(&parts).unwrap();

        let expected = AssetSummary {
            vertices: 8,
            ..parts.summary()
        };
        let err = verify_round_trip(&glb, &expected).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Consistency(ConsistencyError::RoundTrip {
                what: "vertex count",
                expected: 8,
                parsed: 7,
            })
        ));
        assert!(err.to_string().contains("round trip"));
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let summary = generated().parts().summary();
        assert!(matches!(
            verify_round_trip(b"not a glb", &summary),
            Err(GenerateError::Parse(_))
        ));
    }
}
