//! Per-vertex joint influences for linear blend skinning

use glb_builder::JointIndices;

use crate::config::BindingConfig;
use crate::error::ConsistencyError;

/// Influence slots per vertex (JOINTS_0 / WEIGHTS_0 are vec4)
pub const MAX_INFLUENCES: usize = 4;

const WEIGHT_EPSILON: f32 = 1e-6;

/// Fixed four-slot influence set of one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexInfluence {
    pub joints: [u16; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl VertexInfluence {
    /// Fully bound to `joint` in slot 0
    pub fn rigid(joint: u16) -> Self {
        Self {
            joints: [joint, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }

    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// JOINTS_0 / WEIGHTS_0 data for every vertex
#[derive(Debug, Clone, PartialEq)]
pub struct SkinInfluences {
    pub influences: Vec<VertexInfluence>,
    pub joint_count: usize,
}

impl SkinInfluences {
    /// Joint indices narrowed to the smallest width that holds every joint
    pub fn joint_indices(&self) -> JointIndices {
        if self.joint_count <= u8::MAX as usize + 1 {
            JointIndices::U8(
                self.influences
                    .iter()
                    .map(|v| v.joints.map(|j| j as u8))
                    .collect(),
            )
        } else {
            JointIndices::U16(self.influences.iter().map(|v| v.joints).collect())
        }
    }

    pub fn weights(&self) -> Vec<[f32; 4]> {
        self.influences.iter().map(|v| v.weights).collect()
    }
}

/// Assign influences for `vertex_count` vertices.
///
/// Unbound vertices are rigidly bound to `default_joint`. The first binding
/// of a vertex replaces that default in slot 0; further bindings take the
/// next slots. Explicit weights are normalized to sum to 1.
pub fn assign_influences(
    vertex_count: usize,
    joint_count: usize,
    default_joint: u16,
    bindings: &[BindingConfig],
) -> Result<SkinInfluences, ConsistencyError> {
    if default_joint as usize >= joint_count {
        return Err(ConsistencyError::JointOutOfRange {
            vertex: 0,
            joint: default_joint as usize,
            joint_count,
        });
    }

    let mut influences = vec![VertexInfluence::rigid(default_joint); vertex_count];
    let mut used = vec![0usize; vertex_count];

    for binding in bindings {
        if binding.vertex >= vertex_count {
            return Err(ConsistencyError::VertexOutOfRange {
                vertex: binding.vertex,
                vertex_count,
            });
        }
        if binding.joint >= joint_count {
            return Err(ConsistencyError::JointOutOfRange {
                vertex: binding.vertex,
                joint: binding.joint,
                joint_count,
            });
        }

        let slot = used[binding.vertex];
        if slot == MAX_INFLUENCES {
            return Err(ConsistencyError::TooManyInfluences(binding.vertex));
        }

        let influence = &mut influences[binding.vertex];
        // joint_count is capped at u16::MAX + 1 by config validation
        let joint = binding.joint as u16;
        if influence.joints[..slot].contains(&joint) {
            return Err(ConsistencyError::DuplicateInfluence {
                vertex: binding.vertex,
                joint: binding.joint,
            });
        }
        if slot == 0 {
            *influence = VertexInfluence {
                joints: [0; MAX_INFLUENCES],
                weights: [0.0; MAX_INFLUENCES],
            };
        }
        influence.joints[slot] = joint;
        influence.weights[slot] = binding.weight;
        used[binding.vertex] = slot + 1;
    }

    for (vertex, influence) in influences.iter_mut().enumerate() {
        if used[vertex] == 0 {
            continue;
        }
        let sum = influence.weight_sum();
        if sum < WEIGHT_EPSILON {
            return Err(ConsistencyError::ZeroWeight(vertex));
        }
        for weight in &mut influence.weights {
            *weight /= sum;
        }
    }

    tracing::debug!(
        "Assigned influences: {} vertices, {} explicit bindings",
        vertex_count,
        bindings.len()
    );

    Ok(SkinInfluences {
        influences,
        joint_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(vertex: usize, joint: usize, weight: f32) -> BindingConfig {
        BindingConfig {
            vertex,
            joint,
            weight,
        }
    }

    #[test]
    fn sample_scenario() {
        let skin = assign_influences(7, 2, 0, &[binding(1, 1, 1.0)]).unwrap();

        assert_eq!(skin.influences.len(), 7);
        assert_eq!(skin.influences[0], VertexInfluence::rigid(0));
        assert_eq!(skin.influences[1], VertexInfluence::rigid(1));
        for influence in &skin.influences {
            let nonzero: Vec<usize> = (0..MAX_INFLUENCES)
                .filter(|&s| influence.weights[s] != 0.0)
                .collect();
            assert_eq!(nonzero.len(), 1);
            assert!((influence.joints[nonzero[0]] as usize) < skin.joint_count);
            assert!((influence.weight_sum() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn default_joint_is_configurable() {
        let skin = assign_influences(3, 2, 1, &[]).unwrap();
        assert!(skin.influences.iter().all(|v| v.joints[0] == 1));
    }

    #[test]
    fn multiple_bindings_fill_slots_and_normalize() {
        let skin =
            assign_influences(2, 3, 0, &[binding(1, 1, 0.25), binding(1, 2, 0.25)]).unwrap();
        let v = skin.influences[1];
        assert_eq!(v.joints, [1, 2, 0, 0]);
        assert_eq!(v.weights, [0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn fifth_binding_is_rejected() {
        let bindings: Vec<_> = (0..5).map(|j| binding(0, j, 0.2)).collect();
        assert_eq!(
            assign_influences(1, 5, 0, &bindings),
            Err(ConsistencyError::TooManyInfluences(0))
        );
    }

    #[test]
    fn repeated_joint_on_one_vertex_is_rejected() {
        assert_eq!(
            assign_influences(3, 2, 0, &[binding(2, 1, 0.5), binding(2, 1, 0.5)]),
            Err(ConsistencyError::DuplicateInfluence { vertex: 2, joint: 1 })
        );
        // another vertex may reuse the joint
        assert!(assign_influences(3, 2, 0, &[binding(1, 1, 1.0), binding(2, 1, 1.0)]).is_ok());
    }

    #[test]
    fn out_of_range_joint() {
        assert_eq!(
            assign_influences(7, 2, 0, &[binding(1, 2, 1.0)]),
            Err(ConsistencyError::JointOutOfRange {
                vertex: 1,
                joint: 2,
                joint_count: 2
            })
        );
    }

    #[test]
    fn out_of_range_vertex() {
        assert_eq!(
            assign_influences(7, 2, 0, &[binding(7, 1, 1.0)]),
            Err(ConsistencyError::VertexOutOfRange {
                vertex: 7,
                vertex_count: 7
            })
        );
    }

    #[test]
    fn zero_weight_binding() {
        assert_eq!(
            assign_influences(2, 2, 0, &[binding(1, 1, 0.0)]),
            Err(ConsistencyError::ZeroWeight(1))
        );
    }

    #[test]
    fn joint_index_width_follows_joint_count() {
        let small = assign_influences(1, 256, 255, &[]).unwrap();
        assert_eq!(small.joint_indices(), JointIndices::U8(vec![[255, 0, 0, 0]]));

        let large = assign_influences(1, 300, 0, &[binding(0, 299, 1.0)]).unwrap();
        assert_eq!(
            large.joint_indices(),
            JointIndices::U16(vec![[299, 0, 0, 0]])
        );
    }
}
