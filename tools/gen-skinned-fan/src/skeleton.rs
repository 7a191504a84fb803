//! Joint chain and inverse bind matrices

use glam::{Mat4, Quat, Vec3};

use crate::error::ConsistencyError;

/// Determinants below this are treated as singular
const SINGULAR_EPSILON: f32 = 1e-8;

/// One joint with its bind-pose local transform
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Always an earlier joint; `None` for the root
    pub parent: Option<usize>,
}

impl Joint {
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Joints in creation order; joint index == position in `joints`
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub joints: Vec<Joint>,
}

impl Skeleton {
    /// Build a linear chain: joint `i` is the child of joint `i - 1`.
    pub fn chain(names: impl IntoIterator<Item = String>, offsets: &[Vec3]) -> Self {
        let joints = names
            .into_iter()
            .zip(offsets)
            .enumerate()
            .map(|(i, (name, offset))| Joint {
                name,
                translation: *offset,
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
                parent: i.checked_sub(1),
            })
            .collect();
        Self { joints }
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// The skeleton root (first joint)
    pub fn root(&self) -> usize {
        0
    }

    /// Index of the last joint in the chain
    pub fn tip(&self) -> usize {
        self.joints.len().saturating_sub(1)
    }

    /// Child joint of `index`, if any
    pub fn child_of(&self, index: usize) -> Option<usize> {
        self.joints.iter().position(|j| j.parent == Some(index))
    }

    /// World-space bind transform of every joint.
    ///
    /// Composes full TRS matrices parent-to-child, so non-identity bind
    /// rotation or scale is handled.
    pub fn world_transforms(&self) -> Result<Vec<Mat4>, ConsistencyError> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.joints.len());
        for (index, joint) in self.joints.iter().enumerate() {
            let local = joint.local_matrix();
            let matrix = match joint.parent {
                None => local,
                Some(parent) if parent < index => world[parent] * local,
                Some(parent) => {
                    return Err(ConsistencyError::InvalidParent {
                        joint: index,
                        parent,
                    });
                }
            };
            world.push(matrix);
        }
        Ok(world)
    }

    /// World-space bind position of every joint
    pub fn world_positions(&self) -> Result<Vec<Vec3>, ConsistencyError> {
        Ok(self
            .world_transforms()?
            .iter()
            .map(|m| m.transform_point3(Vec3::ZERO))
            .collect())
    }

    /// Inverse of each joint's world bind transform, aligned by joint index
    pub fn inverse_bind_matrices(&self) -> Result<Vec<Mat4>, ConsistencyError> {
        self.world_transforms()?
            .into_iter()
            .enumerate()
            .map(|(index, world)| {
                if world.determinant().abs() < SINGULAR_EPSILON {
                    Err(ConsistencyError::SingularBindPose(index))
                } else {
                    Ok(world.inverse())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn sample() -> Skeleton {
        Skeleton::chain(
            ["joint0".to_string(), "joint1".to_string()],
            &[Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)],
        )
    }

    #[test]
    fn chain_parentage() {
        let skeleton = sample();
        assert_eq!(skeleton.joint_count(), 2);
        assert_eq!(skeleton.joints[0].parent, None);
        assert_eq!(skeleton.joints[1].parent, Some(0));
        assert_eq!(skeleton.child_of(0), Some(1));
        assert_eq!(skeleton.child_of(1), None);
        assert_eq!(skeleton.tip(), 1);
        assert_eq!(skeleton.joints[1].rotation, Quat::IDENTITY);
        assert_eq!(skeleton.joints[1].scale, Vec3::ONE);
    }

    #[test]
    fn world_positions_are_cumulative() {
        let positions = sample().world_positions().unwrap();
        assert!(positions[0].abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), EPSILON));
        assert!(positions[1].abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPSILON));
    }

    #[test]
    fn inverse_bind_maps_joint_to_origin() {
        let skeleton = sample();
        let ibms = skeleton.inverse_bind_matrices().unwrap();
        let positions = skeleton.world_positions().unwrap();
        for (ibm, pos) in ibms.iter().zip(&positions) {
            assert!(ibm.transform_point3(*pos).abs_diff_eq(Vec3::ZERO, EPSILON));
        }
        // translation-only chain: pure inverse translation
        let expected = Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0));
        assert!(ibms[1].abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn inverse_bind_handles_rotated_parent() {
        let mut skeleton = sample();
        skeleton.joints[0].rotation = Quat::from_rotation_z(FRAC_PI_2);
        skeleton.joints[0].scale = Vec3::splat(2.0);

        let positions = skeleton.world_positions().unwrap();
        // child offset (0.5, 0, 0) rotated 90 degrees and scaled by 2
        assert!(positions[1].abs_diff_eq(Vec3::new(0.5, 1.0, 0.0), EPSILON));

        let ibms = skeleton.inverse_bind_matrices().unwrap();
        for (ibm, pos) in ibms.iter().zip(&positions) {
            assert!(ibm.transform_point3(*pos).abs_diff_eq(Vec3::ZERO, EPSILON));
        }
    }

    #[test]
    fn zero_scale_is_singular() {
        let mut skeleton = sample();
        skeleton.joints[1].scale = Vec3::ZERO;
        assert_eq!(
            skeleton.inverse_bind_matrices(),
            Err(ConsistencyError::SingularBindPose(1))
        );
    }

    #[test]
    fn forward_parent_is_rejected() {
        let mut skeleton = sample();
        skeleton.joints[0].parent = Some(1);
        assert_eq!(
            skeleton.world_transforms(),
            Err(ConsistencyError::InvalidParent {
                joint: 0,
                parent: 1
            })
        );
    }
}
