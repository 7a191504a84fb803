//! Error taxonomy for asset generation
//!
//! Every failure is fatal to the run. Configuration errors are raised before
//! any construction, consistency errors before serialization, and I/O errors
//! while writing the final file.

use std::path::PathBuf;

/// Invalid generation parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("divisions must be at least 3, got {0}")]
    TooFewDivisions(u32),

    #[error("divisions {0} exceeds the u32 index range")]
    TooManyDivisions(u32),

    #[error("skeleton needs at least one joint")]
    NoJoints,

    #[error("skeleton has {0} joints, but joint indices are limited to 65536")]
    TooManyJoints(usize),

    #[error("{names} joint names given for {joints} joints")]
    JointNameCount { names: usize, joints: usize },

    #[error("{field}[{index}] is not finite")]
    NonFinite { field: &'static str, index: usize },

    #[error("keyframe_times must not be empty")]
    NoKeyframes,

    #[error("keyframe_times[{0}] is negative")]
    NegativeTime(usize),

    #[error("keyframe_times must be strictly increasing (index {0})")]
    TimesNotIncreasing(usize),

    #[error("{field} has {len} entries, but keyframe_times has {times}")]
    KeyframeLength {
        field: &'static str,
        len: usize,
        times: usize,
    },

    #[error("default_joint {joint} is out of range for {joint_count} joints")]
    DefaultJointOutOfRange { joint: usize, joint_count: usize },

    #[error("bindings[{index}] weight {weight} is outside [0, 1]")]
    BindingWeight { index: usize, weight: f32 },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Internal invariant violated while building the asset
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("skin binding: vertex {vertex} is out of range for {vertex_count} vertices")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    #[error("skin binding: vertex {vertex} references joint {joint}, but the skin has {joint_count} joints")]
    JointOutOfRange {
        vertex: usize,
        joint: usize,
        joint_count: usize,
    },

    #[error("skin binding: vertex {0} has more than 4 joint influences")]
    TooManyInfluences(usize),

    #[error("skin binding: vertex {vertex} binds joint {joint} in more than one slot")]
    DuplicateInfluence { vertex: usize, joint: usize },

    #[error("skin binding: vertex {0} has explicit bindings whose weights sum to zero")]
    ZeroWeight(usize),

    #[error("skeleton: joint {0} has a singular bind transform")]
    SingularBindPose(usize),

    #[error("skeleton: joint {joint} has parent {parent}, which is not created before it")]
    InvalidParent { joint: usize, parent: usize },

    #[error("animation: channel {channel} targets joint {joint}, but the skeleton has {joint_count} joints")]
    ChannelTarget {
        channel: usize,
        joint: usize,
        joint_count: usize,
    },

    #[error("animation: channel {channel} has {outputs} outputs for {times} keyframes")]
    ChannelLength {
        channel: usize,
        outputs: usize,
        times: usize,
    },

    #[error("animation: channel {0} has no keyframes")]
    EmptyChannel(usize),

    #[error("animation: channel {0} keyframe times are not strictly increasing")]
    ChannelTimes(usize),

    #[error("animation: channel {channel} rotation at keyframe {key} is not unit length")]
    NonUnitRotation { channel: usize, key: usize },

    #[error("animation: channel {0} does not share the keyframe times of channel 0")]
    SharedTimes(usize),

    #[error("assembly: {what} is {actual}, expected {expected}")]
    PartCount {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("round trip: {what} is {parsed} after re-parsing, expected {expected}")]
    RoundTrip {
        what: &'static str,
        expected: usize,
        parsed: usize,
    },
}

/// Top-level error for a generation run
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("serialization error: {0:#}")]
    Serialize(anyhow::Error),

    #[error("re-parsing generated GLB failed: {0}")]
    Parse(#[from] gltf::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;
