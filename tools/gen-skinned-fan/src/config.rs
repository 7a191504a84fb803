//! Generation parameters
//!
//! Loaded from TOML; every field defaults to the sample polygon asset, so an
//! empty file (or no file) reproduces it exactly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Largest fan that still fits u32 indices (N + 1 vertices)
const MAX_DIVISIONS: u32 = u32::MAX - 1;
/// Joint indices are stored as u8 or u16
pub const MAX_JOINTS: usize = u16::MAX as usize + 1;

/// One explicit vertex-to-joint influence
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BindingConfig {
    pub vertex: usize,
    pub joint: usize,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

/// Complete parameter set for one skinned fan asset
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FanConfig {
    /// Triangle-fan segment count
    pub divisions: u32,
    /// Bind-pose local translation of each joint, parent first
    pub joint_offsets: Vec<[f32; 3]>,
    /// Optional node names; `joint{i}` when absent
    pub joint_names: Option<Vec<String>>,
    /// Shared keyframe times
    pub keyframe_times: Vec<f32>,
    /// Tip joint offsets from its bind translation, one per keyframe
    pub keyframe_offsets: Vec<[f32; 3]>,
    /// Root joint Z rotation in degrees, one per keyframe
    pub keyframe_rotations: Vec<f32>,
    pub bindings: Vec<BindingConfig>,
    /// Joint used by vertices without explicit bindings
    pub default_joint: usize,
    pub animation_name: String,
    pub output: PathBuf,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            divisions: 6,
            joint_offsets: vec![[0.5, 0.0, 0.0], [0.5, 0.0, 0.0]],
            joint_names: None,
            keyframe_times: vec![0.0, 1.0, 2.0, 3.0, 4.0],
            keyframe_offsets: vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, -1.0],
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, 0.0],
            ],
            keyframe_rotations: vec![0.0, -90.0, 0.0, 90.0, 0.0],
            bindings: vec![BindingConfig {
                vertex: 1,
                joint: 1,
                weight: 1.0,
            }],
            default_joint: 0,
            animation_name: "animation".to_string(),
            output: PathBuf::from("polygon.glb"),
        }
    }
}

impl FanConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        Ok(config)
    }

    pub fn joint_count(&self) -> usize {
        self.joint_offsets.len()
    }

    /// Name of joint `index`
    pub fn joint_name(&self, index: usize) -> String {
        self.joint_names
            .as_ref()
            .and_then(|names| names.get(index).cloned())
            .unwrap_or_else(|| format!("joint{}", index))
    }

    /// Reject parameters that cannot produce a well-formed asset
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.divisions < 3 {
            return Err(ConfigError::TooFewDivisions(self.divisions));
        }
        if self.divisions > MAX_DIVISIONS {
            return Err(ConfigError::TooManyDivisions(self.divisions));
        }

        let joint_count = self.joint_count();
        if joint_count == 0 {
            return Err(ConfigError::NoJoints);
        }
        if joint_count > MAX_JOINTS {
            return Err(ConfigError::TooManyJoints(joint_count));
        }
        if let Some(names) = &self.joint_names {
            if names.len() != joint_count {
                return Err(ConfigError::JointNameCount {
                    names: names.len(),
                    joints: joint_count,
                });
            }
        }
        check_finite("joint_offsets", self.joint_offsets.iter().flatten())?;

        if self.keyframe_times.is_empty() {
            return Err(ConfigError::NoKeyframes);
        }
        check_finite("keyframe_times", self.keyframe_times.iter())?;
        if let Some(index) = self.keyframe_times.iter().position(|t| *t < 0.0) {
            return Err(ConfigError::NegativeTime(index));
        }
        if let Some(index) = self.keyframe_times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ConfigError::TimesNotIncreasing(index + 1));
        }

        let times = self.keyframe_times.len();
        for (field, len) in [
            ("keyframe_offsets", self.keyframe_offsets.len()),
            ("keyframe_rotations", self.keyframe_rotations.len()),
        ] {
            if len != times {
                return Err(ConfigError::KeyframeLength { field, len, times });
            }
        }
        check_finite("keyframe_offsets", self.keyframe_offsets.iter().flatten())?;
        check_finite("keyframe_rotations", self.keyframe_rotations.iter())?;

        if self.default_joint >= joint_count {
            return Err(ConfigError::DefaultJointOutOfRange {
                joint: self.default_joint,
                joint_count,
            });
        }

        for (index, binding) in self.bindings.iter().enumerate() {
            if !(0.0..=1.0).contains(&binding.weight) {
                return Err(ConfigError::BindingWeight {
                    index,
                    weight: binding.weight,
                });
            }
        }

        Ok(())
    }
}

/// Reports the flattened index of the first non-finite value
fn check_finite<'a>(
    field: &'static str,
    values: impl Iterator<Item = &'a f32>,
) -> Result<(), ConfigError> {
    for (index, value) in values.enumerate() {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite { field, index });
        }
    }
    Ok(())
}
