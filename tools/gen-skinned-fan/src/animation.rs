//! Keyframe animation authoring
//!
//! Channels hold absolute local-space values in the same convention as the
//! joint bind pose, so sampling any channel yields a usable local transform.

use glam::{Quat, Vec3};

use crate::config::FanConfig;
use crate::error::ConsistencyError;
use crate::skeleton::Skeleton;

const UNIT_EPSILON: f32 = 1e-5;

/// Keyframe interpolation; only linear is authored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
}

/// Sampler output, one value per keyframe
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOutput {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
}

impl ChannelOutput {
    pub fn len(&self) -> usize {
        match self {
            ChannelOutput::Translation(v) => v.len(),
            ChannelOutput::Rotation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single sampled value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampledValue {
    Translation(Vec3),
    Rotation(Quat),
}

/// Keyframe times paired with output values
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    pub times: Vec<f32>,
    pub output: ChannelOutput,
    pub interpolation: Interpolation,
}

impl Sampler {
    /// Evaluate at `time`, clamping outside the keyframe range.
    ///
    /// Translations interpolate linearly, rotations by slerp.
    pub fn sample(&self, time: f32) -> Option<SampledValue> {
        if time.is_nan() {
            return None;
        }
        let last = self.times.len().checked_sub(1)?;
        let (a, b, t) = if time <= self.times[0] {
            (0, 0, 0.0)
        } else if time >= self.times[last] {
            (last, last, 0.0)
        } else {
            let b = self.times.partition_point(|&k| k <= time);
            let a = b - 1;
            let span = self.times[b] - self.times[a];
            (a, b, (time - self.times[a]) / span)
        };

        Some(match (&self.output, self.interpolation) {
            (ChannelOutput::Translation(v), Interpolation::Linear) => {
                SampledValue::Translation(v.get(a)?.lerp(*v.get(b)?, t))
            }
            (ChannelOutput::Rotation(v), Interpolation::Linear) => {
                SampledValue::Rotation(v.get(a)?.slerp(*v.get(b)?, t).normalize())
            }
        })
    }
}

/// One animated property of one joint
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Joint index in skeleton order
    pub joint: usize,
    pub sampler: Sampler,
}

/// A named set of channels, one sampler each
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub channels: Vec<Channel>,
}

impl Animation {
    /// Last keyframe time across all channels
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .filter_map(|c| c.sampler.times.last().copied())
            .fold(0.0, f32::max)
    }

    /// Check channel targets, lengths, time ordering and rotation norms
    pub fn validate(&self, joint_count: usize) -> Result<(), ConsistencyError> {
        for (channel_index, channel) in self.channels.iter().enumerate() {
            if channel.joint >= joint_count {
                return Err(ConsistencyError::ChannelTarget {
                    channel: channel_index,
                    joint: channel.joint,
                    joint_count,
                });
            }

            let sampler = &channel.sampler;
            if sampler.times.is_empty() {
                return Err(ConsistencyError::EmptyChannel(channel_index));
            }
            if sampler.output.len() != sampler.times.len() {
                return Err(ConsistencyError::ChannelLength {
                    channel: channel_index,
                    outputs: sampler.output.len(),
                    times: sampler.times.len(),
                });
            }
            if sampler.times.windows(2).any(|w| w[1] <= w[0]) {
                return Err(ConsistencyError::ChannelTimes(channel_index));
            }
            if let ChannelOutput::Rotation(rotations) = &sampler.output {
                if let Some(key) = rotations
                    .iter()
                    .position(|q| (q.length() - 1.0).abs() > UNIT_EPSILON)
                {
                    return Err(ConsistencyError::NonUnitRotation {
                        channel: channel_index,
                        key,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Author the oscillation animation for `skeleton`.
///
/// The tip joint translates by `keyframe_offsets` around its bind position;
/// the root joint rotates about Z by `keyframe_rotations` degrees.
pub fn author_animation(
    skeleton: &Skeleton,
    config: &FanConfig,
) -> Result<Animation, ConsistencyError> {
    let times = config.keyframe_times.clone();

    let tip = skeleton.tip();
    let bind = skeleton
        .joints
        .get(tip)
        .ok_or(ConsistencyError::ChannelTarget {
            channel: 0,
            joint: tip,
            joint_count: skeleton.joint_count(),
        })?
        .translation;
    let translations = config
        .keyframe_offsets
        .iter()
        .map(|offset| bind + Vec3::from_array(*offset))
        .collect();

    let rotations = config
        .keyframe_rotations
        .iter()
        .map(|degrees| Quat::from_rotation_z(degrees.to_radians()).normalize())
        .collect();

    let animation = Animation {
        name: config.animation_name.clone(),
        channels: vec![
            Channel {
                joint: tip,
                sampler: Sampler {
                    times: times.clone(),
                    output: ChannelOutput::Translation(translations),
                    interpolation: Interpolation::Linear,
                },
            },
            Channel {
                joint: skeleton.root(),
                sampler: Sampler {
                    times,
                    output: ChannelOutput::Rotation(rotations),
                    interpolation: Interpolation::Linear,
                },
            },
        ],
    };

    animation.validate(skeleton.joint_count())?;

    tracing::debug!(
        "Authored animation '{}': {} channels, duration {}",
        animation.name,
        animation.channels.len(),
        animation.duration()
    );

    Ok(animation)
}
