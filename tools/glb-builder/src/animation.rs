//! Animation channel construction
//!
//! Every track becomes one sampler + one channel. All samplers of one
//! animation share a single keyframe time accessor.

use crate::buffer::{AccessorIndex, BufferBuilder};
use gltf_json::animation::Property;

/// Output values of one track
#[derive(Debug, Clone)]
pub enum TrackValues {
    Translations(Vec<[f32; 3]>),
    Rotations(Vec<[f32; 4]>),
}

impl TrackValues {
    pub fn property(&self) -> Property {
        match self {
            TrackValues::Translations(_) => Property::Translation,
            TrackValues::Rotations(_) => Property::Rotation,
        }
    }
}

#[derive(Debug, Clone)]
struct Track {
    node: u32,
    values: TrackValues,
    name: String,
}

/// Accessors for one channel, ready for document assembly
#[derive(Debug, Clone)]
pub struct ChannelAccessors {
    pub node: u32,
    pub property: Property,
    pub output: AccessorIndex,
}

/// Accessor indices for animation data
#[derive(Debug, Clone)]
pub struct AnimationAccessors {
    pub times: AccessorIndex,
    pub channels: Vec<ChannelAccessors>,
}

/// Builder for animation tracks
pub struct AnimationBuilder {
    times: Vec<f32>,
    times_name: Option<String>,
    tracks: Vec<Track>,
}

impl AnimationBuilder {
    pub fn new() -> Self {
        Self {
            times: Vec::new(),
            times_name: None,
            tracks: Vec::new(),
        }
    }

    /// Set animation times (keyframes)
    pub fn times(mut self, times: &[f32]) -> Self {
        self.times = times.to_vec();
        self
    }

    /// Name the shared time accessor
    pub fn times_name(mut self, name: &str) -> Self {
        self.times_name = Some(name.to_string());
        self
    }

    /// Add a track targeting `node`; `name` labels its output accessor
    pub fn named_track(mut self, node: u32, values: TrackValues, name: &str) -> Self {
        self.tracks.push(Track {
            node,
            values,
            name: name.to_string(),
        });
        self
    }

    /// Build and pack into buffer
    pub fn build(self, buffer: &mut BufferBuilder) -> AnimationAccessors {
        let times = buffer.pack_scalars_with_bounds(&self.times);
        if let Some(name) = &self.times_name {
            buffer.name_accessor(times, name);
        }

        let channels = self
            .tracks
            .iter()
            .map(|track| {
                let output = match &track.values {
                    TrackValues::Translations(v) => buffer.pack_vec3(v),
                    TrackValues::Rotations(v) => buffer.pack_vec4(v),
                };
                buffer.name_accessor(output, &track.name);
                ChannelAccessors {
                    node: track.node,
                    property: track.values.property(),
                    output,
                }
            })
            .collect();

        AnimationAccessors { times, channels }
    }
}

impl Default for AnimationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
