//! Procedural skinned fan generator
//!
//! Builds a triangle-fan mesh, a joint chain with inverse bind matrices,
//! per-vertex joint influences and an oscillation animation, then packs
//! everything into a single GLB file.
//!
//! Data flows one way:
//! - `geometry` and `skeleton` run independently
//! - `skin` consumes the vertex and joint counts
//! - `animation` consumes the skeleton's joint order
//! - `assemble` consumes all of the above

pub mod animation;
pub mod assemble;
pub mod config;
pub mod error;
pub mod geometry;
pub mod skeleton;
pub mod skin;

use glam::Vec3;
use std::fs;
use std::io::Write;
use std::path::Path;

pub use assemble::{AssetParts, AssetSummary};
pub use config::FanConfig;
pub use error::{ConfigError, ConsistencyError, GenerateError, Result};

use crate::skeleton::Skeleton;

/// A generated asset, serialized and verified but not yet written
#[derive(Debug, Clone)]
pub struct GeneratedAsset {
    pub glb: Vec<u8>,
    pub summary: AssetSummary,
}

/// Run every component for `config` and return the verified GLB bytes
pub fn generate(config: &FanConfig) -> Result<GeneratedAsset> {
    config.validate()?;

    let mesh = geometry::generate_fan(config.divisions);

    let offsets: Vec<Vec3> = config
        .joint_offsets
        .iter()
        .map(|o| Vec3::from_array(*o))
        .collect();
    let skeleton = Skeleton::chain(
        (0..config.joint_count()).map(|i| config.joint_name(i)),
        &offsets,
    );
    let inverse_bind_matrices = skeleton.inverse_bind_matrices()?;
    tracing::debug!("Built skeleton: {} joints", skeleton.joint_count());

    // default_joint < joint_count <= u16::MAX + 1 after validation
    let influences = skin::assign_influences(
        mesh.vertex_count(),
        skeleton.joint_count(),
        config.default_joint as u16,
        &config.bindings,
    )?;

    let animation = animation::author_animation(&skeleton, config)?;

    let parts = AssetParts {
        mesh: &mesh,
        skeleton: &skeleton,
        inverse_bind_matrices: &inverse_bind_matrices,
        influences: &influences,
        animation: &animation,
    };
    let summary = parts.summary();
    let glb = assemble::build_glb(&parts)?;
    assemble::verify_round_trip(&glb, &summary)?;

    tracing::info!(
        "Generated asset: {} vertices, {} triangles, {} joints, {} channels, {} bytes",
        summary.vertices,
        summary.triangles,
        summary.joints,
        summary.channels,
        glb.len()
    );

    Ok(GeneratedAsset { glb, summary })
}

/// Write `bytes` to `path` all-or-nothing.
///
/// Data goes to a sibling temporary file first and is renamed into place, so
/// a failed write never leaves a truncated asset behind.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_err = |source: std::io::Error| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let written = fs::File::create(tmp_path)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(tmp_path, path));

    if let Err(source) = written {
        // best effort; the original error is what gets reported
        let _ = fs::remove_file(tmp_path);
        return Err(io_err(source));
    }

    tracing::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Generate and write the asset described by `config`
pub fn run(config: &FanConfig) -> Result<AssetSummary> {
    let asset = generate(config)?;
    write_output(&config.output, &asset.glb)?;
    Ok(asset.summary)
}
