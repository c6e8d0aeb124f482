//! DDS cube-map load/save via the `ddsfile` codec
//!
//! Accepts only DX10 RGBA32F cube maps. On disk DDS stores faces
//! face-major (each face carries its whole mip chain); in memory the crate
//! is mip-major, so both directions reorder.

use std::fs::File;
use std::path::Path;

use ddsfile::{AlphaMode, Caps2, D3D10ResourceDimension, Dds, DxgiFormat, NewDxgiParams};
use log::info;

use crate::error::{RenderError, RenderResult};
use crate::texture::{CubeImage, CubeMetadata, CUBE_FACE_COUNT};

const DDS_FORMAT: DxgiFormat = DxgiFormat::R32G32B32A32_Float;

/// Load an RGBA32F cube map from a DDS file.
pub fn load_dds<P: AsRef<Path>>(path: P) -> RenderResult<CubeImage> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let dds = Dds::read(&mut file)
        .map_err(|e| RenderError::codec(format!("failed to parse '{}': {e}", path.display())))?;

    match dds.get_dxgi_format() {
        Some(format) if format == DDS_FORMAT => {}
        Some(other) => {
            return Err(RenderError::codec(format!(
                "'{}' is {other:?}, expected {DDS_FORMAT:?}",
                path.display()
            )))
        }
        None => {
            return Err(RenderError::codec(format!(
                "'{}' has no DX10 header; legacy DDS formats are not supported",
                path.display()
            )))
        }
    }

    let meta = CubeMetadata::new(
        dds.get_width(),
        dds.get_height(),
        dds.get_num_mipmap_levels().max(1),
    )?;

    // Validate by payload length rather than the header's array size: single
    // cubes are written with arraySize 1 by some tools and 6 by others.
    let expected_bytes = meta.chain_floats() * 4;
    if dds.data.len() != expected_bytes {
        return Err(RenderError::codec(format!(
            "'{}' holds {} bytes, a {}x{} cube with {} mips needs {}",
            path.display(),
            dds.data.len(),
            meta.width,
            meta.height,
            meta.mip_levels,
            expected_bytes
        )));
    }

    let mut data = vec![0.0f32; meta.chain_floats()];
    let mut src = 0usize;
    for face in 0..CUBE_FACE_COUNT {
        for level in 0..meta.mip_levels {
            let floats = meta.face_floats(level);
            let dst = meta.face_offset(level, face);
            for (i, chunk) in dds.data[src..src + floats * 4].chunks_exact(4).enumerate() {
                data[dst + i] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            }
            src += floats * 4;
        }
    }

    info!(
        "loaded '{}': {}x{} cube, {} mips",
        path.display(),
        meta.width,
        meta.height,
        meta.mip_levels
    );
    CubeImage::new(meta, data)
}

/// Save an RGBA32F cube map as a DX10 DDS file.
pub fn save_dds<P: AsRef<Path>>(image: &CubeImage, path: P) -> RenderResult<()> {
    let path = path.as_ref();
    let meta = image.meta;

    let params = NewDxgiParams {
        height: meta.height,
        width: meta.width,
        depth: None,
        format: DDS_FORMAT,
        mipmap_levels: Some(meta.mip_levels),
        array_layers: Some(CUBE_FACE_COUNT),
        caps2: Some(
            Caps2::CUBEMAP
                | Caps2::CUBEMAP_POSITIVEX
                | Caps2::CUBEMAP_NEGATIVEX
                | Caps2::CUBEMAP_POSITIVEY
                | Caps2::CUBEMAP_NEGATIVEY
                | Caps2::CUBEMAP_POSITIVEZ
                | Caps2::CUBEMAP_NEGATIVEZ,
        ),
        is_cubemap: true,
        resource_dimension: D3D10ResourceDimension::Texture2D,
        alpha_mode: AlphaMode::Unknown,
    };
    let mut dds = Dds::new_dxgi(params)
        .map_err(|e| RenderError::codec(format!("DDS header construction failed: {e}")))?;

    let mut bytes = Vec::with_capacity(meta.chain_floats() * 4);
    for face in 0..CUBE_FACE_COUNT {
        for level in 0..meta.mip_levels {
            for &value in image.face(level, face) {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
    }
    dds.data = bytes;

    let mut file = File::create(path)?;
    dds.write(&mut file)
        .map_err(|e| RenderError::codec(format!("failed to write '{}': {e}", path.display())))?;

    info!(
        "wrote '{}': {}x{} cube, {} mips",
        path.display(),
        meta.width,
        meta.height,
        meta.mip_levels
    );
    Ok(())
}
