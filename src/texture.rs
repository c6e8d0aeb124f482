// src/texture.rs
// CPU-side cube image model plus GPU upload/allocation for the render pass
// Data layout is mip-major, face-minor: mip 0 faces 0..5, then mip 1, ...
// RELEVANT FILES: src/renderer.rs, src/readback.rs, src/formats/dds.rs

use crate::error::{RenderError, RenderResult, ResourceStage};
use crate::gpu::{align_copy_bpr, scoped};

pub const CUBE_FACE_COUNT: u32 = 6;

/// Fixed high-precision intermediate format for the whole pass.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Bytes per RGBA32F texel.
pub const BYTES_PER_PIXEL: usize = 16;

/// Geometry of a cube mip chain. Destination geometry is copied from the
/// source at allocation time and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeMetadata {
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
}

impl CubeMetadata {
    pub fn new(width: u32, height: u32, mip_levels: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::resource(
                ResourceStage::Texture,
                "cube extent must be positive",
            ));
        }
        if mip_levels == 0 {
            return Err(RenderError::resource(
                ResourceStage::Texture,
                "mip level count must be at least 1",
            ));
        }
        let max = Self::max_mip_levels(width, height);
        if mip_levels > max {
            return Err(RenderError::resource(
                ResourceStage::Texture,
                format!("{mip_levels} mip levels requested, {width}x{height} supports at most {max}"),
            ));
        }
        Ok(Self {
            width,
            height,
            mip_levels,
        })
    }

    /// Length of the full chain down to 1x1 for the given extent.
    pub fn max_mip_levels(width: u32, height: u32) -> u32 {
        32 - width.max(height).leading_zeros()
    }

    /// Extent of one mip level, clamped so the last levels never degenerate
    /// to zero.
    pub fn mip_extent(&self, level: u32) -> (u32, u32) {
        ((self.width >> level).max(1), (self.height >> level).max(1))
    }

    /// Texel count of a single face at `level`.
    pub fn face_texels(&self, level: u32) -> usize {
        let (w, h) = self.mip_extent(level);
        (w as usize) * (h as usize)
    }

    /// f32 count of a single face at `level` (4 components per texel).
    pub fn face_floats(&self, level: u32) -> usize {
        self.face_texels(level) * 4
    }

    /// f32 count of the whole chain, all faces, all levels.
    pub fn chain_floats(&self) -> usize {
        (0..self.mip_levels)
            .map(|level| self.face_floats(level) * CUBE_FACE_COUNT as usize)
            .sum()
    }

    /// Offset in f32s of `(level, face)` within the mip-major layout.
    pub fn face_offset(&self, level: u32, face: u32) -> usize {
        let before: usize = (0..level)
            .map(|l| self.face_floats(l) * CUBE_FACE_COUNT as usize)
            .sum();
        before + self.face_floats(level) * face as usize
    }
}

/// CPU-side RGBA32F cube map, the input and output of every render.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeImage {
    pub meta: CubeMetadata,
    /// Row-major RGBA32F texels, mip-major face-minor.
    pub data: Vec<f32>,
}

impl CubeImage {
    pub fn new(meta: CubeMetadata, data: Vec<f32>) -> RenderResult<Self> {
        let expected = meta.chain_floats();
        if data.len() != expected {
            return Err(RenderError::resource(
                ResourceStage::Texture,
                format!(
                    "cube payload holds {} floats, metadata {}x{} with {} mips needs {}",
                    data.len(),
                    meta.width,
                    meta.height,
                    meta.mip_levels,
                    expected
                ),
            ));
        }
        Ok(Self { meta, data })
    }

    /// A cube filled with one color on every face and level.
    pub fn solid(meta: CubeMetadata, color: [f32; 4]) -> Self {
        let texels = meta.chain_floats() / 4;
        let mut data = Vec::with_capacity(meta.chain_floats());
        for _ in 0..texels {
            data.extend_from_slice(&color);
        }
        Self { meta, data }
    }

    /// Texels of one face at one level.
    pub fn face(&self, level: u32, face: u32) -> &[f32] {
        let start = self.meta.face_offset(level, face);
        &self.data[start..start + self.meta.face_floats(level)]
    }

    pub fn pixel(&self, level: u32, face: u32, x: u32, y: u32) -> [f32; 4] {
        let (w, _) = self.meta.mip_extent(level);
        let face = self.face(level, face);
        let idx = (y as usize * w as usize + x as usize) * 4;
        [face[idx], face[idx + 1], face[idx + 2], face[idx + 3]]
    }
}

pub(crate) fn pad_image_rows(
    data: &[u8],
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> (Vec<u8>, u32) {
    let tight_bpr = bytes_per_pixel * width as usize;
    let padded_bpr = align_copy_bpr(tight_bpr as u32) as usize;
    if padded_bpr == tight_bpr {
        return (data.to_vec(), tight_bpr as u32);
    }

    let mut padded = vec![0u8; padded_bpr * height as usize];
    for row in 0..height as usize {
        let src = row * tight_bpr;
        let dst = row * padded_bpr;
        padded[dst..dst + tight_bpr].copy_from_slice(&data[src..src + tight_bpr]);
    }

    (padded, padded_bpr as u32)
}

pub(crate) fn strip_image_padding(
    padded: &[u8],
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let tight_bpr = bytes_per_pixel * width as usize;
    let padded_bpr = align_copy_bpr(tight_bpr as u32) as usize;
    if padded_bpr == tight_bpr {
        return padded.to_vec();
    }

    let mut tight = vec![0u8; tight_bpr * height as usize];
    for row in 0..height as usize {
        let src = row * padded_bpr;
        let dst = row * tight_bpr;
        tight[dst..dst + tight_bpr].copy_from_slice(&padded[src..src + tight_bpr]);
    }

    tight
}

/// Create the read-only source cube texture and fill it face by face,
/// mip by mip, with row-padded writes.
pub fn upload_source_cube(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &CubeImage,
) -> RenderResult<wgpu::Texture> {
    let meta = image.meta;
    let texture = scoped(device, ResourceStage::Texture, || {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cubeforge.source.cubemap"),
            size: wgpu::Extent3d {
                width: meta.width,
                height: meta.height,
                depth_or_array_layers: CUBE_FACE_COUNT,
            },
            mip_level_count: meta.mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    })?;

    for level in 0..meta.mip_levels {
        let (w, h) = meta.mip_extent(level);
        for face in 0..CUBE_FACE_COUNT {
            let texels: &[u8] = bytemuck::cast_slice(image.face(level, face));
            let (padded, bpr) = pad_image_rows(texels, w, h, BYTES_PER_PIXEL);
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: level,
                    origin: wgpu::Origin3d { x: 0, y: 0, z: face },
                    aspect: wgpu::TextureAspect::All,
                },
                &padded,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bpr),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    Ok(texture)
}

/// Allocate the destination cube texture: render-target and shader-resource
/// capable, geometry taken verbatim from the source metadata.
pub fn create_target_cube(device: &wgpu::Device, meta: CubeMetadata) -> RenderResult<wgpu::Texture> {
    scoped(device, ResourceStage::Texture, || {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cubeforge.target.cubemap"),
            size: wgpu::Extent3d {
                width: meta.width,
                height: meta.height,
                depth_or_array_layers: CUBE_FACE_COUNT,
            },
            mip_level_count: meta.mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    })
}
