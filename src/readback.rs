// src/readback.rs
// Blocking full-chain download of a cube texture into a tight CPU buffer
// Exists to guarantee consistent depadded readback for the export path
// RELEVANT FILES: src/renderer.rs, src/texture.rs, src/gpu.rs

use futures_intrusive::channel::shared::oneshot_channel;

use crate::error::{RenderError, RenderResult, ResourceStage};
use crate::gpu::{align_copy_bpr, scoped};
use crate::texture::{
    strip_image_padding, CubeImage, CubeMetadata, BYTES_PER_PIXEL, CUBE_FACE_COUNT,
};

/// Read every face of every mip level back into a mip-major, face-minor
/// `CubeImage`. One staging buffer per mip, rows padded to the copy
/// alignment on the GPU side and stripped after mapping.
pub fn download_cube(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    meta: CubeMetadata,
) -> RenderResult<CubeImage> {
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("cubeforge.readback.encoder"),
    });

    let mut staging = Vec::with_capacity(meta.mip_levels as usize);

    for level in 0..meta.mip_levels {
        let (width, height) = meta.mip_extent(level);
        let padded_bpr = align_copy_bpr((BYTES_PER_PIXEL as u32) * width) as usize;
        let padded_face = padded_bpr * height as usize;

        let buffer = scoped(device, ResourceStage::Buffer, || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("cubeforge.readback.staging.mip{level}")),
                size: (padded_face * CUBE_FACE_COUNT as usize) as u64,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;

        for face in 0..CUBE_FACE_COUNT {
            encoder.copy_texture_to_buffer(
                wgpu::ImageCopyTexture {
                    texture,
                    mip_level: level,
                    origin: wgpu::Origin3d { x: 0, y: 0, z: face },
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::ImageCopyBuffer {
                    buffer: &buffer,
                    layout: wgpu::ImageDataLayout {
                        offset: (face as usize * padded_face) as u64,
                        bytes_per_row: Some(padded_bpr as u32),
                        rows_per_image: Some(height),
                    },
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        staging.push((buffer, padded_bpr, width, height));
    }

    queue.submit(Some(encoder.finish()));

    let mut receivers = Vec::with_capacity(staging.len());
    for (buffer, ..) in staging.iter() {
        let (sender, receiver) = oneshot_channel();
        buffer.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        receivers.push(receiver);
    }
    device.poll(wgpu::Maintain::Wait);

    for receiver in receivers {
        pollster::block_on(receiver.receive())
            .ok_or_else(|| RenderError::readback("map_async callback channel dropped"))?
            .map_err(|e| RenderError::readback(format!("buffer map failed: {e:?}")))?;
    }

    let mut data = Vec::with_capacity(meta.chain_floats());
    for &(ref buffer, padded_bpr, width, height) in staging.iter() {
        let mapped = buffer.slice(..).get_mapped_range();
        let padded_face = padded_bpr * height as usize;
        for face in 0..CUBE_FACE_COUNT as usize {
            let face_bytes = &mapped[face * padded_face..(face + 1) * padded_face];
            let tight = strip_image_padding(face_bytes, width, height, BYTES_PER_PIXEL);
            // The byte buffer carries no alignment guarantee, so texels are
            // reassembled per chunk instead of cast in place.
            data.extend(
                tight
                    .chunks_exact(4)
                    .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]])),
            );
        }
        drop(mapped);
        buffer.unmap();
    }

    CubeImage::new(meta, data)
}
