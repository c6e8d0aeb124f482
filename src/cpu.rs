// src/cpu.rs
// Software reference rendition of the cube-face mip pass
// Models the GPU fan-out explicitly: per level, per face, per texel, one
// strategy call; deterministic and device-free, used for testing and as the
// reference for the WGSL face-direction math
// RELEVANT FILES: src/renderer.rs, src/shaders/edge_resample.wgsl, src/texture.rs

use glam::Vec3;

use crate::texture::{CubeImage, CubeMetadata, CUBE_FACE_COUNT};

/// The per-pixel filter function, the CPU analogue of a WGSL kernel.
pub trait SamplePixel {
    fn sample_pixel(&self, direction: Vec3, mip_level: u32) -> [f32; 4];
}

/// Direction through the center of texel `(x, y)` on `face` of a
/// `width` x `height` mip level. Matches `face_direction` in
/// shaders/edge_resample.wgsl texel for texel.
pub fn face_texel_direction(face: u32, x: u32, y: u32, width: u32, height: u32) -> Vec3 {
    let a = (2.0 * (x as f32 + 0.5)) / width as f32 - 1.0;
    let b = (2.0 * (y as f32 + 0.5)) / height as f32 - 1.0;
    face_direction(face, a, b).normalize()
}

fn face_direction(face: u32, a: f32, b: f32) -> Vec3 {
    match face {
        0 => Vec3::new(1.0, -b, -a),
        1 => Vec3::new(-1.0, -b, a),
        2 => Vec3::new(a, 1.0, b),
        3 => Vec3::new(a, -1.0, -b),
        4 => Vec3::new(a, -b, 1.0),
        _ => Vec3::new(-a, -b, -1.0),
    }
}

/// Inverse of the face mapping: which face a direction lands on, plus the
/// `[0, 1]` face coordinates of the hit.
pub fn direction_to_face(dir: Vec3) -> (u32, f32, f32) {
    let ax = dir.x.abs();
    let ay = dir.y.abs();
    let az = dir.z.abs();

    let (face, a, b) = if ax >= ay && ax >= az {
        if dir.x > 0.0 {
            (0, -dir.z / ax, -dir.y / ax)
        } else {
            (1, dir.z / ax, -dir.y / ax)
        }
    } else if ay >= az {
        if dir.y > 0.0 {
            (2, dir.x / ay, dir.z / ay)
        } else {
            (3, dir.x / ay, -dir.z / ay)
        }
    } else if dir.z > 0.0 {
        (4, dir.x / az, -dir.y / az)
    } else {
        (5, -dir.x / az, -dir.y / az)
    };

    (face, 0.5 * (a + 1.0), 0.5 * (b + 1.0))
}

/// Render a full cube mip chain on the CPU: level-major, then face 0..5,
/// then row-major texels, producing the same mip-major face-minor layout as
/// the GPU readback.
pub fn render_mip_chain(meta: CubeMetadata, kernel: &dyn SamplePixel) -> CubeImage {
    let mut data = Vec::with_capacity(meta.chain_floats());
    for level in 0..meta.mip_levels {
        let (width, height) = meta.mip_extent(level);
        for face in 0..CUBE_FACE_COUNT {
            for y in 0..height {
                for x in 0..width {
                    let dir = face_texel_direction(face, x, y, width, height);
                    data.extend_from_slice(&kernel.sample_pixel(dir, level));
                }
            }
        }
    }
    CubeImage { meta, data }
}

/// Nearest-texel sampling over a `CubeImage`: the CPU analogue of the
/// edge-resample kernel. Mip requests past the chain clamp to the coarsest
/// level.
pub struct CubeImageSampler<'a> {
    image: &'a CubeImage,
}

impl<'a> CubeImageSampler<'a> {
    pub fn new(image: &'a CubeImage) -> Self {
        Self { image }
    }
}

impl SamplePixel for CubeImageSampler<'_> {
    fn sample_pixel(&self, direction: Vec3, mip_level: u32) -> [f32; 4] {
        let meta = self.image.meta;
        let level = mip_level.min(meta.mip_levels - 1);
        let (width, height) = meta.mip_extent(level);
        let (face, u, v) = direction_to_face(direction);
        let x = ((u * width as f32) as u32).min(width - 1);
        let y = ((v * height as f32) as u32).min(height - 1);
        self.image.pixel(level, face, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texel_directions_map_back_to_their_face() {
        for face in 0..CUBE_FACE_COUNT {
            for y in 0..4 {
                for x in 0..4 {
                    let dir = face_texel_direction(face, x, y, 4, 4);
                    let (hit, u, v) = direction_to_face(dir);
                    assert_eq!(hit, face, "texel ({x},{y}) left face {face}");
                    // Texel centers sit at (x + 0.5) / 4
                    assert!((u - (x as f32 + 0.5) / 4.0).abs() < 1e-5);
                    assert!((v - (y as f32 + 0.5) / 4.0).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn face_directions_point_along_their_axis() {
        let centers: Vec<Vec3> = (0..CUBE_FACE_COUNT)
            .map(|face| face_texel_direction(face, 0, 0, 1, 1))
            .collect();
        assert_eq!(centers[0], Vec3::X);
        assert_eq!(centers[1], Vec3::NEG_X);
        assert_eq!(centers[2], Vec3::Y);
        assert_eq!(centers[3], Vec3::NEG_Y);
        assert_eq!(centers[4], Vec3::Z);
        assert_eq!(centers[5], Vec3::NEG_Z);
    }

    #[test]
    fn sampler_clamps_mip_requests() {
        let meta = CubeMetadata::new(2, 2, 2).unwrap();
        let image = CubeImage::solid(meta, [0.5, 0.5, 0.5, 1.0]);
        let sampler = CubeImageSampler::new(&image);
        assert_eq!(sampler.sample_pixel(Vec3::X, 9), [0.5, 0.5, 0.5, 1.0]);
    }
}
