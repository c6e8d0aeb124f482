// tests/cpu_reference.rs
// Properties of the software fan-out: chain shape, extent clamping,
// determinism, and the uniform-color scenario, all device-free.

use glam::Vec3;

use cubeforge::cpu::{render_mip_chain, CubeImageSampler, SamplePixel};
use cubeforge::{CubeImage, CubeMetadata, CUBE_FACE_COUNT};

/// Encodes the sampled direction and mip into the output color.
struct DirectionProbe;

impl SamplePixel for DirectionProbe {
    fn sample_pixel(&self, direction: Vec3, mip_level: u32) -> [f32; 4] {
        [direction.x, direction.y, direction.z, mip_level as f32]
    }
}

#[test]
fn chain_has_six_faces_per_level() {
    let meta = CubeMetadata::new(8, 8, 4).unwrap();
    let image = render_mip_chain(meta, &DirectionProbe);

    assert_eq!(image.meta.mip_levels, 4);
    assert_eq!(image.data.len(), meta.chain_floats());
    for level in 0..4 {
        let (w, h) = meta.mip_extent(level);
        assert_eq!((w, h), (8 >> level, 8 >> level));
        for face in 0..CUBE_FACE_COUNT {
            assert_eq!(image.face(level, face).len(), (w * h * 4) as usize);
        }
    }
}

#[test]
fn last_level_clamps_to_one_texel() {
    let meta = CubeMetadata::new(4, 2, 3).unwrap();
    let image = render_mip_chain(meta, &DirectionProbe);
    // 4x2 -> 2x1 -> 1x1, never zero
    assert_eq!(meta.mip_extent(1), (2, 1));
    assert_eq!(meta.mip_extent(2), (1, 1));
    assert_eq!(image.face(2, 0).len(), 4);
}

#[test]
fn probe_records_face_axes_and_mip() {
    let meta = CubeMetadata::new(2, 2, 2).unwrap();
    let image = render_mip_chain(meta, &DirectionProbe);

    // The 1x1 level's single texel looks straight down each face axis
    let expected = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    for (face, axis) in expected.iter().enumerate() {
        let texel = image.pixel(1, face as u32, 0, 0);
        assert!((texel[0] - axis.x).abs() < 1e-6);
        assert!((texel[1] - axis.y).abs() < 1e-6);
        assert!((texel[2] - axis.z).abs() < 1e-6);
        assert_eq!(texel[3], 1.0, "mip index channel");
    }
}

#[test]
fn rendering_twice_is_bit_identical() {
    let meta = CubeMetadata::new(8, 8, 3).unwrap();
    let first = render_mip_chain(meta, &DirectionProbe);
    let second = render_mip_chain(meta, &DirectionProbe);
    assert_eq!(first, second);
}

#[test]
fn uniform_source_stays_uniform_through_resampling() {
    let color = [0.3, 0.6, 0.9, 1.0];
    let meta = CubeMetadata::new(4, 4, 1).unwrap();
    let source = CubeImage::solid(meta, color);
    let result = render_mip_chain(meta, &CubeImageSampler::new(&source));

    for face in 0..CUBE_FACE_COUNT {
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(result.pixel(0, face, x, y), color, "face {face} ({x},{y})");
            }
        }
    }
}
