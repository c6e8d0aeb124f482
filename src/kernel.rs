// src/kernel.rs
// Pluggable per-pixel filter strategy for the cube-face render pass
// RELEVANT FILES: src/renderer.rs, src/shaders/edge_resample.wgsl, src/cpu.rs

use std::borrow::Cow;

/// The filtering function applied per pixel, per face.
///
/// A kernel is an opaque WGSL module providing
/// `@fragment fn fs_main(in: VsOut) -> @location(0) vec4<f32>` against the
/// fixed bind interface of group 0:
///
/// - binding 0: `var<uniform> level: LevelUniforms` — mip index being
///   rendered, rewritten before each level's draws
/// - binding 1: `var<uniform> face: FaceUniforms` — destination face index,
///   immutable after renderer initialization
/// - binding 2: `var source_cube: texture_cube<f32>` — the full source chain
/// - binding 3: `var source_sampler: sampler` — linear, clamp-to-edge
///
/// The vertex stage is fixed (fullscreen quad, `VsOut { clip_pos, uv }`);
/// the kernel re-declares the struct it consumes. Convolution kernels
/// (specular/diffuse prefilter variants) are external artifacts carried by
/// [`WgslKernel`]; their math is out of scope here.
pub trait FilterKernel {
    fn label(&self) -> &str;

    /// Complete WGSL module containing `fs_main`.
    fn fragment_source(&self) -> Cow<'_, str>;
}

/// Built-in kernel: resample the source cube along the face direction at the
/// current mip, the legacy cube-map edge fix.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeResampleKernel;

impl FilterKernel for EdgeResampleKernel {
    fn label(&self) -> &str {
        "edge_resample"
    }

    fn fragment_source(&self) -> Cow<'_, str> {
        Cow::Borrowed(include_str!("shaders/edge_resample.wgsl"))
    }
}

/// Caller-supplied kernel wrapping an external WGSL module, e.g. a
/// specular or diffuse convolution shader compiled elsewhere.
#[derive(Debug, Clone)]
pub struct WgslKernel {
    label: String,
    source: String,
}

impl WgslKernel {
    pub fn new(label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
        }
    }
}

impl FilterKernel for WgslKernel {
    fn label(&self) -> &str {
        &self.label
    }

    fn fragment_source(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.source)
    }
}
