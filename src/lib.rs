//! Headless cube-map mip-chain renderer over wgpu 0.19.
//!
//! Converts a loaded RGBA32F cube map into a filtered TextureCube mip chain:
//! every destination mip level is a rendering of the source into all six
//! faces through a fullscreen-quad pipeline with a pluggable per-pixel
//! filter kernel, then read back to CPU memory for DDS export. The shipped
//! kernel is the legacy edge-fix resample; convolution kernels are external
//! WGSL artifacts wrapped by [`kernel::WgslKernel`].

pub mod cpu;
pub mod device_caps;
pub mod error;
pub mod formats;
pub mod gpu;
pub mod kernel;
pub mod readback;
pub mod renderer;
pub mod texture;

pub use device_caps::DeviceCaps;
pub use error::{RenderError, RenderResult, ResourceStage};
pub use gpu::GpuContext;
pub use kernel::{EdgeResampleKernel, FilterKernel, WgslKernel};
pub use renderer::CubeFaceMipRenderer;
pub use texture::{CubeImage, CubeMetadata, CUBE_FACE_COUNT, TARGET_FORMAT};
