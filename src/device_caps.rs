//! Device capabilities and diagnostics
//!
//! Provides structured access to GPU device capabilities and the
//! cube-rendering validation performed before any shader resource exists.

use crate::error::{RenderError, RenderResult};
use crate::texture::{CubeMetadata, CUBE_FACE_COUNT};

/// Device capabilities structure
#[derive(Debug, Clone)]
pub struct DeviceCaps {
    /// Backend identifier (vulkan, dx12, metal, gl)
    pub backend: String,

    /// Adapter name from driver
    pub adapter_name: String,

    /// Device type (integrated, discrete, virtual, cpu, other)
    pub device_type: String,

    /// Maximum 2D texture dimension
    pub max_texture_dimension_2d: u32,

    /// Maximum texture array layers
    pub max_texture_array_layers: u32,

    /// Maximum buffer size
    pub max_buffer_size: u64,

    /// Support for linear filtering of the Rgba32Float destination format
    pub float32_filterable: bool,
}

impl DeviceCaps {
    /// Snapshot the capabilities of an already-created device.
    pub fn from_device(adapter: &wgpu::Adapter, device: &wgpu::Device) -> Self {
        let adapter_info = adapter.get_info();
        let limits = device.limits();
        let features = device.features();

        DeviceCaps {
            backend: format!("{:?}", adapter_info.backend).to_lowercase(),
            adapter_name: adapter_info.name.clone(),
            device_type: format!("{:?}", adapter_info.device_type).to_lowercase(),
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
            max_texture_array_layers: limits.max_texture_array_layers,
            max_buffer_size: limits.max_buffer_size,
            float32_filterable: features.contains(wgpu::Features::FLOAT32_FILTERABLE),
        }
    }

    /// Validate the minimum feature set for rendering into a cube mip chain.
    ///
    /// Fails with `UnsupportedDevice` and nothing allocated; callers run this
    /// before compiling shaders or touching any other resource.
    pub fn ensure_cube_render_support(&self) -> RenderResult<()> {
        if !self.float32_filterable {
            return Err(RenderError::unsupported(
                "device lacks FLOAT32_FILTERABLE; Rgba32Float cube sampling is unavailable",
            ));
        }
        if self.max_texture_array_layers < CUBE_FACE_COUNT {
            return Err(RenderError::unsupported(format!(
                "device supports {} texture array layers, cube rendering needs {}",
                self.max_texture_array_layers, CUBE_FACE_COUNT
            )));
        }
        Ok(())
    }

    /// Validate that a cube of this extent fits the device limits.
    ///
    /// Runs at the top of every render, before any per-render resource is
    /// created, so an oversized source fails as `UnsupportedDevice` rather
    /// than as a resource-creation error deep in the upload path.
    pub fn ensure_extent_supported(&self, meta: &CubeMetadata) -> RenderResult<()> {
        let extent = meta.width.max(meta.height);
        if extent > self.max_texture_dimension_2d {
            return Err(RenderError::unsupported(format!(
                "cube extent {}x{} exceeds device texture limit {}",
                meta.width, meta.height, self.max_texture_dimension_2d
            )));
        }
        // Largest readback staging allocation, matching the mip 0 buffer.
        let padded_bpr =
            crate::gpu::align_copy_bpr(meta.width * crate::texture::BYTES_PER_PIXEL as u32);
        let staging = padded_bpr as u64 * meta.height as u64 * CUBE_FACE_COUNT as u64;
        if staging > self.max_buffer_size {
            return Err(RenderError::unsupported(format!(
                "readback staging for {}x{} needs {} bytes, device buffer limit is {}",
                meta.width, meta.height, staging, self.max_buffer_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> DeviceCaps {
        DeviceCaps {
            backend: "vulkan".into(),
            adapter_name: "test adapter".into(),
            device_type: "discrete".into(),
            max_texture_dimension_2d: 4096,
            max_texture_array_layers: 256,
            max_buffer_size: 1 << 31,
            float32_filterable: true,
        }
    }

    #[test]
    fn unfilterable_float32_is_unsupported() {
        let caps = DeviceCaps {
            float32_filterable: false,
            ..caps()
        };
        let err = caps.ensure_cube_render_support().unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedDevice(_)), "{err}");
    }

    #[test]
    fn too_few_array_layers_is_unsupported() {
        let caps = DeviceCaps {
            max_texture_array_layers: 1,
            ..caps()
        };
        let err = caps.ensure_cube_render_support().unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedDevice(_)), "{err}");
    }

    #[test]
    fn capable_device_passes_validation() {
        assert!(caps().ensure_cube_render_support().is_ok());
    }

    #[test]
    fn oversized_extent_is_unsupported() {
        let meta = CubeMetadata::new(8192, 8192, 1).unwrap();
        let err = caps().ensure_extent_supported(&meta).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedDevice(_)), "{err}");
    }

    #[test]
    fn extent_at_the_limit_passes() {
        let meta = CubeMetadata::new(4096, 4096, 1).unwrap();
        assert!(caps().ensure_extent_supported(&meta).is_ok());
    }

    #[test]
    fn staging_past_the_buffer_limit_is_unsupported() {
        let caps = DeviceCaps {
            max_buffer_size: 1 << 16,
            ..caps()
        };
        let meta = CubeMetadata::new(256, 256, 1).unwrap();
        let err = caps.ensure_extent_supported(&meta).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedDevice(_)), "{err}");
    }
}
