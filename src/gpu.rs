// src/gpu.rs
// Headless device/queue acquisition and copy-alignment helpers
// RELEVANT FILES: src/device_caps.rs, src/renderer.rs, src/readback.rs

use crate::error::{RenderError, RenderResult, ResourceStage};

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter: wgpu::Adapter,
}

impl GpuContext {
    /// Acquire a headless device suitable for cube-face rendering.
    ///
    /// The destination format is `Rgba32Float` and the resample path filters
    /// it, so `FLOAT32_FILTERABLE` is requested up front; adapters without it
    /// are rejected as `UnsupportedDevice` before any resource exists.
    pub fn new() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| RenderError::unsupported("no suitable GPU adapter"))?;

        if !adapter
            .features()
            .contains(wgpu::Features::FLOAT32_FILTERABLE)
        {
            return Err(RenderError::unsupported(
                "adapter lacks FLOAT32_FILTERABLE (required to sample Rgba32Float cube maps)",
            ));
        }

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                required_features: wgpu::Features::FLOAT32_FILTERABLE,
                required_limits: wgpu::Limits::downlevel_defaults(),
                label: Some("cubeforge-device"),
            },
            None,
        ))
        .map_err(|e| RenderError::unsupported(format!("request_device failed: {e}")))?;

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }
}

/// Align to WebGPU's required bytes-per-row for copies.
#[inline]
pub fn align_copy_bpr(unpadded: u32) -> u32 {
    let a = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    ((unpadded + a - 1) / a) * a
}

/// Run `f` inside validation + out-of-memory error scopes, tagging any
/// captured error with the resource stage it belongs to.
///
/// wgpu reports resource-creation failures asynchronously; scoping each
/// creation is what turns them into the structured per-stage errors the
/// renderer promises instead of an uncaptured device error.
pub fn scoped<T>(
    device: &wgpu::Device,
    stage: ResourceStage,
    f: impl FnOnce() -> T,
) -> RenderResult<T> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let validation = pollster::block_on(device.pop_error_scope());
    let oom = pollster::block_on(device.pop_error_scope());
    if let Some(err) = oom.or(validation) {
        return Err(RenderError::resource(stage, err));
    }
    Ok(value)
}
