/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

impl Default for Antialiasing {
    fn default() -> Self {
        Self::Auto
    }
}

/// Immutable configuration handed to [`crate::GradientRuntime::attach`].
#[derive(Debug, Clone)]
pub struct GradientConfig {
    /// When false the surface is never mounted and `attach` is a no-op.
    pub enabled: bool,
    /// Initial window caption.
    pub title: String,
    /// Initial window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Optional FPS cap; `None` paces frames with the swapchain.
    pub target_fps: Option<f32>,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "SCRAPERRR".to_string(),
            surface_size: (1280, 720),
            antialiasing: Antialiasing::default(),
            target_fps: None,
        }
    }
}

/// Summary of the adapter picked during device creation.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

impl AdapterProfile {
    pub(crate) fn from_wgpu(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
        }
    }

    /// True for CPU rasterizers (llvmpipe, lavapipe, SwiftShader, WARP).
    pub fn is_software(&self) -> bool {
        if matches!(self.device_type, wgpu::DeviceType::Cpu) {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ["llvmpipe", "lavapipe", "swiftshader", "softpipe", "microsoft basic render"]
            .iter()
            .any(|needle| name.contains(needle))
    }
}
