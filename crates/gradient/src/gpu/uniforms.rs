use bytemuck::{Pod, Zeroable};

use crate::runtime::TimeSample;

/// CPU mirror of the fragment program's `GradientParams` block (std140).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GradientUniforms {
    u_resolution: [f32; 2],
    u_mouse: [f32; 2],
    u_time: f32,
    _padding: [f32; 3],
}

impl GradientUniforms {
    /// Pointer position before the first cursor event.
    pub const INITIAL_POINTER: [f32; 2] = [0.5, 0.5];

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            u_resolution: [width.max(1) as f32, height.max(1) as f32],
            u_mouse: Self::INITIAL_POINTER,
            u_time: 0.0,
            _padding: [0.0; 3],
        }
    }

    /// Updates the resolution; zero-sized viewports keep the previous value.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.u_resolution = [width as f32, height as f32];
        true
    }

    /// Recomputes the pointer uniform from a viewport-relative position.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        let [width, height] = self.u_resolution;
        self.u_mouse = normalized_pointer(x, y, width, height);
    }

    pub fn advance(&mut self, sample: TimeSample) {
        self.u_time = sample.seconds;
    }

    pub fn resolution(&self) -> [f32; 2] {
        self.u_resolution
    }

    pub fn pointer(&self) -> [f32; 2] {
        self.u_mouse
    }

    pub fn time(&self) -> f32 {
        self.u_time
    }
}

/// Maps a viewport position to `((x / w) * (w / h), 1 - y / h)`.
pub fn normalized_pointer(x: f64, y: f64, width: f32, height: f32) -> [f32; 2] {
    let width = f64::from(width.max(1.0));
    let height = f64::from(height.max(1.0));
    let aspect = width / height;
    [((x / width) * aspect) as f32, (1.0 - y / height) as f32]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-5 && (a[1] - b[1]).abs() < 1e-5
    }

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(std::mem::size_of::<GradientUniforms>(), 32);
        let uniforms = GradientUniforms::new(640, 480);
        let bytes = bytemuck::bytes_of(&uniforms);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(&floats[..5], &[640.0, 480.0, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn resize_updates_resolution() {
        let mut uniforms = GradientUniforms::new(800, 600);
        assert!(uniforms.resize(1920, 1080));
        assert_eq!(uniforms.resolution(), [1920.0, 1080.0]);
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut uniforms = GradientUniforms::new(800, 600);
        assert!(!uniforms.resize(0, 600));
        assert_eq!(uniforms.resolution(), [800.0, 600.0]);
    }

    #[test]
    fn pointer_is_aspect_corrected_and_flipped() {
        let mut uniforms = GradientUniforms::new(1600, 800);
        uniforms.pointer_moved(400.0, 200.0);
        // (400 / 1600) * (1600 / 800) = 0.5, 1 - 200 / 800 = 0.75
        assert!(close(uniforms.pointer(), [0.5, 0.75]));
    }

    #[test]
    fn pointer_uses_latest_resolution() {
        let mut uniforms = GradientUniforms::new(1600, 800);
        uniforms.resize(1000, 1000);
        uniforms.pointer_moved(1000.0, 0.0);
        assert!(close(uniforms.pointer(), [1.0, 1.0]));
        uniforms.pointer_moved(0.0, 1000.0);
        assert!(close(uniforms.pointer(), [0.0, 0.0]));
    }

    #[test]
    fn advance_tracks_elapsed_seconds() {
        let mut uniforms = GradientUniforms::new(10, 10);
        uniforms.advance(TimeSample::new(3.25, 7));
        assert_eq!(uniforms.time(), 3.25);
    }
}
