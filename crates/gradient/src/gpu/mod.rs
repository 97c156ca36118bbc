//! GPU orchestration for the flow gradient.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `pipeline` compiles the GLSL pair into a render pipeline with a single
//!   uniform bind group.
//! - `uniforms` mirrors the fragment program's uniform block and holds the
//!   resize and pointer math.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   the surface thread.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
pub use uniforms::{normalized_pointer, GradientUniforms};
