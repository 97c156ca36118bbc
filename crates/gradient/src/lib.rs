//! Animated flow-gradient background for the scraperrr feed viewer.
//!
//! The crate owns a single `winit` window and every GPU resource bound to it.
//! The overall flow is:
//!
//! ```text
//!   scraperrr root view
//!          │ GradientConfig
//!          ▼
//!   GradientRuntime::attach ──▶ surface thread ──▶ winit event loop ──▶ render()
//!          ▲         │                                   │
//!          │         └─ SurfaceCommand (title, shutdown)  └─▶ GradientUniforms ─▶ GPU UBO
//!          └──────────── SurfaceSignal (focus, activate, closed)
//! ```
//!
//! The frame loop lives exactly as long as the surface thread. The teardown that
//! stops the loop also releases the GPU state before the window goes away.

mod compile;
mod gpu;
mod runtime;
mod surface;
mod types;

pub use gpu::{normalized_pointer, GradientUniforms};
pub use runtime::{FixedTimeSource, FrameScheduler, SystemTimeSource, TimeSample, TimeSource};
pub use surface::{GradientRuntime, SurfaceSignal};
pub use types::{AdapterProfile, Antialiasing, GradientConfig};
