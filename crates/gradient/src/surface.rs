use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::{debug, error, info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::{GpuState, GradientUniforms};
use crate::runtime::{FrameScheduler, SystemTimeSource, TimeSource};
use crate::types::{AdapterProfile, GradientConfig};

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// User input the root view reacts to, forwarded from the surface window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSignal {
    FocusPrevious,
    FocusNext,
    Activate,
    Closed,
}

#[derive(Debug, Clone)]
enum SurfaceCommand {
    SetTitle(String),
    Shutdown,
}

/// Window plus the GPU state rendering into it.
struct SurfaceState {
    window: Arc<Window>,
    gpu: Option<GpuState>,
}

impl SurfaceState {
    fn new(window: Arc<Window>, config: &GradientConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, config.antialiasing)?;
        Ok(Self {
            window,
            gpu: Some(gpu),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn gpu(&mut self) -> Option<&mut GpuState> {
        self.gpu.as_mut()
    }

    fn adapter_profile(&self) -> Option<&AdapterProfile> {
        self.gpu.as_ref().map(GpuState::adapter_profile)
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu
            .as_ref()
            .map(GpuState::size)
            .unwrap_or_else(|| self.window.inner_size())
    }

    fn uniforms(&self) -> Option<&GradientUniforms> {
        self.gpu.as_ref().map(GpuState::uniforms)
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(new_size);
        }
    }

    fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.pointer_moved(position);
        }
    }
}

impl Drop for SurfaceState {
    fn drop(&mut self) {
        // The surface holds a raw window handle, so it must go before the window.
        if self.gpu.take().is_some() {
            debug!("released gradient GPU resources");
        }
    }
}

/// Handle to the running gradient surface.
///
/// The frame loop runs on its own thread until [`GradientRuntime::shutdown`]
/// is called, the handle is dropped, or the user closes the window.
pub struct GradientRuntime {
    proxy: EventLoopProxy<SurfaceCommand>,
    signals: Receiver<SurfaceSignal>,
    join_handle: Option<JoinHandle<Result<()>>>,
}

impl GradientRuntime {
    /// Mounts the surface, or returns `Ok(None)` when there is nothing to
    /// mount onto.
    pub fn attach(config: GradientConfig) -> Result<Option<Self>> {
        if !config.enabled {
            info!("gradient surface disabled; running without a window");
            return Ok(None);
        }
        if !display_available() {
            info!("no display server detected; running without a window");
            return Ok(None);
        }
        Self::spawn(config).map(Some)
    }

    fn spawn(config: GradientConfig) -> Result<Self> {
        let (ready_tx, ready_rx) = bounded(1);
        let (signal_tx, signal_rx) = unbounded();
        let handle = thread::Builder::new()
            .name("scraperrr-gradient".into())
            .spawn(move || run_surface_thread(config, ready_tx, signal_tx))
            .map_err(|err| anyhow!("failed to spawn gradient thread: {err}"))?;

        let proxy = ready_rx
            .recv()
            .map_err(|err| anyhow!("gradient thread failed to initialise: {err}"))??;

        Ok(Self {
            proxy,
            signals: signal_rx,
            join_handle: Some(handle),
        })
    }

    pub fn set_title(&self, title: impl Into<String>) -> Result<()> {
        self.proxy
            .send_event(SurfaceCommand::SetTitle(title.into()))
            .map_err(|err| anyhow!("gradient surface is gone: {err}"))
    }

    /// Channel of input signals, for use with `crossbeam_channel::select!`.
    pub fn signals(&self) -> &Receiver<SurfaceSignal> {
        &self.signals
    }

    pub fn take_signals(&self) -> Vec<SurfaceSignal> {
        self.signals.try_iter().collect()
    }

    pub fn shutdown(mut self) -> Result<()> {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(SurfaceCommand::Shutdown);
            handle
                .join()
                .map_err(|err| anyhow!("gradient thread panicked: {err:?}"))??;
        }
        Ok(())
    }
}

impl Drop for GradientRuntime {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(SurfaceCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn display_available() -> bool {
    display_named_by(|name| std::env::var_os(name))
}

/// True when either display variable is set to something non-empty.
#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
fn display_named_by<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<std::ffi::OsString>,
{
    ["WAYLAND_DISPLAY", "DISPLAY"]
        .iter()
        .any(|name| lookup(name).is_some_and(|value| !value.is_empty()))
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn display_available() -> bool {
    true
}

fn run_surface_thread(
    config: GradientConfig,
    ready_tx: Sender<Result<EventLoopProxy<SurfaceCommand>, anyhow::Error>>,
    signal_tx: Sender<SurfaceSignal>,
) -> Result<()> {
    let mut builder = EventLoopBuilder::<SurfaceCommand>::with_user_event();
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        use winit::platform::wayland::EventLoopBuilderExtWayland;
        EventLoopBuilderExtWayland::with_any_thread(&mut builder, true);
    }

    #[cfg(any(
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    {
        use winit::platform::x11::EventLoopBuilderExtX11;
        EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    }

    let event_loop = match builder.build() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            let message = format!("failed to create event loop: {err}");
            let _ = ready_tx.send(Err(anyhow!(message.clone())));
            return Err(anyhow!(message));
        }
    };
    let proxy = event_loop.create_proxy();

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = match WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .build(&event_loop)
    {
        Ok(window) => Arc::new(window),
        Err(err) => {
            let message = format!("failed to create gradient window: {err}");
            let _ = ready_tx.send(Err(anyhow!(message.clone())));
            return Err(anyhow!(message));
        }
    };

    let mut state = match SurfaceState::new(window, &config) {
        Ok(state) => state,
        Err(err) => {
            let wrapped = anyhow!("failed to initialise gradient renderer: {err}");
            let _ = ready_tx.send(Err(anyhow!(wrapped.to_string())));
            return Err(wrapped);
        }
    };

    let mut target_fps = config.target_fps;
    if let Some(profile) = state.adapter_profile() {
        if profile.is_software() && target_fps.is_none() {
            target_fps = Some(SOFTWARE_FPS_CAP);
            warn!(
                adapter = %profile.name,
                backend = ?profile.backend,
                cap = SOFTWARE_FPS_CAP,
                "software rasterizer detected; capping gradient to {} FPS (override with --fps)",
                SOFTWARE_FPS_CAP
            );
        }
    }
    let mut scheduler = FrameScheduler::new(target_fps);
    let mut clock = SystemTimeSource::new();
    state.window().request_redraw();

    let _ = ready_tx.send(Ok(proxy));
    info!(
        width = state.size().width,
        height = state.size().height,
        "gradient surface attached"
    );

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::UserEvent(command) => match command {
            SurfaceCommand::SetTitle(title) => state.window().set_title(&title),
            SurfaceCommand::Shutdown => {
                debug!("gradient surface shutdown requested");
                elwt.exit();
            }
        },
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    let _ = signal_tx.send(SurfaceSignal::Closed);
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let Some(signal) = signal_for_key(&event) {
                        let _ = signal_tx.send(signal);
                        if signal == SurfaceSignal::Closed {
                            elwt.exit();
                        }
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    state.pointer_moved(position);
                }
                WindowEvent::Resized(new_size) => {
                    state.resize(new_size);
                    if let Some(uniforms) = state.uniforms() {
                        let [width, height] = uniforms.resolution();
                        tracing::trace!(width, height, "resolution uniform updated");
                    }
                }
                WindowEvent::RedrawRequested => {
                    let sample = clock.sample();
                    let Some(gpu) = state.gpu() else {
                        return;
                    };
                    match gpu.render(sample) {
                        Ok(()) => scheduler.mark_rendered(),
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            let size = state.size();
                            state.resize(size);
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; detaching gradient");
                            let _ = signal_tx.send(SurfaceSignal::Closed);
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            debug!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if scheduler.ready_for_frame(now) {
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = scheduler.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("gradient event loop error: {err}"))?;
    info!("gradient surface detached");
    Ok(())
}

fn signal_for_key(event: &KeyEvent) -> Option<SurfaceSignal> {
    if event.state != ElementState::Pressed {
        return None;
    }
    match &event.logical_key {
        Key::Named(NamedKey::ArrowLeft) => Some(SurfaceSignal::FocusPrevious),
        Key::Named(NamedKey::ArrowRight) => Some(SurfaceSignal::FocusNext),
        Key::Named(NamedKey::Enter) if !event.repeat => Some(SurfaceSignal::Activate),
        Key::Named(NamedKey::Escape) if !event.repeat => Some(SurfaceSignal::Closed),
        Key::Character(value) if !event.repeat && value.as_str() == "q" => {
            Some(SurfaceSignal::Closed)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn disabled_config_never_mounts() {
        let config = GradientConfig {
            enabled: false,
            ..GradientConfig::default()
        };
        let runtime = GradientRuntime::attach(config).expect("attach");
        assert!(runtime.is_none());
    }

    #[test]
    fn display_detection_needs_a_non_empty_variable() {
        assert!(!display_named_by(|_| None));
        assert!(!display_named_by(|_| Some(OsString::new())));
        assert!(display_named_by(|name| {
            (name == "WAYLAND_DISPLAY").then(|| OsString::from("wayland-1"))
        }));
        assert!(display_named_by(|name| {
            (name == "DISPLAY").then(|| OsString::from(":0"))
        }));
    }
}
