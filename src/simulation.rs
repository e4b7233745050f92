//! Windowed runner.
//!
//! [`Simulation`] is the builder; `run` opens the window and drives the
//! [`Scene`] from the winit event loop, one frame per redraw.

use std::sync::Arc;

use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::gpu::GpuState;
use crate::input::{Input, InputAction};
use crate::orientation::{OrientationFeed, OrientationSource, UnsupportedOrientation};
use crate::scene::Scene;
use crate::time::FrameTimer;
use crate::video::{DeviceClass, VideoSource};

const MOBILE_HINT: &str = "for the best experience, please use a mobile device";

/// Builder for a windowed run.
///
/// ```ignore
/// let (source, feed) = LiveOrientation::new();
/// Simulation::new()
///     .with_config(config)
///     .with_orientation_source(source)
///     .with_pointer_feed(feed)
///     .run()?;
/// ```
pub struct Simulation {
    config: SceneConfig,
    source: Box<dyn OrientationSource>,
    pointer_feed: Option<OrientationFeed>,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            config: SceneConfig::default(),
            source: Box::new(UnsupportedOrientation),
            pointer_feed: None,
        }
    }

    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    /// Source of tilt samples. Without one the camera never leaves its
    /// resting pose.
    pub fn with_orientation_source(mut self, source: impl OrientationSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Publish pointer movement into `feed` as emulated tilt.
    pub fn with_pointer_feed(mut self, feed: OrientationFeed) -> Self {
        self.pointer_feed = Some(feed);
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), SceneError> {
        let scene = Scene::new(&self.config)?;
        let device = DeviceClass::resolve(self.config.video.device_class);
        let video = VideoSource::open(&self.config.video, device);
        info!(
            "device class {:?}, video playback {:?}",
            device,
            video.policy().state()
        );

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App {
            title: self.config.window.title.clone(),
            initial_size: (self.config.window.width, self.config.window.height),
            input: Input::new(self.config.window.width, self.config.window.height),
            scene,
            source: self.source,
            pointer_feed: self.pointer_feed,
            video: Some(video),
            device,
            timer: FrameTimer::new(),
            window: None,
            gpu_state: None,
            running: true,
            error: None,
        };
        event_loop.run_app(&mut app)?;

        info!("stopped after {} frames", app.scene.snapshot().frame);
        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    title: String,
    initial_size: (u32, u32),
    input: Input,
    scene: Scene,
    source: Box<dyn OrientationSource>,
    pointer_feed: Option<OrientationFeed>,
    video: Option<VideoSource>,
    device: DeviceClass,
    timer: FrameTimer,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    /// Cleared on teardown; no more frames are scheduled after that.
    running: bool,
    /// Setup failure to hand back from `run`.
    error: Option<SceneError>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SceneError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.initial_size.0,
                self.initial_size.1,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.scene.resize(size.width, size.height);
        self.input.set_window_size(size.width, size.height);

        let first_frame = match &self.video {
            Some(video) => video.current_frame().clone(),
            None => Default::default(),
        };
        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            &self.scene,
            &first_frame,
        ))?;

        self.gpu_state = Some(gpu_state);
        self.window = Some(window.clone());
        self.update_title();
        window.request_redraw();
        Ok(())
    }

    /// First gesture: start deferred playback and ask for orientation.
    fn interact(&mut self) {
        if let Some(video) = &mut self.video {
            video.interact();
        }
        self.scene.request_permission(self.source.as_mut());
        self.update_title();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.running {
            return;
        }
        // Schedule the next frame before doing this one.
        if let Some(window) = &self.window {
            window.request_redraw();
        }

        let fps_refreshed = self.timer.tick();
        self.scene.frame(self.source.as_mut());

        let (Some(gpu_state), Some(video)) = (&mut self.gpu_state, &mut self.video) else {
            return;
        };
        video.advance(self.timer.delta());

        match gpu_state.render(&self.scene, video) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                self.teardown(event_loop);
                return;
            }
            Err(e) => warn!("render error: {e:?}"),
        }

        if fps_refreshed {
            self.update_title();
        }
    }

    fn update_title(&self) {
        let Some(window) = &self.window else {
            return;
        };
        let mut title = format!(
            "{} | {} | {:.0} fps",
            self.title,
            self.scene.snapshot(),
            self.timer.fps()
        );
        if !self.device.is_mobile() {
            title.push_str(" | ");
            title.push_str(MOBILE_HINT);
        }
        window.set_title(&title);
    }

    /// Release everything in order: sensor subscription, frame scheduling,
    /// GPU surface and video, then the event loop.
    fn teardown(&mut self, event_loop: &ActiveEventLoop) {
        if !self.running {
            return;
        }
        self.source.shutdown();
        self.running = false;
        self.gpu_state = None;
        self.video = None;
        self.window = None;
        info!("shut down");
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || !self.running {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            error!("setup failed: {e}");
            self.error = Some(e);
            self.running = false;
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.teardown(event_loop),
            WindowEvent::Resized(physical_size) => {
                self.scene.resize(physical_size.width, physical_size.height);
                self.input
                    .set_window_size(physical_size.width, physical_size.height);
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => match self.input.handle_event(&other) {
                Some(InputAction::Interact) => self.interact(),
                Some(InputAction::Tilt(sample)) => {
                    if let Some(feed) = &self.pointer_feed {
                        feed.publish(sample);
                    }
                }
                Some(InputAction::Quit) => self.teardown(event_loop),
                None => {}
            },
        }
    }
}
