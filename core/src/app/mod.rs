//! Hosts a sample renderer in a window or off screen.
//!
//! The window runner drives the renderer from winit's event loop: resize
//! events go to [`Renderer::on_resize`], redraw requests to
//! [`Renderer::render_frame`], and the next redraw is requested right away.

mod headless;

pub use headless::{render_frames, run_headless, HeadlessReport};

use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::SampleConfig;
use crate::samples::{create_renderer, FrameOutcome, Renderer};
use crate::view::{GpuView, WindowView};

/// Open a window and run the configured sample until the window closes.
pub fn run(config: SampleConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SampleApp::new(config);
    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    match app.error.take() {
        Some(e) => Err(e),
        None => {
            log::info!("Rendered {} frames", app.frames_submitted());
            Ok(())
        }
    }
}

struct Hosted {
    view: WindowView,
    renderer: Box<dyn Renderer>,
}

struct SampleApp {
    config: SampleConfig,
    hosted: Option<Hosted>,
    skipped: u64,
    error: Option<anyhow::Error>,
}

impl SampleApp {
    fn new(config: SampleConfig) -> Self {
        Self {
            config,
            hosted: None,
            skipped: 0,
            error: None,
        }
    }

    fn frames_submitted(&self) -> u64 {
        self.hosted
            .as_ref()
            .map_or(0, |h| h.renderer.frames_submitted())
    }

    fn create_hosted(&self, event_loop: &ActiveEventLoop) -> Result<Hosted> {
        let attrs = Window::default_attributes()
            .with_title(format!("{} - {}", self.config.title, self.config.sample))
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let view = pollster::block_on(WindowView::new(window, self.config.vsync))
            .context("GPU initialization failed for window")?;
        let info = view.context().adapter_info();
        log::info!("Presenting with {} ({:?})", info.name, info.backend);

        let renderer = create_renderer(self.config.sample, &view, &self.config)
            .with_context(|| format!("failed to initialize {} sample", self.config.sample))?;

        Ok(Hosted { view, renderer })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for SampleApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.hosted.is_some() {
            return;
        }

        match self.create_hosted(event_loop) {
            Ok(hosted) => {
                hosted.view.window().request_redraw();
                self.hosted = Some(hosted);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(hosted) = self.hosted.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                hosted.view.resize(size);
                hosted.renderer.on_resize(size.into());
                hosted.view.window().request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if hosted.renderer.render_frame(&mut hosted.view) == FrameOutcome::Skipped {
                    self.skipped += 1;
                    log::trace!("Frame skipped ({} so far)", self.skipped);
                }
                if let Some(fault) = hosted.view.take_fault() {
                    self.fail(event_loop, fault.into());
                    return;
                }
                hosted.view.window().request_redraw();
            }
            _ => {}
        }
    }
}
