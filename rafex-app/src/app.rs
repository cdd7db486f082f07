use anyhow::{Context, Result, anyhow};
use pixels::{Pixels, SurfaceTexture};
use rafex_core::Color;
use rafex_render::SkiaSurface;
use rafex_timing::{HighPrecisionTimer, Timer};
use rafex_trial::{KeyPress, Session, SessionRecord};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::keymap::task_key;
use crate::records::RecordSink;

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    session: Session<SkiaSurface, HighPrecisionTimer>,
    sink: RecordSink,
    backdrop: Color,
    fullscreen: bool,
    current_size: Option<PhysicalSize<u32>>,
    refresh_rate: Option<f64>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(
        session: Session<SkiaSurface, HighPrecisionTimer>,
        sink: RecordSink,
        backdrop: Color,
        fullscreen: bool,
    ) -> Self {
        Self {
            window: None,
            pixels: None,
            session,
            sink,
            backdrop,
            fullscreen,
            current_size: None,
            refresh_rate: None,
            error: None,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        log::info!(
            "{} trials on {}/{}; press Escape to abort",
            self.session.trial_count(),
            std::env::consts::OS,
            std::env::consts::ARCH
        );

        event_loop.run_app(&mut self)?;

        let stats = self.session.surface().raster_stats();
        log::info!(
            "{} frames rasterized, avg {:.3}ms, max {:.3}ms, jitter {:.3}ms",
            stats.samples,
            stats.average_frame_time_ns / 1e6,
            stats.max_frame_time_ns / 1e6,
            stats.jitter_ns / 1e6,
        );
        log::info!("{} results written", self.sink.written());

        match self.error.take() {
            Some(err) => Err(err),
            None if self.session.is_aborted() => {
                log::warn!("session aborted after {} trials", self.session.records().len());
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available"))?;
        self.refresh_rate = monitor.refresh_rate_millihertz().map(|rate| rate as f64 / 1000.0);

        let mut attributes = Window::default_attributes().with_title("Rod and frame");
        if self.fullscreen {
            attributes = attributes
                .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
                .with_resizable(false);
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        self.current_size = Some(size);
        log::info!(
            "display {}x{} at scale {:.2}{}",
            size.width,
            size.height,
            window.scale_factor(),
            self.refresh_rate.map(|hz| format!(", {hz:.1} Hz")).unwrap_or_default()
        );

        let texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, texture)?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        // trial timing starts with the first stimulus on screen
        self.session.start()?;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(size)) = (self.pixels.as_mut(), self.current_size) else {
            return Ok(());
        };
        self.session
            .surface()
            .present(pixels.frame_mut(), size.width, size.height, self.backdrop);
        pixels.render().context("frame presentation failed")?;
        Ok(())
    }

    fn update(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let record = self.session.update()?;
        self.finish_record(record, event_loop)
    }

    fn handle_key(&mut self, event: KeyEvent, event_loop: &ActiveEventLoop) -> Result<()> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return Ok(());
        };
        if code == KeyCode::Escape {
            self.session.abort();
            self.exit(event_loop);
            return Ok(());
        }
        let Some(key) = task_key(code) else {
            return Ok(());
        };
        let press = KeyPress {
            key,
            repeat: event.repeat,
            timestamp_ns: self.session.timer().now(),
        };
        let record = self.session.key_press(press)?;
        self.finish_record(record, event_loop)
    }

    fn finish_record(&mut self, record: Option<SessionRecord>, event_loop: &ActiveEventLoop) -> Result<()> {
        if let Some(record) = record {
            self.sink.write(&record)?;
            if self.session.is_finished() {
                self.exit(event_loop);
            }
        }
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.current_size = Some(size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                log::error!("failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                log::error!("failed to resize buffer: {e}");
            }
        }
        log::debug!("display resized to {}x{}", size.width, size.height);
    }

    fn fail(&mut self, err: anyhow::Error, event_loop: &ActiveEventLoop) {
        log::error!("{err:#}");
        self.session.abort();
        self.error = Some(err);
        self.exit(event_loop);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(e.context("failed to create window"), event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let outcome = match event {
            WindowEvent::CloseRequested => {
                self.session.abort();
                self.exit(event_loop);
                Ok(())
            }
            WindowEvent::RedrawRequested => {
                let outcome = self.update(event_loop).and_then(|()| self.render());
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                outcome
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_key(event, event_loop)
            }
            WindowEvent::Resized(size) => {
                self.handle_resize(size);
                Ok(())
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(e) = outcome {
            self.fail(e, event_loop);
        }
    }
}
