use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx};
use crate::device::{GlInit, GlSurface};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub vsync: bool,
    /// Try desktop GL 3.3 core before GLES 3.0.
    pub prefer_desktop_gl: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
            vsync: true,
            prefer_desktop_gl: true,
        }
    }
}

impl RuntimeConfig {
    fn gl_init(&self) -> GlInit {
        GlInit {
            vsync: self.vsync,
            prefer_desktop_gl: self.prefer_desktop_gl,
            ..GlInit::default()
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until it exits or the window closes.
    ///
    /// Errors raised while creating the GL surface, initializing the app or
    /// running a frame end the event loop and are returned here.
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    app: A,

    surface: Option<GlSurface>,
    started: Instant,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, app: A) -> Self {
        Self {
            config,
            app,
            surface: None,
            started: Instant::now(),
            exit_requested: false,
            failure: None,
        }
    }

    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let surface = GlSurface::new(event_loop, attrs, &self.config.gl_init())
            .context("failed to create GL surface")?;

        self.app
            .init(surface.gl())
            .context("application initialization failed")?;

        surface.window().request_redraw();
        self.surface = Some(surface);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.request_exit(event_loop);
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        if !self.exit_requested {
            self.exit_requested = true;
            if let Some(surface) = &self.surface {
                self.app.shutdown(surface.gl());
            }
        }
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(surface) = &self.surface else { return };

        let mut ctx = FrameCtx {
            gl: surface.gl(),
            size: surface.size(),
            timestamp_ms: self.started.elapsed().as_secs_f64() * 1000.0,
        };
        let control = match self.app.on_frame(&mut ctx) {
            Ok(control) => control,
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("frame failed"));
                return;
            }
        };

        if control == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        if let Err(e) = surface.present() {
            self.fail(event_loop, anyhow::Error::new(e).context("failed to present frame"));
            return;
        }

        if control == AppControl::Continue {
            surface.window().request_redraw();
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() || self.exit_requested {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        if let Err(e) = self.create_surface(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::Resized(new_size) => {
                if let Some(surface) = &self.surface {
                    surface.resize(*new_size);
                    surface.window().request_redraw();
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.surface = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_init_follows_the_config() {
        let init = RuntimeConfig::default().gl_init();
        assert!(init.vsync);
        assert!(init.prefer_desktop_gl);
        assert_eq!(init.depth_bits, GlInit::default().depth_bits);

        let init = RuntimeConfig {
            vsync: false,
            prefer_desktop_gl: false,
            ..RuntimeConfig::default()
        }
        .gl_init();
        assert!(!init.vsync);
        assert!(!init.prefer_desktop_gl);
    }
}
