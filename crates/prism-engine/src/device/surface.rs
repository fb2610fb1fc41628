use std::num::NonZeroU32;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{GlSurface as _, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use crate::error::{RenderError, Result};
use crate::gl::{GlowContext, ShaderDialect};

use super::init::GlInit;

/// A window with a current GL context and its drawable surface.
///
/// Fields drop in declaration order: `gl` releases its objects while the
/// context is still alive, and the window outlives its surface.
pub struct GlSurface {
    gl: GlowContext,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl GlSurface {
    /// Creates the window, picks a config, creates and binds a context.
    ///
    /// Every failure on the way is reported as
    /// [`RenderError::MissingContext`].
    pub fn new(event_loop: &ActiveEventLoop, attrs: WindowAttributes, init: &GlInit) -> Result<Self> {
        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(init.depth_bits);

        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs.clone()))
            .build(event_loop, template, pick_config)
            .map_err(|e| missing(format!("no usable GL config: {e}")))?;

        let window = match window {
            Some(w) => w,
            None => glutin_winit::finalize_window(event_loop, attrs, &config)
                .map_err(|e| missing(format!("failed to create window: {e}")))?,
        };

        let display = config.display();
        let (context, dialect) = create_context(&display, &config, &window, init)?;

        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .map_err(|e| missing(format!("window has no surface handle: {e}")))?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attrs) }
            .map_err(|e| missing(format!("failed to create window surface: {e}")))?;

        let context = context
            .make_current(&surface)
            .map_err(|e| missing(format!("failed to make context current: {e}")))?;

        let interval = if init.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("could not set swap interval {interval:?}: {e}");
        }

        let raw = unsafe {
            glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name))
        };
        let gl = unsafe { GlowContext::new(raw, dialect)? };

        Ok(Self {
            gl,
            surface,
            context,
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn gl(&self) -> &GlowContext {
        &self.gl
    }

    /// Current drawable size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }

    /// Resizes the drawable. Zero-sized (minimized) windows are ignored.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return;
        };
        self.surface.resize(&self.context, w, h);
        log::debug!("surface resized to {}x{}", size.width, size.height);
    }

    /// Swaps the back buffer to the screen.
    pub fn present(&self) -> Result<()> {
        self.window.pre_present_notify();
        self.surface
            .swap_buffers(&self.context)
            .map_err(|e| RenderError::Surface(e.to_string()))
    }
}

fn missing(reason: String) -> RenderError {
    RenderError::MissingContext(reason)
}

/// Prefers the config with the most samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best })
        .expect("display reported no GL configs")
}

fn create_context(
    display: &Display,
    config: &Config,
    window: &Window,
    init: &GlInit,
) -> Result<(NotCurrentContext, ShaderDialect)> {
    let raw_handle = window.window_handle().ok().map(|h| h.as_raw());

    let desktop = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(raw_handle);
    let gles = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
        .build(raw_handle);

    if init.prefer_desktop_gl {
        match unsafe { display.create_context(config, &desktop) } {
            Ok(ctx) => return Ok((ctx, ShaderDialect::Glsl330)),
            Err(e) => log::warn!("desktop GL 3.3 core unavailable ({e}); trying GLES 3.0"),
        }
    }

    unsafe { display.create_context(config, &gles) }
        .map(|ctx| (ctx, ShaderDialect::Es300))
        .map_err(|e| missing(format!("neither GL 3.3 core nor GLES 3.0 is available: {e}")))
}
