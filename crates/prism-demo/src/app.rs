use std::path::PathBuf;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::gl::GlowContext;
use prism_engine::render::StopHandle;
use prism_engine::texture::TextureLoader;

use crate::scene::{CubeScene, Variant};

/// Keeps redrawing while the loop has a frame scheduled. Errors go to the
/// runtime, which ends the event loop with them.
fn frame_control(scheduled: prism_engine::Result<bool>) -> prism_engine::Result<AppControl> {
    Ok(if scheduled? {
        AppControl::Continue
    } else {
        AppControl::Wait
    })
}

pub struct CubeApp {
    variant: Variant,
    texture_path: Option<PathBuf>,
    scene: Option<CubeScene<GlowContext>>,
    stop: Option<StopHandle>,
}

impl CubeApp {
    pub fn new(variant: Variant, texture_path: Option<PathBuf>) -> Self {
        Self {
            variant,
            texture_path,
            scene: None,
            stop: None,
        }
    }
}

impl App for CubeApp {
    fn init(&mut self, gl: &GlowContext) -> prism_engine::Result<()> {
        let loader = match (self.variant, self.texture_path.take()) {
            (Variant::Lit, Some(path)) => {
                log::info!("loading texture {}", path.display());
                Some(TextureLoader::spawn(path)?)
            }
            (Variant::Lit, None) => {
                log::info!("no --texture given; drawing with the placeholder texture");
                None
            }
            (Variant::Flat, Some(path)) => {
                log::warn!("--texture {} ignored by the flat variant", path.display());
                None
            }
            (Variant::Flat, None) => None,
        };

        let scene = CubeScene::new(gl, self.variant, loader)?;
        self.stop = Some(scene.stop_handle());
        self.scene = Some(scene);
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state == ElementState::Pressed
            && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
        {
            if let Some(stop) = &self.stop {
                stop.stop();
            }
            return AppControl::Exit;
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> prism_engine::Result<AppControl> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(AppControl::Wait);
        };
        frame_control(scene.frame(ctx.gl, ctx.timestamp_ms, ctx.drawable()))
    }

    fn shutdown(&mut self, gl: &GlowContext) {
        if let Some(scene) = self.scene.take() {
            scene.destroy(gl);
            log::debug!("scene released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::RenderError;

    #[test]
    fn scheduled_frames_keep_redrawing() {
        assert_eq!(frame_control(Ok(true)).unwrap(), AppControl::Continue);
        assert_eq!(frame_control(Ok(false)).unwrap(), AppControl::Wait);
    }

    #[test]
    fn frame_errors_reach_the_runtime() {
        let err = frame_control(Err(RenderError::Surface("lost".into()))).unwrap_err();
        assert!(matches!(err, RenderError::Surface(reason) if reason == "lost"));
    }
}
