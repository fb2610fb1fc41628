use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use image::RgbaImage;

use crate::error::{RenderError, Result};

use super::texture2d::decode_image;

/// Reads and decodes one image off the render thread.
///
/// The result is delivered exactly once; poll it from the frame loop and
/// upload it into the placeholder texture when it arrives.
#[derive(Debug)]
pub struct TextureLoader {
    rx: Receiver<Result<RgbaImage>>,
}

impl TextureLoader {
    /// Starts loading `path` on a background thread.
    pub fn spawn(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Self::start(move || {
            let bytes = std::fs::read(&path).map_err(|source| RenderError::TextureRead {
                path: path.clone(),
                source,
            })?;
            let image = decode_image(&bytes)?;
            log::info!(
                "decoded texture {}: {}x{}",
                path.display(),
                image.width(),
                image.height()
            );
            Ok(image)
        })
    }

    /// Decodes already-fetched bytes on a background thread.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::start(move || decode_image(&bytes))
    }

    fn start(job: impl FnOnce() -> Result<RgbaImage> + Send + 'static) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("texture-loader".into())
            .spawn(move || {
                let _ = tx.send(job());
            })
            .map_err(|e| RenderError::ResourceCreation {
                what: "texture loader thread",
                reason: e.to_string(),
            })?;
        Ok(Self { rx })
    }

    /// Returns the result if it has arrived, without blocking.
    ///
    /// After the result has been taken, further polls report
    /// [`RenderError::LoaderDisconnected`].
    pub fn poll(&self) -> Option<Result<RgbaImage>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(RenderError::LoaderDisconnected)),
        }
    }

    /// Blocks for at most `timeout` waiting for the result.
    pub fn wait(&self, timeout: Duration) -> Option<Result<RgbaImage>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(RenderError::LoaderDisconnected)),
        }
    }
}
