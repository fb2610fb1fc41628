//! Prism engine crate.
//!
//! This crate owns the GL pipeline (shader compile/link, mesh upload,
//! textures, frame rendering) and the platform runtime that hosts it.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod gl;
pub mod logging;
pub mod mesh;
pub mod render;
pub mod shader;
pub mod texture;

mod error;

pub use error::{RenderError, Result};
