//! GL context + surface management.
//!
//! This module is responsible for:
//! - creating the window together with a matching GL config
//! - creating the GL context (desktop core profile, GLES fallback)
//! - resizing and presenting the window surface

mod init;
mod surface;

pub use init::GlInit;
pub use surface::GlSurface;
