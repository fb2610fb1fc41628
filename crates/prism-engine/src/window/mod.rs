//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window's GL surface, and drives the
//! application from redraw events.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
