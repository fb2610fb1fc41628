//! Frame rendering.
//!
//! `FrameRenderer` owns a linked program and an uploaded mesh and draws them
//! once per tick of a `FrameLoop`. All GL access goes through the context
//! passed into each call.

mod frame_loop;
mod material;
mod renderer;
mod transform;

pub use frame_loop::{FrameLoop, FrameRequest, LoopState, StopHandle};
pub use material::{FLAT_LAYOUT, LIT_LAYOUT, Material, MaterialKind, names};
pub use renderer::{FrameRenderer, FrameStats};
pub use transform::{Camera, RenderState, Spin, model_view, normal_matrix};
