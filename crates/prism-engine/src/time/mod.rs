//! Time subsystem.
//!
//! Converts host frame timestamps into delta times without coupling to the
//! runtime. Intended usage:
//! - one `FrameClock` per render loop
//! - call `tick_at()` once per presented frame with the host's timestamp

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
