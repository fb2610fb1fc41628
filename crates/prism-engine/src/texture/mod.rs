//! 2D textures and background image loading.

mod loader;
mod texture2d;

pub use loader::TextureLoader;
pub use texture2d::{PLACEHOLDER_PIXEL, Texture2d, decode_image};
