use image::RgbaImage;

use crate::error::{RenderError, Result};
use crate::gl::{Gl, TextureFilter, TextureWrap};

/// Opaque blue, shown until the real image has been uploaded.
pub const PLACEHOLDER_PIXEL: [u8; 4] = [0, 0, 255, 255];

/// A 2D RGBA texture and its current dimensions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Texture2d<T> {
    handle: T,
    width: u32,
    height: u32,
}

impl<T: Copy> Texture2d<T> {
    /// Creates a texture holding the 1x1 placeholder pixel.
    ///
    /// The texture is complete and samplable immediately, so rendering can
    /// start before any image data has arrived.
    pub fn placeholder<G: Gl<Texture = T>>(gl: &G) -> Result<Self> {
        let handle = gl
            .create_texture()
            .map_err(|reason| RenderError::ResourceCreation {
                what: "texture",
                reason,
            })?;

        gl.bind_texture_2d(Some(handle));
        gl.tex_image_2d_rgba(1, 1, &PLACEHOLDER_PIXEL);
        gl.texture_sampling(
            TextureWrap::ClampToEdge,
            TextureFilter::Nearest,
            TextureFilter::Nearest,
        );

        Ok(Self {
            handle,
            width: 1,
            height: 1,
        })
    }

    /// Replaces the texture's contents with `image`.
    ///
    /// Power-of-two images get mipmaps and repeat wrapping. Anything else is
    /// clamped to the edge and linearly filtered without mipmaps.
    pub fn upload_rgba<G: Gl<Texture = T>>(&mut self, gl: &G, image: &RgbaImage) {
        let (width, height) = image.dimensions();

        gl.bind_texture_2d(Some(self.handle));
        gl.tex_image_2d_rgba(width, height, image.as_raw());

        if width.is_power_of_two() && height.is_power_of_two() {
            gl.generate_mipmap_2d();
            gl.texture_sampling(
                TextureWrap::Repeat,
                TextureFilter::LinearMipmapLinear,
                TextureFilter::Linear,
            );
        } else {
            gl.texture_sampling(
                TextureWrap::ClampToEdge,
                TextureFilter::Linear,
                TextureFilter::Linear,
            );
        }

        self.width = width;
        self.height = height;
    }

    pub fn handle(&self) -> T {
        self.handle
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn delete<G: Gl<Texture = T>>(self, gl: &G) {
        gl.delete_texture(self.handle);
    }
}

/// Decodes PNG/JPEG bytes into tightly packed RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, RecordingGl};

    #[test]
    fn placeholder_is_a_single_pixel() {
        let gl = RecordingGl::new();
        let tex = Texture2d::placeholder(&gl).unwrap();
        assert_eq!(tex.size(), (1, 1));
        assert_eq!(gl.texture_size(tex.handle()), Some((1, 1)));
    }

    #[test]
    fn power_of_two_upload_generates_mipmaps() {
        let gl = RecordingGl::new();
        let mut tex = Texture2d::placeholder(&gl).unwrap();
        gl.clear_calls();

        tex.upload_rgba(&gl, &RgbaImage::new(4, 2));

        assert_eq!(tex.size(), (4, 2));
        assert_eq!(gl.texture_size(tex.handle()), Some((4, 2)));
        assert!(gl.calls().contains(&GlCall::GenerateMipmap {
            texture: Some(tex.handle())
        }));
    }

    #[test]
    fn npot_upload_clamps_without_mipmaps() {
        let gl = RecordingGl::new();
        let mut tex = Texture2d::placeholder(&gl).unwrap();
        gl.clear_calls();

        tex.upload_rgba(&gl, &RgbaImage::new(3, 5));

        let calls = gl.calls();
        assert!(!calls.iter().any(|c| matches!(c, GlCall::GenerateMipmap { .. })));
        assert!(calls.contains(&GlCall::TextureSampling {
            wrap: TextureWrap::ClampToEdge,
            min: TextureFilter::Linear,
            mag: TextureFilter::Linear,
        }));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(RenderError::TextureDecode(_))
        ));
    }
}
