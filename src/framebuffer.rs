use bytemuck::checked::cast_slice;
use log::debug;

use crate::picture::{Picture, PixelFormat};

/// Owned pixel grid, row-major with row 0 at the bottom of the image.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer<P> {
    buffer: Vec<P>,
    size: (u32, u32),
}

impl<P> Framebuffer<P> {
    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn from_pixels(buffer: Vec<P>, size: (u32, u32)) -> Self {
        assert_eq!(buffer.len(), size.0 as usize * size.1 as usize, "pixel count does not match size");
        Framebuffer { buffer, size }
    }

    pub fn picture(&self) -> Picture<&[P]> {
        Picture::new(self.buffer.as_slice(), self.size)
    }

    pub fn picture_mut(&mut self) -> Picture<&mut [P]> {
        Picture::new(self.buffer.as_mut_slice(), self.size)
    }
}

impl<P: Default + Clone> Framebuffer<P> {
    pub fn new(size: (u32, u32)) -> Self {
        let (width, height) = size;
        let mut buffer = Vec::new();
        buffer.resize(width as usize * height as usize, P::default());
        debug!(target: "app", "Allocating new framebuffer. {}x{} ({})", width, height, buffer.len());

        Framebuffer { buffer, size }
    }
}

impl<P: PixelFormat> Framebuffer<P> {
    pub fn bytes(&self) -> &[u8] {
        cast_slice(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picture::{RGB8, RGBA8};

    #[test]
    fn test_new_is_black() {
        let frame: Framebuffer<RGB8> = Framebuffer::new((4, 3));
        assert_eq!(frame.size(), (4, 3));
        assert!(frame.picture().buffer().iter().all(|pixel| *pixel == RGB8::BLACK));
    }

    #[test]
    fn test_bytes_layout() {
        let mut frame: Framebuffer<RGBA8> = Framebuffer::new((2, 1));
        *frame.picture_mut().pixel_mut(1, 0) = RGBA8::new(1, 2, 3, 4);
        assert_eq!(frame.bytes(), &[0, 0, 0, 0, 1, 2, 3, 4]);
    }
}
