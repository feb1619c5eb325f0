use std::iter::Sum;
use std::ops::{Add, Mul};

use bytemuck_derive::{AnyBitPattern, NoUninit};
use wgpu::TextureFormat;

/// Linear RGB value. Used for albedo, radiance and intermediate sums, none of
/// which are bounded to [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Sum for Color {
    fn sum<I: Iterator<Item=Self>>(iter: I) -> Self {
        let mut acc = Color::BLACK;
        for color in iter {
            acc = acc + color;
        }
        acc
    }
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: f32) -> Self {
        Self::new(value, value, value)
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Self) -> Self::Output {
        Color::new(
            self.r + rhs.r,
            self.g + rhs.g,
            self.b + rhs.b,
        )
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Self) -> Self::Output {
        Color::new(
            self.r * rhs.r,
            self.g * rhs.g,
            self.b * rhs.b,
        )
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Self::Output {
        Color::new(
            self.r * rhs,
            self.g * rhs,
            self.b * rhs,
        )
    }
}

impl Mul<Color> for f32 {
    type Output = Color;

    fn mul(self, rhs: Color) -> Self::Output {
        rhs * self
    }
}

/// Framebuffer pixel: three 8-bit channels.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, AnyBitPattern, NoUninit)]
#[repr(C)]
pub struct RGB8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// Float to int `as` casts saturate, so out of range contributions land on 0 or 255.
fn quantize(value: f32) -> u8 {
    (value * 255.0) as u8
}

impl RGB8 {
    pub const BLACK: RGB8 = RGB8::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        RGB8 { r, g, b }
    }

    /// Adds a sample contribution, truncating it to 8 bits first and clamping
    /// every channel to 255 instead of wrapping.
    pub fn accumulate(&mut self, color: Color) {
        self.r = self.r.saturating_add(quantize(color.r));
        self.g = self.g.saturating_add(quantize(color.g));
        self.b = self.b.saturating_add(quantize(color.b));
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, AnyBitPattern, NoUninit)]
#[repr(C)]
pub struct RGBA8 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl RGBA8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        RGBA8 { r, g, b, a }
    }
}

impl From<RGB8> for RGBA8 {
    fn from(value: RGB8) -> Self {
        RGBA8::new(value.r, value.g, value.b, u8::MAX)
    }
}

impl PixelFormat for RGBA8 {
    fn texture_format() -> TextureFormat {
        TextureFormat::Rgba8Unorm
    }
}

pub trait PixelFormat: From<RGB8> + bytemuck::AnyBitPattern + bytemuck::NoUninit {
    fn texture_format() -> TextureFormat;
}

pub struct Picture<P> {
    pixels: P,
    size: (u32, u32),
}

impl<P> Picture<P> {
    pub fn new(pixels: P, size: (u32, u32)) -> Self {
        Picture { pixels, size }
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    fn to_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width() as usize + x as usize
    }
}

impl<'a, T> Picture<&'a [T]> {
    pub fn pixel(&self, x: u32, y: u32) -> &T {
        &self.pixels[self.to_index(x, y)]
    }

    pub fn buffer(&self) -> &[T] {
        self.pixels
    }
}

impl<'a, T> Picture<&'a mut [T]> {
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut T {
        let index = self.to_index(x, y);
        &mut self.pixels[index]
    }

    pub fn buffer_mut(&mut self) -> &mut [T] {
        self.pixels
    }
}

impl<'a> Picture<&'a mut [RGB8]> {
    pub fn clear(&mut self, color: RGB8) {
        self.pixels.fill(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_products() {
        let a = Color::new(1.0, 0.5, 0.0);
        let b = Color::new(0.5, 0.5, 2.0);
        assert_eq!(a * b, Color::new(0.5, 0.25, 0.0));
        assert_eq!(2.0 * a, Color::new(2.0, 1.0, 0.0));
        assert_eq!([a, b].into_iter().sum::<Color>(), Color::new(1.5, 1.0, 2.0));
    }

    #[test]
    fn test_accumulate_truncates() {
        let mut pixel = RGB8::BLACK;
        pixel.accumulate(Color::new(0.0159, 0.5, 1.0));
        assert_eq!(pixel, RGB8::new(4, 127, 255));
    }

    #[test]
    fn test_accumulate_clamps() {
        let mut pixel = RGB8::new(250, 10, 0);
        pixel.accumulate(Color::new(0.1, 3.0, -1.0));
        assert_eq!(pixel, RGB8::new(255, 255, 0));

        pixel.accumulate(Color::new(f32::NAN, 0.0, 0.0));
        assert_eq!(pixel, RGB8::new(255, 255, 0));
    }

    #[test]
    fn test_picture_indexing() {
        let mut buffer = vec![RGB8::BLACK; 6];
        let mut picture = Picture::new(buffer.as_mut_slice(), (3, 2));
        *picture.pixel_mut(2, 1) = RGB8::new(1, 2, 3);
        assert_eq!(buffer[5], RGB8::new(1, 2, 3));
    }
}
