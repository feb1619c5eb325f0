//! Spatial median filter run once the sample budget is spent.

use std::time::Instant;

use log::{debug, info};
use order_stat::kth;
use rayon::prelude::*;

use crate::framebuffer::Framebuffer;
use crate::picture::{Picture, RGB8};

/// Per-channel scratch lists for one neighborhood.
struct Neighborhood {
    r: Vec<u8>,
    g: Vec<u8>,
    b: Vec<u8>,
}

impl Neighborhood {
    fn with_capacity(capacity: usize) -> Self {
        Neighborhood {
            r: Vec::with_capacity(capacity),
            g: Vec::with_capacity(capacity),
            b: Vec::with_capacity(capacity),
        }
    }

    fn clear(&mut self) {
        self.r.clear();
        self.g.clear();
        self.b.clear();
    }

    fn push(&mut self, pixel: &RGB8) {
        self.r.push(pixel.r);
        self.g.push(pixel.g);
        self.b.push(pixel.b);
    }

    fn median(&mut self) -> RGB8 {
        let mid = self.r.len() / 2;
        RGB8::new(*kth(&mut self.r, mid), *kth(&mut self.g, mid), *kth(&mut self.b, mid))
    }
}

/// Median of the `size`×`size` window centered on `(x, y)`. Coordinates past
/// the image border are clamped to the nearest edge pixel.
fn median_at(picture: &Picture<&[RGB8]>, x: u32, y: u32, half: i64, window: &mut Neighborhood) -> RGB8 {
    let max_x = picture.width() as i64 - 1;
    let max_y = picture.height() as i64 - 1;

    window.clear();
    for dx in -half..=half {
        for dy in -half..=half {
            let x2 = (x as i64 + dx).clamp(0, max_x) as u32;
            let y2 = (y as i64 + dy).clamp(0, max_y) as u32;
            window.push(picture.pixel(x2, y2));
        }
    }
    window.median()
}

/// One filter repetition. Reads only from `source` and writes a fresh buffer,
/// so no output pixel ever sees a partially filtered neighborhood.
pub fn median_filter(source: &Framebuffer<RGB8>, size: u32) -> Framebuffer<RGB8> {
    let (width, height) = source.size();
    let mut target: Framebuffer<RGB8> = Framebuffer::new(source.size());
    if width == 0 || height == 0 {
        return target;
    }

    let half = (size / 2) as i64;
    let capacity = ((2 * half + 1) * (2 * half + 1)) as usize;
    let picture = source.picture();

    target.picture_mut()
        .buffer_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let mut window = Neighborhood::with_capacity(capacity);
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = median_at(&picture, x as u32, y as u32, half, &mut window);
            }
        });

    target
}

/// Replaces `frame` with `passes` successive median filter repetitions.
pub fn denoise(frame: &mut Framebuffer<RGB8>, size: u32, passes: u32) {
    let start = Instant::now();
    for pass in 0..passes {
        *frame = median_filter(frame, size);
        debug!(target: "app", "Median pass {}/{} done", pass + 1, passes);
    }
    info!(target: "app", "Denoised {} passes of {}x{} median. Took {:?}", passes, size, size, start.elapsed());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(size: (u32, u32), value: u8) -> Framebuffer<RGB8> {
        let mut frame: Framebuffer<RGB8> = Framebuffer::new(size);
        frame.picture_mut().clear(RGB8::new(value, value, value));
        frame
    }

    #[test]
    fn test_outlier_removed() {
        let mut frame = uniform((5, 5), 100);
        *frame.picture_mut().pixel_mut(2, 2) = RGB8::new(255, 0, 255);

        let filtered = median_filter(&frame, 3);
        assert_eq!(filtered, uniform((5, 5), 100));
    }

    #[test]
    fn test_uniform_unchanged() {
        let mut frame = uniform((7, 4), 42);
        denoise(&mut frame, 5, 3);
        assert_eq!(frame, uniform((7, 4), 42));
    }

    #[test]
    fn test_zero_passes_is_identity() {
        let mut frame = uniform((3, 3), 7);
        *frame.picture_mut().pixel_mut(0, 0) = RGB8::new(1, 2, 3);
        let before = frame.clone();

        denoise(&mut frame, 5, 0);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_corner_clamps_to_edges() {
        // Channel value encodes the position: x + 3y.
        let pixels = (0..9u8).map(|v| RGB8::new(v, v, 8 - v)).collect();
        let frame = Framebuffer::from_pixels(pixels, (3, 3));

        // A 5x5 window at (0, 0) sees (0, 0) nine times and the rest of row and
        // column 0 three times each. Sorted: 0 x9, 1 x3, 2 x3, ... so rank 12 is 2.
        let filtered = median_filter(&frame, 5);
        assert_eq!(*filtered.picture().pixel(0, 0), RGB8::new(2, 2, 6));
    }

    #[test]
    fn test_channels_filtered_independently() {
        let pixels = vec![
            RGB8::new(10, 200, 0), RGB8::new(20, 100, 0), RGB8::new(30, 0, 0),
        ];
        let frame = Framebuffer::from_pixels(pixels, (3, 1));

        // Window at x = 1 with size 3 clamps rows: [10,20,30] x3 and [200,100,0] x3.
        let filtered = median_filter(&frame, 3);
        assert_eq!(*filtered.picture().pixel(1, 0), RGB8::new(20, 100, 0));
    }

    #[test]
    fn test_parallelism_does_not_change_result() {
        let pixels = (0..64u32)
            .map(|i| {
                let v = (i * 37 % 251) as u8;
                RGB8::new(v, v.wrapping_mul(3), 255 - v)
            })
            .collect();
        let frame = Framebuffer::from_pixels(pixels, (8, 8));

        let parallel = median_filter(&frame, 3);
        let single = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .expect("thread pool")
            .install(|| median_filter(&frame, 3));
        assert_eq!(parallel, single);
    }
}
