use std::f32::consts::PI;

use nalgebra::{point, Point3};

pub const WIDTH: u32 = 768;
pub const HEIGHT: u32 = 768;
/// Sample passes accumulated before denoising.
pub const SAMPLES: u32 = 1000;
pub const MAX_DEPTH: u32 = 5;
/// Side length of the median window. Must be odd.
pub const MEDIAN_SIZE: u32 = 5;
pub const MEDIAN_PASSES: u32 = 10;
pub const EYE: Point3<f32> = point![0.0, 0.0, 5.0];
pub const IMAGE_PLANE_Z: f32 = 1.2;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub max_depth: u32,
    pub median_size: u32,
    pub median_passes: u32,
    pub eye: Point3<f32>,
    pub image_plane: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            width: WIDTH,
            height: HEIGHT,
            samples: SAMPLES,
            max_depth: MAX_DEPTH,
            median_size: MEDIAN_SIZE,
            median_passes: MEDIAN_PASSES,
            eye: EYE,
            image_plane: IMAGE_PLANE_Z,
        }
    }
}

impl RenderSettings {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Weight applied to every non-emissive sample before it is accumulated.
    pub fn brightness(&self) -> f32 {
        2.0 * PI / self.samples as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_brightness() {
        let settings = RenderSettings::default();
        assert!((settings.brightness() - 0.006_283_185).abs() < 1e-8);
        assert_eq!(settings.median_size % 2, 1);
    }
}
