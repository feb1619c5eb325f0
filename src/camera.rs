use nalgebra::{point, Point3};

use crate::ray::Ray;

/// Pinhole camera looking down -z through a [-1, 1]² image plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Absolute z of the image plane, ahead of `position`.
    pub image_plane: f32,
}

impl Camera {
    pub fn new(position: Point3<f32>, image_plane: f32) -> Self {
        Camera {
            position,
            image_plane,
        }
    }

    /// Primary ray through pixel `(x, y)`. Row 0 maps to the bottom edge of the plane.
    pub fn ray(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let i = 2.0 * x as f32 / width as f32 - 1.0;
        let j = 2.0 * y as f32 / height as f32 - 1.0;
        let target = point![i, j, self.image_plane];

        Ray::new(self.position, (target - self.position).normalize())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::vector;

    use super::*;

    #[test]
    fn test_corner_ray() {
        let camera = Camera::new(point![0.0, 0.0, 5.0], 1.2);
        let ray = camera.ray(0, 0, 768, 768);

        let expected = vector![-1.0, -1.0, -3.8].normalize();
        assert!((ray.direction - expected).magnitude() < 1e-6);
        assert_eq!(ray.origin, point![0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_center_ray() {
        let camera = Camera::new(point![0.0, 0.0, 5.0], 1.2);
        let ray = camera.ray(2, 2, 4, 4);

        assert!((ray.direction - vector![0.0, 0.0, -1.0]).magnitude() < 1e-6);
    }
}
