use nalgebra::{Point3, Vector3};

use crate::material::Material;

#[derive(Clone, Debug)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Surface interaction found by a ray query. `normal` is always unit length and
/// geometric; `material` is copied from the primitive that was hit.
#[derive(Clone, Debug)]
pub struct Hit {
    pub point: Point3<f32>,
    pub normal: Vector3<f32>,
    pub material: Material,
    pub t: f32,
}
