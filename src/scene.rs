use float_ord::FloatOrd;
use nalgebra::point;

use crate::material::Material;
use crate::object::{HIT_RANGE, Object, Sphere, Triangle};
use crate::picture::Color;
use crate::ray::{Hit, Ray};

/// Fixed set of primitives, queried brute force.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<Object>,
}

impl Scene {
    pub fn new(objects: Vec<Object>) -> Self {
        Scene { objects }
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Closest hit beyond `EPSILON` among all primitives, if any.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        self.objects.iter()
            .filter_map(|obj| obj.hit(ray, HIT_RANGE))
            .min_by_key(|hit| FloatOrd(hit.t))
    }

    /// Closed box spanning [-1, 1]³ with an area light under the ceiling,
    /// red left wall, green right wall and a bright sphere resting near the floor.
    /// The front face is left open towards the camera.
    pub fn cornell_box() -> Self {
        let white = Material::diffuse(Color::WHITE);
        let red = Material::diffuse(Color::new(1.0, 0.0, 0.0));
        let green = Material::diffuse(Color::new(0.0, 1.0, 0.0));
        let light = Material::emissive(Color::WHITE);

        Scene::new(vec![
            Sphere::new(point![0.0, -0.7, -0.5], 0.3, Material::diffuse(Color::gray(2.0))).into(),
            // floor
            Triangle::new(point![1.0, -1.0, 1.0], point![-1.0, -1.0, -1.0], point![-1.0, -1.0, 1.0], white).into(),
            Triangle::new(point![1.0, -1.0, 1.0], point![1.0, -1.0, -1.0], point![-1.0, -1.0, -1.0], white).into(),
            // light
            Triangle::new(point![-0.5, 0.99, 0.5], point![-0.5, 0.99, -0.5], point![0.5, 0.99, 0.5], light).into(),
            Triangle::new(point![-0.5, 0.99, -0.5], point![0.5, 0.99, -0.5], point![0.5, 0.99, 0.5], light).into(),
            // ceiling
            Triangle::new(point![-1.0, 1.0, 1.0], point![-1.0, 1.0, -1.0], point![1.0, 1.0, 1.0], white).into(),
            Triangle::new(point![-1.0, 1.0, -1.0], point![1.0, 1.0, -1.0], point![1.0, 1.0, 1.0], white).into(),
            // left
            Triangle::new(point![-1.0, -1.0, -1.0], point![-1.0, 1.0, 1.0], point![-1.0, -1.0, 1.0], red).into(),
            Triangle::new(point![-1.0, -1.0, -1.0], point![-1.0, 1.0, -1.0], point![-1.0, 1.0, 1.0], red).into(),
            // right
            Triangle::new(point![1.0, 1.0, 1.0], point![1.0, -1.0, -1.0], point![1.0, -1.0, 1.0], green).into(),
            Triangle::new(point![1.0, -1.0, -1.0], point![1.0, 1.0, 1.0], point![1.0, 1.0, -1.0], green).into(),
            // back
            Triangle::new(point![1.0, -1.0, -1.0], point![-1.0, 1.0, -1.0], point![-1.0, -1.0, -1.0], white).into(),
            Triangle::new(point![1.0, -1.0, -1.0], point![1.0, 1.0, -1.0], point![-1.0, 1.0, -1.0], white).into(),
        ])
    }
}
