use std::ops::{Bound, RangeBounds};

use nalgebra::{Point3, Vector3};

use crate::material::Material;
use crate::ray::{Hit, Ray};

/// Smallest accepted ray parameter. Rejects self intersections at the origin of a bounce.
pub const EPSILON: f32 = 0.0001;

/// Valid ray parameters for scene queries: strictly beyond `EPSILON`.
pub const HIT_RANGE: (Bound<f32>, Bound<f32>) = (Bound::Excluded(EPSILON), Bound::Unbounded);

#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32, material: Material) -> Self {
        Sphere { center, radius, material }
    }

    pub fn hit<R>(&self, ray: &Ray, t_rng: R) -> Option<Hit>
        where R: RangeBounds<f32> {
        let oc = ray.origin - self.center;
        let a = ray.direction.magnitude_squared();
        if a <= f32::MIN_POSITIVE {
            return None;
        }
        let half_b = oc.dot(&ray.direction);
        let c = oc.magnitude_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant <= 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // find the nearest root that lies in the acceptable range.
        let mut root = (-half_b - sqrtd) / a;
        if !t_rng.contains(&root) {
            root = (-half_b + sqrtd) / a;
            if !t_rng.contains(&root) {
                return None;
            }
        }

        let point = ray.at(root);
        Some(Hit {
            point,
            normal: (point - self.center).normalize(),
            material: self.material,
            t: root,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub material: Material,
}

impl Triangle {
    pub fn new(v1: Point3<f32>, v2: Point3<f32>, v3: Point3<f32>, material: Material) -> Self {
        Triangle { vertices: [v1, v2, v3], material }
    }

    /// Face normal from the winding `v1 -> v2 -> v3`.
    pub fn normal(&self) -> Vector3<f32> {
        let [v1, v2, v3] = &self.vertices;
        (v2 - v1).cross(&(v3 - v1)).normalize()
    }

    /// Plane intersection followed by a same-side test against every edge.
    /// Both faces are hit; rays parallel to the plane produce a non-finite `t`
    /// and are rejected by the range and finiteness checks.
    pub fn hit<R>(&self, ray: &Ray, t_rng: R) -> Option<Hit>
        where R: RangeBounds<f32> {
        let [v1, v2, v3] = &self.vertices;
        let normal = self.normal();

        let t = (normal.dot(&v1.coords) - normal.dot(&ray.origin.coords)) / ray.direction.dot(&normal);
        if !t.is_finite() || !t_rng.contains(&t) {
            return None;
        }

        let point = ray.at(t);
        let edges = [(v1, v2), (v2, v3), (v3, v1)];
        let outside = edges.iter()
            .any(|(from, to)| (*to - *from).cross(&(point - *from)).dot(&normal) < 0.0);
        if outside {
            return None;
        }

        Some(Hit {
            point,
            normal,
            material: self.material,
            t,
        })
    }
}

/// Intersectable primitive.
#[derive(Clone, Debug)]
pub enum Object {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Object {
    pub fn hit<R>(&self, ray: &Ray, t_rng: R) -> Option<Hit>
        where R: RangeBounds<f32> {
        match self {
            Object::Sphere(sphere) => sphere.hit(ray, t_rng),
            Object::Triangle(triangle) => triangle.hit(ray, t_rng),
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Object::Sphere(sphere) => &sphere.material,
            Object::Triangle(triangle) => &triangle.material,
        }
    }
}

impl From<Sphere> for Object {
    fn from(value: Sphere) -> Self {
        Object::Sphere(value)
    }
}

impl From<Triangle> for Object {
    fn from(value: Triangle) -> Self {
        Object::Triangle(value)
    }
}
