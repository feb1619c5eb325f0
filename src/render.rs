use std::iter::repeat_with;

use nalgebra::{vector, Vector3};

use crate::material::Material;
use crate::picture::Color;
use crate::ray::{Hit, Ray};
use crate::scene::Scene;

/// Distance a bounce origin is pushed along the normal inside the recursion.
pub const BOUNCE_OFFSET: f32 = 0.001;

/// Uniform in [0, 1). Draws from a thread-local generator.
pub fn random() -> f32 {
    fastrand::f32()
}

pub fn random_vec() -> Vector3<f32> {
    vector![random() * 2.0 - 1.0, random() * 2.0 - 1.0, random() * 2.0 - 1.0]
}

pub fn random_vec_in_unit_sphere() -> Vector3<f32> {
    repeat_with(random_vec)
        .find(|vec| vec.magnitude_squared() < 1.0 && vec.magnitude_squared() > 1e-12)
        .expect("infinite iterator")
}

/// Uniformly distributed point on the unit sphere.
pub fn random_unit_vec() -> Vector3<f32> {
    random_vec_in_unit_sphere().normalize()
}

/// Bounce direction biased towards `normal`: a random unit vector added to the
/// normal, renormalized. Never points below the surface.
pub fn random_direction(normal: &Vector3<f32>) -> Vector3<f32> {
    (random_unit_vec() + normal).normalize()
}

/// Diffuse bounce leaving `hit`, starting `offset` above the surface.
pub fn scatter(hit: &Hit, offset: f32) -> Ray {
    Ray::new(hit.point + hit.normal * offset, random_direction(&hit.normal))
}

/// Radiance arriving along `ray`, estimated with a single random path.
///
/// Lights return their stored color. Diffuse surfaces weight the next bounce by
/// their albedo times the cosine between the incoming ray and the normal; a
/// surface seen from behind contributes nothing.
pub fn trace(ray: &Ray, scene: &Scene, depth: u32, max_depth: u32) -> Color {
    if depth > max_depth {
        return Color::BLACK;
    }

    let hit = match scene.nearest_hit(ray) {
        Some(hit) => hit,
        None => return Color::BLACK,
    };

    let albedo = match hit.material {
        Material::Emissive { radiance } => return radiance,
        Material::Diffuse { albedo } => albedo,
    };

    let cosine = (-ray.direction).dot(&hit.normal);
    if cosine <= 0.0 {
        return Color::BLACK;
    }

    let scattered = scatter(&hit, BOUNCE_OFFSET);
    (cosine * albedo) * trace(&scattered, scene, depth + 1, max_depth)
}

#[cfg(test)]
mod tests {
    use nalgebra::{point, Point3};

    use super::*;
    use crate::object::{Sphere, Triangle};

    fn enclosing_light(radiance: Color) -> Sphere {
        Sphere::new(Point3::origin(), 100.0, Material::emissive(radiance))
    }

    fn floor(y: f32, albedo: Color) -> Triangle {
        Triangle::new(
            point![-50.0, y, -50.0],
            point![0.0, y, 50.0],
            point![50.0, y, -50.0],
            Material::diffuse(albedo),
        )
    }

    #[test]
    fn test_random_direction_hemisphere() {
        let normal = vector![0.0, 0.0, 1.0];
        for _ in 0..1000 {
            let dir = random_direction(&normal);
            assert!((dir.magnitude() - 1.0).abs() < 1e-5);
            assert!(dir.dot(&normal) >= -1e-6);
        }
    }

    #[test]
    fn test_random_unit_vec_mean() {
        let n = 20_000;
        let sum: Vector3<f32> = repeat_with(random_unit_vec).take(n).sum();
        assert!((sum / n as f32).magnitude() < 0.05);
    }

    #[test]
    fn test_depth_exceeded_is_black() {
        let scene = Scene::new(vec![enclosing_light(Color::WHITE).into()]);
        let ray = Ray::new(Point3::origin(), vector![0.0, 1.0, 0.0]);

        assert_eq!(trace(&ray, &scene, 6, 5), Color::BLACK);
        assert_eq!(trace(&ray, &scene, 5, 5), Color::WHITE);
    }

    #[test]
    fn test_miss_is_black() {
        let scene = Scene::default();
        let ray = Ray::new(Point3::origin(), vector![0.0, 1.0, 0.0]);
        assert_eq!(trace(&ray, &scene, 0, 5), Color::BLACK);
    }

    #[test]
    fn test_emissive_returns_stored_color() {
        let radiance = Color::new(0.3, 0.6, 0.9);
        let scene = Scene::new(vec![enclosing_light(radiance).into()]);

        for (depth, direction) in [(0, vector![0.0, 1.0, 0.0]), (3, vector![1.0, -2.0, 0.5])] {
            let ray = Ray::new(point![1.0, 2.0, 3.0], direction.normalize());
            assert_eq!(trace(&ray, &scene, depth, 5), radiance);
        }
    }

    #[test]
    fn test_back_facing_is_black() {
        // Seen from below, the floor normal points away from the viewer.
        let scene = Scene::new(vec![
            floor(0.0, Color::WHITE).into(),
            enclosing_light(Color::WHITE).into(),
        ]);
        let ray = Ray::new(point![0.0, -1.0, 0.0], vector![0.0, 1.0, 0.0]);
        assert_eq!(trace(&ray, &scene, 0, 5), Color::BLACK);
    }

    #[test]
    fn test_diffuse_under_uniform_light() {
        let scene = Scene::new(vec![
            floor(0.0, Color::new(0.5, 0.25, 1.0)).into(),
            enclosing_light(Color::WHITE).into(),
        ]);
        // Incoming at 60 degrees from the normal: cosine 0.5.
        let direction = vector![3.0f32.sqrt(), -1.0, 0.0].normalize();
        let ray = Ray::new(Point3::origin() - direction, direction);

        let radiance = trace(&ray, &scene, 0, 5);
        assert!((radiance.r - 0.25).abs() < 1e-4);
        assert!((radiance.g - 0.125).abs() < 1e-4);
        assert!((radiance.b - 0.5).abs() < 1e-4);
    }
}
