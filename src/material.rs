use crate::picture::Color;

/// Surface response of a primitive. Lights carry their radiance directly,
/// there is no separate emission scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    Diffuse { albedo: Color },
    Emissive { radiance: Color },
}

impl Material {
    pub fn diffuse(albedo: Color) -> Material {
        Material::Diffuse { albedo }
    }

    pub fn emissive(radiance: Color) -> Material {
        Material::Emissive { radiance }
    }

    /// Base color of the surface: albedo for diffuse surfaces, radiance for lights.
    pub fn color(&self) -> Color {
        match self {
            Material::Diffuse { albedo } => *albedo,
            Material::Emissive { radiance } => *radiance,
        }
    }

    pub fn is_emissive(&self) -> bool {
        matches!(self, Material::Emissive { .. })
    }
}
