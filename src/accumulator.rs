use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::denoise::denoise;
use crate::framebuffer::Framebuffer;
use crate::material::Material;
use crate::picture::{Color, RGB8};
use crate::ray::Ray;
use crate::render::{scatter, trace};
use crate::scene::Scene;
use crate::settings::RenderSettings;

/// Progressive renderer state: adds one sample per pixel per pass into an
/// 8-bit framebuffer until the sample budget is spent.
pub struct Accumulator {
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
    frame: Framebuffer<RGB8>,
    samples: u32,
    denoised: bool,
}

impl Accumulator {
    pub fn new(scene: Scene, settings: RenderSettings) -> Self {
        let camera = Camera::new(settings.eye, settings.image_plane);
        let frame = Framebuffer::new(settings.size());

        Accumulator {
            scene,
            camera,
            settings,
            frame,
            samples: 0,
            denoised: false,
        }
    }

    pub fn frame(&self) -> &Framebuffer<RGB8> {
        &self.frame
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Passes accumulated so far.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn is_complete(&self) -> bool {
        self.samples >= self.settings.samples
    }

    pub fn is_denoised(&self) -> bool {
        self.denoised
    }

    /// Integer percentage of the sample budget already accumulated.
    pub fn progress_percent(&self) -> u32 {
        if self.settings.samples == 0 {
            return 100;
        }
        (self.samples.min(self.settings.samples) as u64 * 100 / self.settings.samples as u64) as u32
    }

    /// Unweighted single-sample color seen along a primary ray.
    pub fn estimate(&self, ray: &Ray) -> Color {
        shade(&self.scene, ray, self.settings.max_depth, 1.0)
    }

    /// Accumulates one sample into every pixel. Rows are rendered in parallel,
    /// each worker owning its rows exclusively.
    pub fn pass(&mut self) {
        if self.is_complete() {
            return;
        }

        let start = Instant::now();
        let brightness = self.settings.brightness();
        let max_depth = self.settings.max_depth;
        let (width, height) = self.frame.size();
        let scene = &self.scene;
        let camera = &self.camera;

        if width > 0 {
            self.frame.picture_mut()
                .buffer_mut()
                .par_chunks_mut(width as usize)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, pixel) in row.iter_mut().enumerate() {
                        let ray = camera.ray(x as u32, y as u32, width, height);
                        pixel.accumulate(shade(scene, &ray, max_depth, brightness));
                    }
                });
        }
        self.samples += 1;

        debug!(target: "app", "Sample {}/{} took {:?}", self.samples, self.settings.samples, start.elapsed());
        if self.is_complete() {
            info!(target: "app", "Sample budget of {} reached", self.settings.samples);
        }
    }

    /// Applies the median filter repetitions. Only the first call after the
    /// budget is spent has an effect.
    pub fn denoise(&mut self) {
        if self.denoised || !self.is_complete() {
            return;
        }
        denoise(&mut self.frame, self.settings.median_size, self.settings.median_passes);
        self.denoised = true;
    }
}

/// Color of one camera sample. Lights are returned as is; diffuse surfaces
/// bounce once from the exact hit point, without the normal offset used deeper
/// in the path, and are scaled by `brightness`.
fn shade(scene: &Scene, ray: &Ray, max_depth: u32, brightness: f32) -> Color {
    let hit = match scene.nearest_hit(ray) {
        Some(hit) => hit,
        None => return Color::BLACK,
    };

    match hit.material {
        Material::Emissive { radiance } => radiance,
        Material::Diffuse { albedo } => {
            let bounce = scatter(&hit, 0.0);
            albedo * trace(&bounce, scene, 0, max_depth) * brightness
        }
    }
}
