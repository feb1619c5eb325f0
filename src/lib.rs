//! Progressive CPU path tracer for a closed box lit by an area light.
//!
//! Every pass adds one sample per pixel into an 8-bit framebuffer; once the
//! sample budget is spent the image is median filtered. Geometry is tested brute
//! force, rows are rendered in parallel with rayon.

pub mod accumulator;
pub mod camera;
pub mod denoise;
pub mod driver;
pub mod framebuffer;
pub mod gpu;
pub mod material;
pub mod object;
pub mod picture;
pub mod ray;
pub mod render;
pub mod scene;
pub mod settings;
