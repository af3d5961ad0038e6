use anyhow::{Context, Result};
use glam::Vec3;
use image::DynamicImage;
use std::f32::consts::{FRAC_1_PI, PI};
use std::path::Path;

use crate::math::srgb_to_linear;

/// How a texture is projected when sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureMapping {
    /// Plain UV lookup
    Uv,
    /// Flat image wrapped around a sphere and sampled by reflection direction
    EquirectangularReflection,
}

/// Linear RGBA environment image used for reflections
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    /// Row-major, top row first
    texels: Vec<[f32; 4]>,
    pub mapping: TextureMapping,
    /// Solid-angle weighted mean of `texels`, taken once on construction
    average: [f32; 3],
}

impl EnvironmentMap {
    pub fn new(width: u32, height: u32, texels: Vec<[f32; 4]>) -> Self {
        debug_assert_eq!(texels.len(), (width * height) as usize);
        let average = weighted_average(width, height, &texels);
        Self {
            width,
            height,
            texels,
            mapping: TextureMapping::Uv,
            average,
        }
    }

    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }

    /// Uniform color, handy when no image is configured
    pub fn solid(color: [f32; 3]) -> Self {
        let mut map = Self::new(1, 1, vec![[color[0], color[1], color[2], 1.0]]);
        map.mapping = TextureMapping::EquirectangularReflection;
        map
    }

    /// Image-space coordinates (origin top-left) of a world direction
    pub fn direction_to_uv(direction: Vec3) -> (f32, f32) {
        let dir = direction.normalize_or_zero();
        let u = dir.z.atan2(dir.x) * (0.5 * FRAC_1_PI) + 0.5;
        let v = dir.y.clamp(-1.0, 1.0).asin() * FRAC_1_PI + 0.5;
        (u, 1.0 - v)
    }

    /// Nearest texel in the given direction
    pub fn sample(&self, direction: Vec3) -> [f32; 4] {
        let (u, v) = Self::direction_to_uv(direction);
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.texels[(y * self.width + x) as usize]
    }

    /// Average radiance, used as a cheap diffuse term
    pub fn average(&self) -> [f32; 3] {
        self.average
    }
}

/// Mean radiance with rows weighted by solid angle so the poles do not dominate
fn weighted_average(width: u32, height: u32, texels: &[[f32; 4]]) -> [f32; 3] {
    if texels.is_empty() || width == 0 {
        return [0.0; 3];
    }

    let mut sum = [0.0f32; 3];
    let mut weight_sum = 0.0f32;
    for (row, chunk) in texels.chunks(width as usize).enumerate() {
        let latitude = ((row as f32 + 0.5) / height as f32 - 0.5) * PI;
        let weight = latitude.cos();
        for texel in chunk {
            sum[0] += texel[0] * weight;
            sum[1] += texel[1] * weight;
            sum[2] += texel[2] * weight;
            weight_sum += weight;
        }
    }

    sum.map(|channel| channel / weight_sum.max(f32::EPSILON))
}

/// Loads an equirectangular environment image for reflections
///
/// Radiance `.hdr` and OpenEXR files are taken as linear; 8-bit formats are sRGB decoded.
pub fn load_environment(path: impl AsRef<Path>) -> Result<EnvironmentMap> {
    let path = path.as_ref();
    log::info!("Loading environment map: {:?}", path);

    let image = image::open(path).context(format!("Failed to load environment map: {:?}", path))?;
    let linear = matches!(image, DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_));
    let rgba = image.into_rgba32f();
    let (width, height) = rgba.dimensions();

    let texels = rgba
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0;
            if linear {
                [r, g, b, a]
            } else {
                [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
            }
        })
        .collect();

    let mut map = EnvironmentMap::new(width, height, texels);
    map.mapping = TextureMapping::EquirectangularReflection;

    log::info!("Environment map loaded: {}x{}", width, height);
    Ok(map)
}
