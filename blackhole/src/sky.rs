//! Skybox cubemap and 1D color ramp
//!
//! Face order is +X, -X, +Y, -Y, +Z, -Z, loaded from files named
//! right/left/top/bottom/front/back. Missing assets degrade to generated
//! fallbacks (a seeded starfield, a built-in blackbody-style ramp) instead
//! of failing the frame.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

const FACE_FILES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

fn srgb_to_linear(byte: u8) -> f32 {
    (byte as f32 / 255.0).powf(2.2)
}

/// One cubemap face, linear RGB, row-major from the top-left
struct Face {
    pixels: Vec<Vec3>,
    size: u32,
}

impl Face {
    fn solid(color: Vec3, size: u32) -> Self {
        Self {
            pixels: vec![color; (size * size) as usize],
            size,
        }
    }

    fn fetch(&self, x: u32, y: u32) -> Vec3 {
        let x = x.min(self.size - 1);
        let y = y.min(self.size - 1);
        self.pixels[(y * self.size + x) as usize]
    }

    /// Bilinear sample at face coordinates in [0,1]
    fn sample(&self, s: f32, t: f32) -> Vec3 {
        let fx = (s.clamp(0.0, 1.0) * (self.size - 1) as f32).max(0.0);
        let fy = (t.clamp(0.0, 1.0) * (self.size - 1) as f32).max(0.0);
        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let dx = fx - x0 as f32;
        let dy = fy - y0 as f32;

        let top = self.fetch(x0, y0).lerp(self.fetch(x0 + 1, y0), dx);
        let bottom = self.fetch(x0, y0 + 1).lerp(self.fetch(x0 + 1, y0 + 1), dx);
        top.lerp(bottom, dy)
    }
}

/// Six-face environment map sampled by direction
pub struct Cubemap {
    faces: [Face; 6],
}

impl Cubemap {
    /// All-black placeholder; lookups against it contribute nothing.
    pub fn black() -> Self {
        Self::solid_faces([Vec3::ZERO; 6], 1)
    }

    pub(crate) fn solid_faces(colors: [Vec3; 6], size: u32) -> Self {
        Self {
            faces: colors.map(|c| Face::solid(c, size)),
        }
    }

    /// Load six faces from `dir`, e.g. assets/skybox/right.png. Faces with
    /// a resolution different from the first are resized to match.
    pub fn load(dir: &Path) -> Result<Self, image::ImageError> {
        let mut faces = Vec::with_capacity(6);
        let mut size = 0u32;

        for name in FACE_FILES {
            let path = dir.join(format!("{name}.png"));
            let img = image::open(&path)?.to_rgba8();
            let img = if size == 0 || img.dimensions() == (size, size) {
                size = img.width().min(img.height());
                if img.width() != img.height() {
                    log::warn!("skybox face {name} is not square, cropping to {size}");
                    image::imageops::resize(&img, size, size, image::imageops::FilterType::Triangle)
                } else {
                    img
                }
            } else {
                log::warn!("skybox face {name} resized to match {size}x{size}");
                image::imageops::resize(&img, size, size, image::imageops::FilterType::Triangle)
            };

            let pixels = img
                .pixels()
                .map(|p| {
                    Vec3::new(
                        srgb_to_linear(p.0[0]),
                        srgb_to_linear(p.0[1]),
                        srgb_to_linear(p.0[2]),
                    )
                })
                .collect();
            faces.push(Face { pixels, size });
        }

        let faces: [Face; 6] = faces
            .try_into()
            .unwrap_or_else(|_| unreachable!("exactly six faces pushed"));
        Ok(Self { faces })
    }

    /// Load from disk, or fall back to a generated starfield.
    pub fn load_or_fallback(dir: &Path, seed: u64) -> Self {
        match Self::load(dir) {
            Ok(cubemap) => {
                log::info!("loaded skybox from {}", dir.display());
                cubemap
            }
            Err(e) => {
                log::warn!(
                    "skybox not loaded from {} ({e}); using generated starfield",
                    dir.display()
                );
                Self::starfield(512, 2500, seed)
            }
        }
    }

    /// Procedural star background: sparse white-to-warm points over black.
    pub fn starfield(size: u32, star_count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut faces: Vec<Face> = (0..6).map(|_| Face::solid(Vec3::ZERO, size)).collect();

        let warm = Vec3::new(1.0, 0.85, 0.7);
        let cool = Vec3::new(0.7, 0.8, 1.0);

        for _ in 0..star_count {
            let face = rng.gen_range(0..6);
            let x = rng.gen_range(0..size);
            let y = rng.gen_range(0..size);
            let brightness = 0.3 + rng.gen::<f32>() * 0.7;
            let tint = warm.lerp(cool, rng.gen::<f32>());
            let color = tint * brightness;

            let idx = (y * size + x) as usize;
            let face = &mut faces[face];
            face.pixels[idx] = face.pixels[idx].max(color);
            // A dim halo texel to the right keeps lone stars from aliasing
            // away at reduced render scale.
            if x + 1 < size {
                face.pixels[idx + 1] = face.pixels[idx + 1].max(color * 0.25);
            }
        }

        let faces: [Face; 6] = faces
            .try_into()
            .unwrap_or_else(|_| unreachable!("exactly six faces generated"));
        Self { faces }
    }

    /// Sample along a direction using major-axis face selection.
    pub fn sample(&self, dir: Vec3) -> Vec3 {
        let ax = dir.x.abs();
        let ay = dir.y.abs();
        let az = dir.z.abs();

        let (face, u, v, ma) = if ax >= ay && ax >= az {
            if dir.x > 0.0 {
                (0, -dir.z, -dir.y, ax)
            } else {
                (1, dir.z, -dir.y, ax)
            }
        } else if ay >= az {
            if dir.y > 0.0 {
                (2, dir.x, dir.z, ay)
            } else {
                (3, dir.x, -dir.z, ay)
            }
        } else if dir.z > 0.0 {
            (4, dir.x, -dir.y, az)
        } else {
            (5, -dir.x, -dir.y, az)
        };

        if ma <= 0.0 {
            return Vec3::ZERO;
        }

        let s = (u / ma + 1.0) / 2.0;
        let t = (v / ma + 1.0) / 2.0;
        self.faces[face].sample(s, t)
    }
}

/// 1D emission color ramp sampled with clamped linear interpolation
pub struct ColorMap {
    colors: Vec<Vec3>,
}

impl ColorMap {
    /// Load the first row of an image as the ramp.
    pub fn load(path: &Path) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        let colors = (0..img.width())
            .map(|x| {
                let p = img.get_pixel(x, 0).0;
                Vec3::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();
        Ok(Self { colors })
    }

    pub fn load_or_fallback(path: &Path) -> Self {
        match Self::load(path) {
            Ok(map) => {
                log::info!("loaded color ramp from {}", path.display());
                map
            }
            Err(e) => {
                log::warn!(
                    "color ramp not loaded from {} ({e}); using built-in ramp",
                    path.display()
                );
                Self::fallback()
            }
        }
    }

    /// Built-in blackbody-style ramp: dark red through orange to
    /// blue-tinged white, brightness strictly increasing.
    pub fn fallback() -> Self {
        let stops = [
            (0.0, Vec3::new(0.02, 0.0, 0.0)),
            (0.25, Vec3::new(0.45, 0.08, 0.01)),
            (0.5, Vec3::new(1.0, 0.45, 0.1)),
            (0.75, Vec3::new(1.35, 1.05, 0.55)),
            (1.0, Vec3::new(1.6, 1.5, 1.45)),
        ];

        let count = 64;
        let colors = (0..count)
            .map(|i| {
                let t = i as f32 / (count - 1) as f32;
                let after = stops.iter().position(|(st, _)| *st >= t).unwrap_or(4);
                if after == 0 {
                    stops[0].1
                } else {
                    let (t0, c0) = stops[after - 1];
                    let (t1, c1) = stops[after];
                    c0.lerp(c1, (t - t0) / (t1 - t0).max(1e-6))
                }
            })
            .collect();
        Self { colors }
    }

    /// Sample at t in [0,1]; out-of-range t clamps to the ends.
    pub fn sample(&self, t: f32) -> Vec3 {
        if self.colors.is_empty() {
            return Vec3::ZERO;
        }
        if self.colors.len() == 1 {
            return self.colors[0];
        }
        let f = t.clamp(0.0, 1.0) * (self.colors.len() - 1) as f32;
        let i = (f.floor() as usize).min(self.colors.len() - 2);
        self.colors[i].lerp(self.colors[i + 1], f - i as f32)
    }
}
