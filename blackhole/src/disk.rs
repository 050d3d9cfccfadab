//! Accretion disk shading model
//!
//! Evaluated at sample points the marcher finds inside the disk slab.
//! Positions are relative to the singularity; the disk lies in the y = 0
//! plane with +Y as its normal. Everything here is deterministic in
//! (position, time) so frames are reproducible.

use crate::params::DiskParams;
use crate::physics;
use crate::sky::ColorMap;
use glam::Vec3;

const LACUNARITY: f32 = 2.0;
const GAIN: f32 = 0.5;
/// Advection angle per unit time at unit radius
const ADVECTION_RATE: f32 = 8.0;

/// Radiance and opacity of one disk sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskSample {
    pub radiance: Vec3,
    pub opacity: f32,
}

impl DiskSample {
    pub const EMPTY: Self = Self {
        radiance: Vec3::ZERO,
        opacity: 0.0,
    };
}

fn hash(p: Vec3) -> f32 {
    let h = (p.x * 127.1 + p.y * 311.7 + p.z * 74.7).sin() * 43758.5453;
    h.fract().abs()
}

fn s_curve(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Trilinear value noise in [0,1]
fn value_noise(p: Vec3) -> f32 {
    let i = p.floor();
    let f = p - i;

    let u = s_curve(f.x);
    let v = s_curve(f.y);
    let w = s_curve(f.z);

    let corner = |dx: f32, dy: f32, dz: f32| hash(i + Vec3::new(dx, dy, dz));

    let x00 = corner(0.0, 0.0, 0.0) * (1.0 - u) + corner(1.0, 0.0, 0.0) * u;
    let x10 = corner(0.0, 1.0, 0.0) * (1.0 - u) + corner(1.0, 1.0, 0.0) * u;
    let x01 = corner(0.0, 0.0, 1.0) * (1.0 - u) + corner(1.0, 0.0, 1.0) * u;
    let x11 = corner(0.0, 1.0, 1.0) * (1.0 - u) + corner(1.0, 1.0, 1.0) * u;

    let y0 = x00 * (1.0 - v) + x10 * v;
    let y1 = x01 * (1.0 - v) + x11 * v;

    y0 * (1.0 - w) + y1 * w
}

/// Fractal noise with a continuous octave count: `lod` whole octaves plus
/// one more weighted by the fractional part. Normalized so the output stays
/// in [0,1] as the octave count changes.
pub fn fbm(p: Vec3, lod: f32) -> f32 {
    let lod = lod.max(1.0);
    let octaves = lod.floor() as u32;
    let partial = lod.fract();

    let mut pos = p;
    let mut amplitude = 0.5;
    let mut sum = 0.0;
    let mut norm = 0.0;

    for _ in 0..octaves {
        sum += amplitude * value_noise(pos);
        norm += amplitude;
        pos *= LACUNARITY;
        amplitude *= GAIN;
    }
    if partial > 0.0 {
        sum += partial * amplitude * value_noise(pos);
        norm += partial * amplitude;
    }

    sum / norm.max(1e-6)
}

/// Is the point inside the disk slab (radial annulus x vertical extent)?
pub fn in_disk(pos: Vec3, disk: &DiskParams) -> bool {
    if pos.y.abs() > disk.half_height {
        return false;
    }
    let r = (pos.x * pos.x + pos.z * pos.z).sqrt();
    r >= disk.inner_radius && r <= disk.outer_radius
}

/// Rotate a sample about +Y by the Keplerian advection angle for its
/// radius. Faster near the center, producing shear over time.
pub(crate) fn advect(pos: Vec3, time: f32, speed: f32) -> Vec3 {
    let r = (pos.x * pos.x + pos.z * pos.z).sqrt().max(1e-4);
    let angle = speed * time * ADVECTION_RATE / r;
    let (sin, cos) = angle.sin_cos();
    Vec3::new(
        cos * pos.x - sin * pos.z,
        pos.y,
        sin * pos.x + cos * pos.z,
    )
}

fn doppler_boost(beta: f32, mu: f32) -> f32 {
    let beta = beta.clamp(0.0, 0.95);
    let gamma = 1.0 / (1.0 - beta * beta).sqrt();
    let delta = 1.0 / (gamma * (1.0 - beta * mu).max(0.05));
    (delta * delta * delta).clamp(0.2, 5.0)
}

/// Shade one sample inside the disk volume.
///
/// `pos` is relative to the singularity, `ray_dir` is the marching
/// direction at the sample (used for the Doppler term), `rs` the
/// Schwarzschild radius. Returns zero outside the slab.
pub fn shade(
    pos: Vec3,
    time: f32,
    disk: &DiskParams,
    ray_dir: Vec3,
    rs: f32,
    ramp: &ColorMap,
) -> DiskSample {
    if !in_disk(pos, disk) {
        return DiskSample::EMPTY;
    }

    let r = (pos.x * pos.x + pos.z * pos.z).sqrt();
    let span = (disk.outer_radius - disk.inner_radius).max(1e-4);
    let t = ((r - disk.inner_radius) / span).clamp(0.0, 1.0);

    // Density shaping: noise modulates a radial/vertical falloff envelope.
    let noise = fbm(advect(pos, time, disk.speed) * disk.noise_scale, disk.noise_lod);
    let inner_fade = s_curve((t / 0.05).clamp(0.0, 1.0));
    let radial = (1.0 - t).powf(disk.density_h) * inner_fade;
    let vertical = (1.0 - pos.y.abs() / disk.half_height)
        .max(0.0)
        .powf(disk.density_v);
    let density = radial * vertical * (0.3 + 0.7 * noise);

    // Doppler brightening: orbital motion toward the viewer boosts,
    // away from the viewer dims.
    let beta = physics::orbital_beta(r, rs);
    let tangent = Vec3::new(-pos.z, 0.0, pos.x) / r.max(1e-4);
    let mu = tangent.dot(-ray_dir);
    let boost = doppler_boost(beta, mu);

    let ramp_t = (density * boost * 0.5).clamp(0.0, 1.0);
    let radiance = ramp.sample(ramp_t) * density * boost * disk.lit * disk.particle;

    DiskSample {
        radiance,
        opacity: density.clamp(0.0, 1.0),
    }
}
