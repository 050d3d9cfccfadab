//! Gravitational ray marcher
//!
//! Advances each ray through the bent-light field in adaptive steps,
//! compositing semi-transparent disk samples front-to-back:
//!   color += sample * a * (1 - A);  A += a * (1 - A)
//! A ray terminates captured (inside the horizon, black) or escaped
//! (outside the escape radius, out of step budget, or opacity saturated),
//! with the sky sampled along its final direction weighted by the
//! remaining transmittance.

use crate::disk;
use crate::params::RenderParams;
use crate::physics::{self, BlackHole};
use crate::sky::{ColorMap, Cubemap};
use common::Ray;
use glam::Vec3;

/// Optical density scale converting disk opacity to extinction per unit
/// path length
const EXTINCTION: f32 = 4.0;
/// Accumulated opacity above this ends the march early; the remaining sky
/// term would be invisible.
const OPACITY_SATURATION: f32 = 0.99;

/// Terminal state of a marched ray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarchStatus {
    /// Fell below the event horizon
    Captured,
    /// Left the scene, ran out of steps, or saturated opacity
    Escaped,
}

/// Outcome of marching one ray to completion
#[derive(Debug, Clone, Copy)]
pub struct MarchResult {
    pub radiance: Vec3,
    pub opacity: f32,
    pub status: MarchStatus,
    pub steps: u32,
    /// Steps spent inside the disk volume
    pub disk_steps: u32,
    pub final_dir: Vec3,
}

/// March one ray to a terminal state. `params` must already be sanitized;
/// `time` drives the disk advection.
pub fn march_ray(
    ray: Ray,
    black_hole: &BlackHole,
    params: &RenderParams,
    sky: &Cubemap,
    ramp: &ColorMap,
    time: f32,
) -> MarchResult {
    let rs = black_hole.schwarzschild_radius;
    let march = &params.march;
    let disk_params = &params.disk;

    let mut pos = ray.origin;
    let mut dir = ray.dir.normalize();
    let mut radiance = Vec3::ZERO;
    let mut opacity = 0.0f32;
    let mut disk_steps = 0u32;

    for step in 0..march.max_steps {
        let rel = pos - black_hole.position;
        let r = rel.length();

        if r <= rs {
            return MarchResult {
                radiance,
                opacity,
                status: MarchStatus::Captured,
                steps: step,
                disk_steps,
                final_dir: dir,
            };
        }

        if r > march.escape_radius {
            return escape(radiance, opacity, step, disk_steps, dir, sky);
        }

        let mut dt = physics::step_size(r, rs, march.step_scale);
        if disk_params.enabled {
            // Refine near the slab so thin disk features are not skipped.
            let r_xz = (rel.x * rel.x + rel.z * rel.z).sqrt();
            if r_xz < disk_params.outer_radius * 1.2
                && rel.y.abs() < disk_params.half_height * 6.0
            {
                dt = dt.min((disk_params.half_height * 0.5).max(0.01));
            }

            if disk::in_disk(rel, disk_params) {
                disk_steps += 1;
                let sample = disk::shade(rel, time, disk_params, dir, rs, ramp);
                let a = 1.0 - (-sample.opacity * EXTINCTION * dt).exp();
                radiance += sample.radiance * a * (1.0 - opacity);
                opacity += a * (1.0 - opacity);

                if opacity > OPACITY_SATURATION {
                    // Fully opaque; skip the (invisible) sky term.
                    return MarchResult {
                        radiance,
                        opacity,
                        status: MarchStatus::Escaped,
                        steps: step,
                        disk_steps,
                        final_dir: dir,
                    };
                }
            }
        }

        // Bend, then advance along the averaged direction.
        let accel = physics::deflection(pos, black_hole, march.bend_strength);
        let new_dir = (dir + accel * dt).normalize();
        pos += (dir + new_dir) * 0.5 * dt;
        dir = new_dir;
    }

    // Step budget exhausted: treated exactly like escaping the scene.
    escape(radiance, opacity, march.max_steps, disk_steps, dir, sky)
}

fn escape(
    radiance: Vec3,
    opacity: f32,
    steps: u32,
    disk_steps: u32,
    dir: Vec3,
    sky: &Cubemap,
) -> MarchResult {
    MarchResult {
        radiance: radiance + sky.sample(dir) * (1.0 - opacity),
        opacity,
        status: MarchStatus::Escaped,
        steps,
        disk_steps,
        final_dir: dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MarchParams;

    fn no_disk_params() -> RenderParams {
        let mut params = RenderParams::default();
        params.disk.enabled = false;
        params.sanitized()
    }

    #[test]
    fn test_head_on_ray_is_captured() {
        let bh = BlackHole::default();
        let params = no_disk_params();
        let sky = Cubemap::black();
        let ramp = ColorMap::fallback();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 30.0), Vec3::NEG_Z);
        let result = march_ray(ray, &bh, &params, &sky, &ramp, 0.0);

        assert_eq!(result.status, MarchStatus::Captured);
        assert_eq!(result.radiance, Vec3::ZERO);
        assert_eq!(result.opacity, 0.0);
    }

    #[test]
    fn test_far_miss_escapes_nearly_straight() {
        let bh = BlackHole::default();
        let mut params = no_disk_params();
        params.march = MarchParams {
            max_steps: 4000,
            escape_radius: 2000.0,
            step_scale: 0.25,
            bend_strength: 1.0,
        }
        .sanitized();
        let sky = Cubemap::black();
        let ramp = ColorMap::fallback();

        // Impact parameter of 400 Schwarzschild radii.
        let initial_dir = Vec3::Z;
        let ray = Ray::new(Vec3::new(800.0, 0.0, -800.0), initial_dir);
        let result = march_ray(ray, &bh, &params, &sky, &ramp, 0.0);

        assert_eq!(result.status, MarchStatus::Escaped);
        assert!(result.final_dir.dot(initial_dir) > 0.998);
    }

    #[test]
    fn test_step_budget_counts_as_escape() {
        let bh = BlackHole::default();
        let mut params = no_disk_params();
        params.march.max_steps = 16;
        params.march.escape_radius = 10000.0;
        let params = params.sanitized();
        let sky = Cubemap::black();
        let ramp = ColorMap::fallback();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 30.0), Vec3::Z);
        let result = march_ray(ray, &bh, &params, &sky, &ramp, 0.0);

        assert_eq!(result.status, MarchStatus::Escaped);
        assert_eq!(result.steps, 16);
        assert_eq!(result.radiance, Vec3::ZERO);
    }

    #[test]
    fn test_disabled_disk_contributes_nothing() {
        let bh = BlackHole::default();
        let params = no_disk_params();
        let sky_color = Vec3::new(0.2, 0.4, 0.6);
        let sky = Cubemap::solid_faces([sky_color; 6], 2);
        let ramp = ColorMap::fallback();

        // Crosses the disk plane inside the annulus on its way down.
        let ray = Ray::new(Vec3::new(14.0, 10.0, 0.0), Vec3::NEG_Y);
        let result = march_ray(ray, &bh, &params, &sky, &ramp, 1.0);

        assert_eq!(result.status, MarchStatus::Escaped);
        assert_eq!(result.opacity, 0.0);
        assert_eq!(result.disk_steps, 0);
        assert!((result.radiance - sky_color).length() < 1e-5);
    }

    #[test]
    fn test_disk_accumulates_in_front_of_sky() {
        let bh = BlackHole::default();
        let params = RenderParams::default().sanitized();
        let sky = Cubemap::black();
        let ramp = ColorMap::fallback();

        let ray = Ray::new(Vec3::new(14.0, 10.0, 0.0), Vec3::NEG_Y);
        let result = march_ray(ray, &bh, &params, &sky, &ramp, 1.0);

        assert!(result.disk_steps > 0);
        assert!(result.opacity > 0.0);
        assert!(result.radiance.length() > 0.0);
    }

    #[test]
    fn test_midplane_ray_saturates_opacity() {
        let bh = BlackHole::default();
        let params = RenderParams::default().sanitized();
        let sky = Cubemap::black();
        let ramp = ColorMap::fallback();

        // Skims the midplane through the whole annulus.
        let ray = Ray::new(Vec3::new(0.0, 0.0, 30.0), Vec3::NEG_Z);
        let result = march_ray(ray, &bh, &params, &sky, &ramp, 0.5);

        assert!(result.opacity > 0.9);
        assert!(result.radiance.length() > 0.0);
    }

    #[test]
    fn test_escape_keeps_transmittance_weighting() {
        let bh = BlackHole::default();
        let params = no_disk_params();
        let sky = Cubemap::solid_faces([Vec3::ONE; 6], 2);
        let ramp = ColorMap::fallback();

        // Starts outside the escape radius; the first check escapes with
        // the full sky term since nothing has accumulated.
        let ray = Ray::new(Vec3::new(0.0, 0.0, 200.0), Vec3::Z);
        let result = march_ray(ray, &bh, &params, &sky, &ramp, 0.0);

        assert_eq!(result.status, MarchStatus::Escaped);
        assert!((result.radiance - Vec3::ONE).length() < 1e-5);
    }
}
