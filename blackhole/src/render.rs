//! Per-frame orchestration
//!
//! Owns the HDR buffers and runs the pipeline: snapshot parameters once,
//! derive the ray basis, march every pixel in parallel (writing radiance
//! and bright-pass outputs together), blur, composite to display RGBA.
//! Stages run strictly in sequence; each rayon pass joins before the next
//! starts.

use crate::marcher::{self, MarchStatus};
use crate::params::RenderParams;
use crate::physics::BlackHole;
use crate::post::{self, GaussianKernel, HdrBuffer};
use crate::sky::{ColorMap, Cubemap};
use common::OrbitCamera;
use glam::Vec3;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Aggregate counters from the last scene pass
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub total_rays: u32,
    pub captured: u32,
    pub disk_rays: u32,
    /// Mean march steps per primary ray
    pub mean_steps: f32,
}

pub struct FrameRenderer {
    width: usize,
    height: usize,
    scene: HdrBuffer,
    bright: HdrBuffer,
    ping: HdrBuffer,
    pong: HdrBuffer,
    ldr: Vec<[u8; 4]>,
    kernel: GaussianKernel,
    stats: FrameStats,
}

impl FrameRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            scene: HdrBuffer::new(width, height),
            bright: HdrBuffer::new(width, height),
            ping: HdrBuffer::new(width, height),
            pong: HdrBuffer::new(width, height),
            ldr: vec![[0; 4]; width * height],
            kernel: GaussianKernel::default(),
            stats: FrameStats::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate every buffer for a new march resolution
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.scene.resize(width, height);
        self.bright.resize(width, height);
        self.ping.resize(width, height);
        self.pong.resize(width, height);
        self.ldr = vec![[0; 4]; width * height];
        log::debug!("frame buffers resized to {}x{}", width, height);
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Render one frame and return the display RGBA pixels, row-major from
    /// the top-left. `samples` above 1 averages jittered sub-pixel rays.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        camera: &OrbitCamera,
        black_hole: &BlackHole,
        params: &RenderParams,
        sky: &Cubemap,
        ramp: &ColorMap,
        time: f32,
        samples: u32,
    ) -> &[[u8; 4]] {
        // The single per-frame parameter read point.
        let params = params.sanitized();
        let samples = samples.clamp(1, 64);

        let width = self.width;
        let height = self.height;
        let basis = camera.ray_basis(width as f32 / height as f32);
        let threshold = params.post.bloom_threshold;

        let captured = AtomicU32::new(0);
        let disk_rays = AtomicU32::new(0);
        let total_steps = AtomicU64::new(0);

        self.scene
            .pixels
            .par_iter_mut()
            .zip(self.bright.pixels.par_iter_mut())
            .enumerate()
            .for_each(|(i, (scene_px, bright_px))| {
                let x = (i % width) as f32;
                let y = (i / width) as f32;

                let mut radiance = Vec3::ZERO;
                for s in 0..samples {
                    let (jx, jy) = sample_offset(s, samples);
                    let u = (x + jx) / width as f32;
                    // Buffer row 0 is the top of the image; v points up.
                    let v = 1.0 - (y + jy) / height as f32;

                    let result =
                        marcher::march_ray(basis.ray(u, v), black_hole, &params, sky, ramp, time);
                    radiance += result.radiance;

                    if s == 0 {
                        if result.status == MarchStatus::Captured {
                            captured.fetch_add(1, Ordering::Relaxed);
                        }
                        if result.disk_steps > 0 {
                            disk_rays.fetch_add(1, Ordering::Relaxed);
                        }
                        total_steps.fetch_add(result.steps as u64, Ordering::Relaxed);
                    }
                }

                let radiance = radiance / samples as f32;
                *scene_px = radiance;
                *bright_px = post::bright_value(radiance, threshold);
            });

        let total_rays = (width * height) as u32;
        self.stats = FrameStats {
            total_rays,
            captured: captured.load(Ordering::Relaxed),
            disk_rays: disk_rays.load(Ordering::Relaxed),
            mean_steps: total_steps.load(Ordering::Relaxed) as f32 / total_rays.max(1) as f32,
        };

        let blurred = post::gaussian_blur(
            &self.bright,
            &mut self.ping,
            &mut self.pong,
            &self.kernel,
            params.post.blur_passes,
        );
        post::composite_into(&self.scene, blurred, &params.post, &mut self.ldr);

        &self.ldr
    }
}

/// Deterministic sub-pixel offsets: pixel center for one sample, an R2
/// low-discrepancy sequence otherwise.
fn sample_offset(s: u32, samples: u32) -> (f32, f32) {
    if samples <= 1 {
        return (0.5, 0.5);
    }
    let n = s as f32 + 0.5;
    ((n * 0.754_877_7).fract(), (n * 0.569_840_3).fract())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn quick_params() -> RenderParams {
        let mut params = RenderParams::default();
        params.march.max_steps = 64;
        params.disk.enabled = false;
        params
    }

    #[test]
    fn test_render_fills_ldr_buffer() {
        let mut renderer = FrameRenderer::new(16, 12);
        let camera = OrbitCamera::default();
        let bh = BlackHole::default();
        let sky = Cubemap::solid_faces([Vec3::splat(0.5); 6], 2);
        let ramp = ColorMap::fallback();

        let frame = renderer.render(&camera, &bh, &quick_params(), &sky, &ramp, 0.0, 1);
        assert_eq!(frame.len(), 16 * 12);
        // A uniform sky must light at least the rays that miss the hole.
        assert!(frame.iter().any(|p| p[0] > 0));
        assert!(frame.iter().all(|p| p[3] == 255));
    }

    #[test]
    fn test_center_pixel_is_captured() {
        // Camera on the +Z axis staring straight at the hole.
        let camera = OrbitCamera::new(Vec3::new(0.0, 0.0, 30.0), -90.0, 0.0);

        let mut renderer = FrameRenderer::new(9, 9);
        let bh = BlackHole::default();
        let sky = Cubemap::solid_faces([Vec3::ONE; 6], 2);
        let ramp = ColorMap::fallback();
        let mut params = quick_params();
        params.march.max_steps = 2000;

        let frame = renderer.render(&camera, &bh, &params, &sky, &ramp, 0.0, 1);
        let center = frame[4 * 9 + 4];
        assert_eq!(center[0], 0);
        assert_eq!(center[1], 0);
        assert_eq!(center[2], 0);
        assert!(renderer.stats().captured > 0);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut renderer = FrameRenderer::new(8, 8);
        renderer.resize(4, 6);
        assert_eq!(renderer.width(), 4);
        assert_eq!(renderer.height(), 6);

        let camera = OrbitCamera::default();
        let bh = BlackHole::default();
        let sky = Cubemap::black();
        let ramp = ColorMap::fallback();
        let frame = renderer.render(&camera, &bh, &quick_params(), &sky, &ramp, 0.0, 1);
        assert_eq!(frame.len(), 24);
    }

    #[test]
    fn test_stats_count_every_ray() {
        let mut renderer = FrameRenderer::new(6, 6);
        let camera = OrbitCamera::default();
        let bh = BlackHole::default();
        let sky = Cubemap::black();
        let ramp = ColorMap::fallback();

        renderer.render(&camera, &bh, &quick_params(), &sky, &ramp, 0.0, 1);
        let stats = renderer.stats();
        assert_eq!(stats.total_rays, 36);
        assert!(stats.mean_steps > 0.0);
        assert!(stats.captured <= stats.total_rays);
    }
}
