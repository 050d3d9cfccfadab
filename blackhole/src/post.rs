//! HDR post-processing: bright-pass, separable Gaussian blur, composite
//!
//! Buffers are linear RGB floats at the march resolution. Blur passes are
//! pixel-parallel; the sequential pass loop is the full-buffer barrier
//! between them. The composite maps HDR radiance to display RGBA.

use crate::params::PostParams;
use glam::Vec3;
use rayon::prelude::*;

/// Float RGB image, row-major from the top-left
#[derive(Debug, Clone)]
pub struct HdrBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Vec3>,
}

impl HdrBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; width * height],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    pub fn fill(&mut self, color: Vec3) {
        self.pixels.fill(color);
    }

    /// Fetch with coordinates clamped to the edges
    fn fetch_clamped(&self, x: isize, y: isize) -> Vec3 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.pixels[y * self.width + x]
    }
}

/// Rec. 709 luminance
pub fn luminance(c: Vec3) -> f32 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

/// Bright-pass a single pixel: pass it through when its luminance
/// exceeds `threshold`, black otherwise.
pub fn bright_value(c: Vec3, threshold: f32) -> Vec3 {
    if luminance(c) > threshold {
        c
    } else {
        Vec3::ZERO
    }
}

/// 1D blur kernel with weights normalized to sum 1
#[derive(Debug, Clone)]
pub struct GaussianKernel {
    pub weights: Vec<f32>,
    pub radius: usize,
}

impl GaussianKernel {
    pub fn new(radius: usize, sigma: f32) -> Self {
        let mut weights = vec![0.0f32; radius * 2 + 1];
        let s2 = 2.0 * sigma.max(1e-3) * sigma.max(1e-3);
        let mut sum = 0.0;
        for (i, w) in weights.iter_mut().enumerate() {
            let x = i as isize - radius as isize;
            let value = (-((x * x) as f32) / s2).exp();
            *w = value;
            sum += value;
        }
        for w in weights.iter_mut() {
            *w /= sum.max(1e-6);
        }
        Self { weights, radius }
    }
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self::new(4, 1.75)
    }
}

/// One 1D blur pass along the given axis, edges clamped
pub fn blur_pass(src: &HdrBuffer, dst: &mut HdrBuffer, kernel: &GaussianKernel, horizontal: bool) {
    debug_assert_eq!(src.pixels.len(), dst.pixels.len());
    let width = src.width;
    let radius = kernel.radius as isize;

    dst.pixels.par_iter_mut().enumerate().for_each(|(i, out)| {
        let x = (i % width) as isize;
        let y = (i / width) as isize;
        let mut acc = Vec3::ZERO;
        for (k, weight) in kernel.weights.iter().enumerate() {
            let offset = k as isize - radius;
            let sample = if horizontal {
                src.fetch_clamped(x + offset, y)
            } else {
                src.fetch_clamped(x, y + offset)
            };
            acc += sample * *weight;
        }
        *out = acc;
    });
}

/// Run `passes` alternating horizontal/vertical blur passes over the
/// ping-pong pair, the first pass reading `bright`. Returns the buffer
/// holding the final result; zero passes feeds `bright` through untouched.
pub fn gaussian_blur<'a>(
    bright: &'a HdrBuffer,
    ping: &'a mut HdrBuffer,
    pong: &'a mut HdrBuffer,
    kernel: &GaussianKernel,
    passes: u32,
) -> &'a HdrBuffer {
    if passes == 0 {
        return bright;
    }

    blur_pass(bright, ping, kernel, true);
    let mut result_in_ping = true;

    for pass in 1..passes {
        let horizontal = pass % 2 == 0;
        if result_in_ping {
            blur_pass(ping, pong, kernel, horizontal);
        } else {
            blur_pass(pong, ping, kernel, horizontal);
        }
        result_in_ping = !result_in_ping;
    }

    if result_in_ping {
        ping
    } else {
        pong
    }
}

fn tonemap_exposure(c: Vec3, strength: f32) -> Vec3 {
    Vec3::ONE - (-c * strength).exp()
}

/// Combine base radiance with the blurred bright buffer and map to
/// display RGBA. Bloom, tonemap and gamma are each independently gated.
pub fn composite_into(
    scene: &HdrBuffer,
    blurred: &HdrBuffer,
    post: &PostParams,
    out: &mut [[u8; 4]],
) {
    debug_assert_eq!(scene.pixels.len(), out.len());
    debug_assert_eq!(blurred.pixels.len(), out.len());

    out.par_iter_mut().enumerate().for_each(|(i, pixel)| {
        let mut c = scene.pixels[i];
        if post.bloom_enabled {
            c += blurred.pixels[i] * post.bloom_strength;
        }
        if post.tonemap_enabled {
            c = tonemap_exposure(c, post.tonemap_strength);
        }
        c = c.max(Vec3::ZERO);
        if post.gamma_enabled {
            c = c.powf(1.0 / post.gamma);
        }
        let c = c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
        *pixel = [
            c.x.round() as u8,
            c.y.round() as u8,
            c.z.round() as u8,
            255,
        ];
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_buffer(width: usize, height: usize) -> HdrBuffer {
        let mut buf = HdrBuffer::new(width, height);
        for (i, p) in buf.pixels.iter_mut().enumerate() {
            let t = i as f32 / (width * height) as f32;
            *p = Vec3::new(t * 2.0, (1.0 - t) * 0.5, (t * 7.3).sin().abs());
        }
        buf
    }

    #[test]
    fn test_kernel_weights_sum_to_one() {
        for (radius, sigma) in [(2, 1.0), (4, 1.75), (10, 6.0)] {
            let kernel = GaussianKernel::new(radius, sigma);
            let sum: f32 = kernel.weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
            assert_eq!(kernel.weights.len(), radius * 2 + 1);
        }
    }

    #[test]
    fn test_zero_passes_leaves_bright_untouched() {
        let bright = gradient_buffer(16, 9);
        let snapshot = bright.pixels.clone();
        let mut ping = HdrBuffer::new(16, 9);
        let mut pong = HdrBuffer::new(16, 9);

        let result = gaussian_blur(&bright, &mut ping, &mut pong, &GaussianKernel::default(), 0);

        assert!(std::ptr::eq(result, &bright));
        assert_eq!(bright.pixels, snapshot);
    }

    #[test]
    fn test_equal_weights_kernel_preserves_uniform_image() {
        let radius = 3;
        let taps = radius * 2 + 1;
        let kernel = GaussianKernel {
            weights: vec![1.0 / taps as f32; taps],
            radius,
        };

        let mut bright = HdrBuffer::new(12, 8);
        bright.fill(Vec3::new(0.42, 0.17, 0.93));
        let mut ping = HdrBuffer::new(12, 8);
        let mut pong = HdrBuffer::new(12, 8);

        let result = gaussian_blur(&bright, &mut ping, &mut pong, &kernel, 10);
        for p in &result.pixels {
            assert!((*p - Vec3::new(0.42, 0.17, 0.93)).length() < 1e-4);
        }
    }

    #[test]
    fn test_blur_alternates_buffers() {
        let bright = gradient_buffer(8, 8);
        let kernel = GaussianKernel::default();

        let mut ping = HdrBuffer::new(8, 8);
        let mut pong = HdrBuffer::new(8, 8);
        let ping_ptr: *const HdrBuffer = &ping;
        let pong_ptr: *const HdrBuffer = &pong;

        let one = gaussian_blur(&bright, &mut ping, &mut pong, &kernel, 1);
        assert!(std::ptr::eq(one, ping_ptr));

        let two = gaussian_blur(&bright, &mut ping, &mut pong, &kernel, 2);
        assert!(std::ptr::eq(two, pong_ptr));
    }

    #[test]
    fn test_blur_spreads_energy() {
        let mut bright = HdrBuffer::new(9, 9);
        bright.pixels[4 * 9 + 4] = Vec3::splat(10.0);
        let mut ping = HdrBuffer::new(9, 9);
        let mut pong = HdrBuffer::new(9, 9);

        let result = gaussian_blur(&bright, &mut ping, &mut pong, &GaussianKernel::new(2, 1.0), 2);
        let center = result.pixels[4 * 9 + 4];
        let neighbor = result.pixels[4 * 9 + 5];
        assert!(center.x < 10.0);
        assert!(neighbor.x > 0.0);
        assert!(center.x > neighbor.x);
    }

    #[test]
    fn test_bright_pass_thresholds_on_luminance() {
        assert_eq!(bright_value(Vec3::splat(2.0), 1.0), Vec3::splat(2.0));
        assert_eq!(bright_value(Vec3::splat(0.1), 1.0), Vec3::ZERO);
        // Saturated blue is dim under Rec. 709 weights.
        assert_eq!(bright_value(Vec3::new(0.0, 0.0, 1.0), 0.5), Vec3::ZERO);
        assert_ne!(bright_value(Vec3::new(0.0, 1.0, 0.0), 0.5), Vec3::ZERO);
    }

    #[test]
    fn test_bloom_disabled_ignores_blur_buffer() {
        let scene = gradient_buffer(6, 4);
        let mut blur_a = HdrBuffer::new(6, 4);
        blur_a.fill(Vec3::splat(10.0));
        let mut blur_b = HdrBuffer::new(6, 4);
        blur_b.fill(Vec3::splat(0.25));

        let post = PostParams {
            bloom_enabled: false,
            ..PostParams::default()
        };

        let mut out_a = vec![[0u8; 4]; 24];
        let mut out_b = vec![[0u8; 4]; 24];
        composite_into(&scene, &blur_a, &post, &mut out_a);
        composite_into(&scene, &blur_b, &post, &mut out_b);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_bloom_enabled_uses_blur_buffer() {
        let scene = gradient_buffer(6, 4);
        let mut blur_a = HdrBuffer::new(6, 4);
        blur_a.fill(Vec3::splat(5.0));
        let blur_b = HdrBuffer::new(6, 4);

        let post = PostParams::default();
        let mut out_a = vec![[0u8; 4]; 24];
        let mut out_b = vec![[0u8; 4]; 24];
        composite_into(&scene, &blur_a, &post, &mut out_a);
        composite_into(&scene, &blur_b, &post, &mut out_b);
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn test_composite_passthrough_when_all_disabled() {
        let mut scene = HdrBuffer::new(1, 1);
        scene.pixels[0] = Vec3::splat(0.5);
        let blurred = HdrBuffer::new(1, 1);
        let post = PostParams {
            bloom_enabled: false,
            tonemap_enabled: false,
            gamma_enabled: false,
            ..PostParams::default()
        };

        let mut out = vec![[0u8; 4]; 1];
        composite_into(&scene, &blurred, &post, &mut out);
        assert_eq!(out[0], [128, 128, 128, 255]);
    }

    #[test]
    fn test_tonemap_compresses_highlights() {
        let mut scene = HdrBuffer::new(1, 1);
        scene.pixels[0] = Vec3::splat(4.0);
        let blurred = HdrBuffer::new(1, 1);
        let mut out = vec![[0u8; 4]; 1];

        let base = PostParams {
            bloom_enabled: false,
            tonemap_enabled: false,
            gamma_enabled: false,
            ..PostParams::default()
        };
        composite_into(&scene, &blurred, &base, &mut out);
        assert_eq!(out[0][0], 255);

        let toned = PostParams {
            tonemap_enabled: true,
            ..base
        };
        composite_into(&scene, &blurred, &toned, &mut out);
        assert!(out[0][0] < 255);
        assert!(out[0][0] > 200);
    }

    #[test]
    fn test_gamma_brightens_midtones() {
        let mut scene = HdrBuffer::new(1, 1);
        scene.pixels[0] = Vec3::splat(0.2);
        let blurred = HdrBuffer::new(1, 1);
        let mut out = vec![[0u8; 4]; 1];

        let flat = PostParams {
            bloom_enabled: false,
            tonemap_enabled: false,
            gamma_enabled: false,
            ..PostParams::default()
        };
        composite_into(&scene, &blurred, &flat, &mut out);
        let linear_value = out[0][0];

        let corrected = PostParams {
            gamma_enabled: true,
            gamma: 2.2,
            ..flat
        };
        composite_into(&scene, &blurred, &corrected, &mut out);
        assert!(out[0][0] > linear_value);
    }
}
