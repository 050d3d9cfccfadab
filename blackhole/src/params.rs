//! User-tunable rendering configuration
//!
//! One flat parameter set, written by the UI/input side and read once per
//! frame by the render pipeline. Values are never trusted raw: the pipeline
//! takes a `sanitized()` copy, clamping every field to its documented range.

/// Accretion disk shape and shading parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskParams {
    pub enabled: bool,
    /// Inner edge radius in world units
    pub inner_radius: f32,
    /// Outer edge radius in world units
    pub outer_radius: f32,
    /// Half thickness of the disk slab
    pub half_height: f32,
    /// Spatial frequency of the density noise
    pub noise_scale: f32,
    /// Continuous octave count; the fractional part weights the last octave
    pub noise_lod: f32,
    /// Orbital advection speed multiplier
    pub speed: f32,
    /// Vertical density falloff exponent
    pub density_v: f32,
    /// Radial density falloff exponent
    pub density_h: f32,
    /// Particle brightness multiplier
    pub particle: f32,
    /// Emission intensity
    pub lit: f32,
}

impl Default for DiskParams {
    fn default() -> Self {
        Self {
            enabled: true,
            inner_radius: 6.0,
            outer_radius: 22.0,
            half_height: 0.7,
            noise_scale: 1.1,
            noise_lod: 4.5,
            speed: 0.35,
            density_v: 2.0,
            density_h: 1.5,
            particle: 1.0,
            lit: 2.5,
        }
    }
}

impl DiskParams {
    pub fn sanitized(&self) -> Self {
        let inner_radius = self.inner_radius.clamp(0.1, 500.0);
        Self {
            enabled: self.enabled,
            inner_radius,
            outer_radius: self.outer_radius.clamp(inner_radius + 0.1, 1000.0),
            half_height: self.half_height.clamp(0.01, 10.0),
            noise_scale: self.noise_scale.clamp(0.05, 20.0),
            noise_lod: self.noise_lod.clamp(1.0, 8.0),
            speed: self.speed.clamp(0.0, 10.0),
            density_v: self.density_v.clamp(0.1, 8.0),
            density_h: self.density_h.clamp(0.1, 8.0),
            particle: self.particle.clamp(0.0, 10.0),
            lit: self.lit.clamp(0.0, 20.0),
        }
    }
}

/// Ray marching parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchParams {
    /// Hard ceiling on steps per ray; hitting it counts as escaped
    pub max_steps: u32,
    /// Radius beyond which a ray has escaped to the skybox
    pub escape_radius: f32,
    /// Step length as a fraction of the height above the horizon
    pub step_scale: f32,
    /// Multiplier on the gravitational deflection
    pub bend_strength: f32,
}

impl Default for MarchParams {
    fn default() -> Self {
        Self {
            max_steps: 700,
            escape_radius: 80.0,
            step_scale: 0.25,
            bend_strength: 1.0,
        }
    }
}

impl MarchParams {
    pub fn sanitized(&self) -> Self {
        Self {
            max_steps: self.max_steps.clamp(16, 20000),
            escape_radius: self.escape_radius.clamp(10.0, 10000.0),
            step_scale: self.step_scale.clamp(0.02, 1.0),
            bend_strength: self.bend_strength.clamp(0.0, 4.0),
        }
    }
}

/// HDR post-processing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostParams {
    pub bloom_enabled: bool,
    /// Luminance above this feeds the bloom blur
    pub bloom_threshold: f32,
    /// Number of alternating blur passes (0 disables blurring)
    pub blur_passes: u32,
    /// Weight of the blurred bright buffer in the composite
    pub bloom_strength: f32,
    pub tonemap_enabled: bool,
    /// Exposure coefficient for the tonemap curve
    pub tonemap_strength: f32,
    pub gamma_enabled: bool,
    pub gamma: f32,
}

impl Default for PostParams {
    fn default() -> Self {
        Self {
            bloom_enabled: true,
            bloom_threshold: 1.0,
            blur_passes: 10,
            bloom_strength: 0.9,
            tonemap_enabled: true,
            tonemap_strength: 1.0,
            gamma_enabled: true,
            gamma: 2.2,
        }
    }
}

impl PostParams {
    pub fn sanitized(&self) -> Self {
        Self {
            bloom_enabled: self.bloom_enabled,
            bloom_threshold: self.bloom_threshold.clamp(0.0, 20.0),
            blur_passes: self.blur_passes.min(64),
            bloom_strength: self.bloom_strength.clamp(0.0, 8.0),
            tonemap_enabled: self.tonemap_enabled,
            tonemap_strength: self.tonemap_strength.clamp(0.05, 10.0),
            gamma_enabled: self.gamma_enabled,
            gamma: self.gamma.clamp(1.0, 4.0),
        }
    }
}

/// Everything the per-frame render call needs, passed by reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub disk: DiskParams,
    pub march: MarchParams,
    pub post: PostParams,
    /// Multiplier on wall-clock time fed to the disk
    pub time_scale: f32,
    /// Resolution divisor for the march (1, 2 or 4)
    pub render_scale: u32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            disk: DiskParams::default(),
            march: MarchParams::default(),
            post: PostParams::default(),
            time_scale: 1.0,
            render_scale: 2,
        }
    }
}

impl RenderParams {
    pub fn sanitized(&self) -> Self {
        Self {
            disk: self.disk.sanitized(),
            march: self.march.sanitized(),
            post: self.post.sanitized(),
            time_scale: self.time_scale.clamp(0.0, 10.0),
            render_scale: match self.render_scale {
                0 | 1 => 1,
                2 | 3 => 2,
                _ => 4,
            },
        }
    }
}
