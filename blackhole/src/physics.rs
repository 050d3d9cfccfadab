//! Black hole physics: horizon geometry, light deflection, step sizing
//!
//! The deflection model is a heuristic inverse-square bend with a
//! photon-sphere boost, tuned to reproduce qualitative lensing rather than
//! exact geodesics. Coefficients are visual parameters, not constants of
//! nature.

use glam::Vec3;

/// Physical constants (scaled for simulation)
pub const C: f32 = 1.0; // Speed of light (normalized)
pub const G: f32 = 1.0; // Gravitational constant (normalized)

/// Step length bounds as multiples of the Schwarzschild radius
pub const MIN_STEP_FACTOR: f32 = 0.02;
pub const MAX_STEP_FACTOR: f32 = 2.0;

/// Schwarzschild black hole
#[derive(Debug, Clone, Copy)]
pub struct BlackHole {
    pub position: Vec3,
    pub mass: f32,
    pub schwarzschild_radius: f32,
}

impl BlackHole {
    pub fn new(position: Vec3, mass: f32) -> Self {
        // Schwarzschild radius: rs = 2GM/c²
        let schwarzschild_radius = 2.0 * G * mass / (C * C);

        Self {
            position,
            mass,
            schwarzschild_radius,
        }
    }

    /// Change the mass, rederiving the horizon radius
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(0.01);
        self.schwarzschild_radius = 2.0 * G * self.mass / (C * C);
    }

    /// Check if a point is inside the event horizon
    pub fn is_inside_horizon(&self, point: Vec3) -> bool {
        (point - self.position).length() <= self.schwarzschild_radius
    }

    /// Photon sphere radius (1.5 * rs), where light can orbit
    pub fn photon_sphere_radius(&self) -> f32 {
        1.5 * self.schwarzschild_radius
    }
}

impl Default for BlackHole {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0)
    }
}

/// Gravitational deflection acceleration applied to a ray direction.
///
/// Inverse-square magnitude toward the singularity, boosted inside twice
/// the photon sphere so rays near it wrap visibly. `strength` scales the
/// whole effect and is user tunable.
pub fn deflection(pos: Vec3, black_hole: &BlackHole, strength: f32) -> Vec3 {
    let r_vec = pos - black_hole.position;
    let r = r_vec.length();

    // Inside this band the ray is about to be captured anyway; a finite
    // acceleration here would blow up the direction update.
    if r < black_hole.schwarzschild_radius * 1.01 {
        return Vec3::ZERO;
    }

    let r_hat = r_vec / r;

    let photon_sphere = black_hole.photon_sphere_radius();
    let enhancement = if r < photon_sphere * 2.0 {
        1.0 + 2.0 * (photon_sphere / r).powi(2)
    } else {
        1.0
    };

    -r_hat * (G * black_hole.mass / (r * r)) * enhancement * 3.0 * strength
}

/// Adaptive step length: proportional to height above the horizon, clamped
/// to [MIN_STEP_FACTOR, MAX_STEP_FACTOR] multiples of rs. Shrinks near the
/// horizon, grows in empty far space.
pub fn step_size(r: f32, schwarzschild_radius: f32, scale: f32) -> f32 {
    let height = (r - schwarzschild_radius).max(0.0);
    (height * scale).clamp(
        MIN_STEP_FACTOR * schwarzschild_radius,
        MAX_STEP_FACTOR * schwarzschild_radius,
    )
}

/// Keplerian orbital speed as a fraction of c at radius r, capped below
/// relativistic breakdown of the approximation.
pub fn orbital_beta(r: f32, schwarzschild_radius: f32) -> f32 {
    (schwarzschild_radius / (2.0 * r.max(1e-6))).sqrt().min(0.7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schwarzschild_radius() {
        let bh = BlackHole::new(Vec3::ZERO, 1.0);
        assert!((bh.schwarzschild_radius - 2.0).abs() < 0.001);
        assert!((bh.photon_sphere_radius() - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_horizon_check() {
        let bh = BlackHole::new(Vec3::ZERO, 1.0);
        assert!(bh.is_inside_horizon(Vec3::new(1.0, 0.0, 0.0)));
        assert!(!bh.is_inside_horizon(Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_set_mass_rederives_horizon() {
        let mut bh = BlackHole::default();
        bh.set_mass(2.0);
        assert!((bh.schwarzschild_radius - 4.0).abs() < 1e-6);
        // Mass never drops to zero, the horizon stays finite.
        bh.set_mass(-5.0);
        assert!(bh.schwarzschild_radius > 0.0);
    }

    #[test]
    fn test_deflection_points_inward() {
        let bh = BlackHole::default();
        let pos = Vec3::new(10.0, 0.0, 0.0);
        let accel = deflection(pos, &bh, 1.0);
        assert!(accel.x < 0.0);
        assert!(accel.y.abs() < 1e-6);
        assert!(accel.z.abs() < 1e-6);
    }

    #[test]
    fn test_deflection_weakens_with_distance() {
        let bh = BlackHole::default();
        let near = deflection(Vec3::new(8.0, 0.0, 0.0), &bh, 1.0).length();
        let far = deflection(Vec3::new(40.0, 0.0, 0.0), &bh, 1.0).length();
        assert!(near > far);
        assert!(far > 0.0);
    }

    #[test]
    fn test_deflection_zero_at_horizon() {
        let bh = BlackHole::default();
        let accel = deflection(Vec3::new(bh.schwarzschild_radius, 0.0, 0.0), &bh, 1.0);
        assert_eq!(accel, Vec3::ZERO);
    }

    #[test]
    fn test_deflection_scales_with_strength() {
        let bh = BlackHole::default();
        let pos = Vec3::new(12.0, 3.0, -4.0);
        let single = deflection(pos, &bh, 1.0).length();
        let double = deflection(pos, &bh, 2.0).length();
        assert!((double - 2.0 * single).abs() < 1e-5);
    }

    #[test]
    fn test_step_size_bounds() {
        let rs = 2.0;
        // Right above the horizon the step floors out.
        assert!((step_size(rs + 0.001, rs, 0.25) - MIN_STEP_FACTOR * rs).abs() < 1e-5);
        // Far away it is capped.
        assert!((step_size(1000.0, rs, 0.25) - MAX_STEP_FACTOR * rs).abs() < 1e-5);
        // In between it is proportional to height above the horizon.
        let mid = step_size(rs + 4.0, rs, 0.25);
        assert!((mid - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_orbital_beta_decreases_outward() {
        let rs = 2.0;
        let inner = orbital_beta(3.0 * rs, rs);
        let outer = orbital_beta(10.0 * rs, rs);
        assert!(inner > outer);
        assert!(inner <= 0.7);
        assert!(outer > 0.0);
    }
}
