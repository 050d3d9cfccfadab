//! Common utilities for the black hole visualization
//!
//! This crate provides the shared graphics setup (window, device, surface,
//! CPU-frame upload texture) and the camera / ray-basis math used by both
//! the interactive app and the offline renderer.

pub mod camera;
pub mod graphics;

pub use camera::*;
pub use graphics::*;
