//! Offline still-frame renderer
//!
//! Renders a single frame of the black hole scene to a PNG at full
//! resolution, with optional supersampling. Shares the march and post
//! pipeline with the interactive app.

mod disk;
mod marcher;
mod params;
mod physics;
mod post;
mod render;
mod sky;

use common::OrbitCamera;
use glam::Vec3;
use params::RenderParams;
use physics::BlackHole;
use render::FrameRenderer;
use sky::{ColorMap, Cubemap};
use std::path::Path;

const SKYBOX_DIR: &str = "assets/skybox";
const COLOR_MAP_PATH: &str = "assets/color_map.png";
const STARFIELD_SEED: u64 = 42;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let mut width = 1920u32;
    let mut height = 1080u32;
    let mut output = String::from("blackhole.png");
    let mut time = 0.0f32;
    let mut samples = 4u32;
    let mut distance = 30.0f32;
    let mut yaw = -90.0f32;
    let mut pitch = -11.3f32;
    let mut mass = 1.0f32;
    let mut use_sky = true;
    let mut params = RenderParams {
        render_scale: 1,
        ..RenderParams::default()
    };

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-w" | "--width" => {
                width = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(1920);
                i += 1;
            }
            "-h" | "--height" => {
                height = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(1080);
                i += 1;
            }
            "-o" | "--output" => {
                if let Some(path) = args.get(i + 1) {
                    output = path.clone();
                }
                i += 1;
            }
            "-t" | "--time" => {
                time = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0.0);
                i += 1;
            }
            "-s" | "--samples" => {
                samples = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(4);
                i += 1;
            }
            "-d" | "--distance" => {
                distance = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(30.0);
                i += 1;
            }
            "--yaw" => {
                yaw = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(-90.0);
                i += 1;
            }
            "--pitch" => {
                pitch = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(-11.3);
                i += 1;
            }
            "-m" | "--mass" => {
                mass = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(1.0);
                i += 1;
            }
            "-n" | "--steps" => {
                params.march.max_steps =
                    args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(700);
                i += 1;
            }
            "--no-disk" => params.disk.enabled = false,
            "--no-bloom" => params.post.bloom_enabled = false,
            "--no-sky" => use_sky = false,
            "--help" => {
                println!("Black Hole Offline Renderer");
                println!();
                println!("Usage: blackhole_offline [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -w, --width <WIDTH>      Output width (default: 1920)");
                println!("  -h, --height <HEIGHT>    Output height (default: 1080)");
                println!("  -o, --output <PATH>      Output PNG path (default: blackhole.png)");
                println!("  -t, --time <SECONDS>     Disk animation time (default: 0)");
                println!("  -s, --samples <N>        Samples per pixel (default: 4)");
                println!("  -d, --distance <DIST>    Camera distance (default: 30)");
                println!("      --yaw <DEG>          Camera azimuth in degrees (default: -90)");
                println!("      --pitch <DEG>        Camera elevation in degrees (default: -11.3)");
                println!("  -m, --mass <MASS>        Black hole mass (default: 1)");
                println!("  -n, --steps <STEPS>      Max march steps per ray (default: 700)");
                println!("      --no-disk            Disable the accretion disk");
                println!("      --no-bloom           Disable bloom");
                println!("      --no-sky             Render against a black background");
                return;
            }
            _ => {}
        }
        i += 1;
    }

    // Aim the camera at the origin from the requested angles.
    let yaw_rad = yaw.to_radians();
    let pitch_rad = pitch.to_radians();
    let front = Vec3::new(
        yaw_rad.cos() * pitch_rad.cos(),
        pitch_rad.sin(),
        yaw_rad.sin() * pitch_rad.cos(),
    );
    let camera = OrbitCamera::new(-front * distance.max(1.0), yaw, pitch);

    let mut black_hole = BlackHole::default();
    black_hole.set_mass(mass);
    let sky = if use_sky {
        Cubemap::load_or_fallback(Path::new(SKYBOX_DIR), STARFIELD_SEED)
    } else {
        Cubemap::black()
    };
    let ramp = ColorMap::load_or_fallback(Path::new(COLOR_MAP_PATH));

    println!("Black Hole Offline Renderer");
    println!("===========================");
    println!("Resolution: {}x{}", width, height);
    println!("Samples/pixel: {}", samples.clamp(1, 64));
    println!(
        "Mass: {:.2}  (rs = {:.2})",
        black_hole.mass, black_hole.schwarzschild_radius
    );
    println!(
        "Camera: distance {:.1}, yaw {:.1} deg, pitch {:.1} deg",
        distance, yaw, pitch
    );
    println!("Max steps: {}", params.march.max_steps);
    println!();
    println!("Rendering...");

    let start = std::time::Instant::now();

    let mut renderer = FrameRenderer::new(width as usize, height as usize);
    let frame = renderer.render(&camera, &black_hole, &params, &sky, &ramp, time, samples);
    let bytes: Vec<u8> = frame.iter().flatten().copied().collect();

    let elapsed = start.elapsed();
    let stats = renderer.stats();
    println!("Render time: {:.1}s", elapsed.as_secs_f32());
    println!(
        "Rays: {} total, {} captured, {} through the disk, {:.0} mean steps",
        stats.total_rays, stats.captured, stats.disk_rays, stats.mean_steps
    );

    let image =
        image::RgbaImage::from_raw(width, height, bytes).expect("frame matches image dimensions");
    match image.save(&output) {
        Ok(()) => println!("Saved {}", output),
        Err(e) => {
            eprintln!("Failed to save {}: {}", output, e);
            std::process::exit(1);
        }
    }
}
