//! Parameter sidebar UI
//!
//! Interactive controls for the black hole, accretion disk, ray marching
//! and HDR post settings, drawn with egui.

use crate::params::RenderParams;
use crate::physics::BlackHole;
use crate::render::FrameStats;
use common::{CameraMode, OrbitCamera};
use egui::{Color32, Context, RichText};

/// Draw the controls sidebar
pub fn draw_controls_sidebar(
    ctx: &Context,
    params: &mut RenderParams,
    black_hole: &mut BlackHole,
    camera: &mut OrbitCamera,
    stats: FrameStats,
    fps: f32,
    march_size: (usize, usize),
) {
    egui::SidePanel::right("controls_panel")
        .resizable(true)
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.heading(RichText::new("Black Hole Visualization").color(Color32::LIGHT_BLUE));
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.collapsing(RichText::new("🌑 Black Hole").strong(), |ui| {
                    let mut mass = black_hole.mass;
                    if ui
                        .add(egui::Slider::new(&mut mass, 0.1..=5.0).text("Mass"))
                        .changed()
                    {
                        black_hole.set_mass(mass);
                    }
                    ui.label(
                        RichText::new(format!(
                            "rₛ = {:.2}   photon sphere = {:.2}",
                            black_hole.schwarzschild_radius,
                            black_hole.photon_sphere_radius()
                        ))
                        .monospace(),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.march.bend_strength, 0.0..=4.0)
                            .text("Lensing strength"),
                    );
                });

                ui.add_space(4.0);

                ui.collapsing(RichText::new("💫 Accretion Disk").strong(), |ui| {
                    ui.checkbox(&mut params.disk.enabled, "Enabled");
                    ui.add(
                        egui::Slider::new(&mut params.disk.inner_radius, 2.0..=40.0)
                            .text("Inner radius"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.disk.outer_radius, 4.0..=80.0)
                            .text("Outer radius"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.disk.half_height, 0.05..=3.0)
                            .text("Half thickness"),
                    );
                    ui.add(egui::Slider::new(&mut params.disk.speed, 0.0..=2.0).text("Flow speed"));
                    ui.add(
                        egui::Slider::new(&mut params.disk.noise_scale, 0.1..=5.0)
                            .text("Noise scale"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.disk.noise_lod, 1.0..=8.0)
                            .text("Noise detail"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.disk.density_h, 0.1..=6.0)
                            .text("Radial falloff"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.disk.density_v, 0.1..=6.0)
                            .text("Vertical falloff"),
                    );
                    ui.add(egui::Slider::new(&mut params.disk.lit, 0.0..=10.0).text("Emission"));
                    ui.add(
                        egui::Slider::new(&mut params.disk.particle, 0.0..=5.0)
                            .text("Particle boost"),
                    );
                });

                ui.add_space(4.0);

                ui.collapsing(RichText::new("🔭 Ray Marching").strong(), |ui| {
                    ui.add(
                        egui::Slider::new(&mut params.march.max_steps, 50..=4000).text("Max steps"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.march.escape_radius, 20.0..=400.0)
                            .text("Escape radius"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.march.step_scale, 0.02..=1.0)
                            .text("Step scale")
                            .logarithmic(true),
                    );
                });

                ui.add_space(4.0);

                ui.collapsing(RichText::new("✨ Bloom & Tonemap").strong(), |ui| {
                    ui.checkbox(&mut params.post.bloom_enabled, "Bloom");
                    ui.add(
                        egui::Slider::new(&mut params.post.bloom_threshold, 0.0..=5.0)
                            .text("Threshold"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.post.blur_passes, 0..=30).text("Blur passes"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.post.bloom_strength, 0.0..=3.0)
                            .text("Strength"),
                    );
                    ui.separator();
                    ui.checkbox(&mut params.post.tonemap_enabled, "Tonemap");
                    ui.add(
                        egui::Slider::new(&mut params.post.tonemap_strength, 0.1..=5.0)
                            .text("Exposure"),
                    );
                    ui.checkbox(&mut params.post.gamma_enabled, "Gamma correction");
                    ui.add(egui::Slider::new(&mut params.post.gamma, 1.0..=4.0).text("Gamma"));
                });

                ui.add_space(4.0);

                ui.collapsing(RichText::new("🎥 Camera & Render").strong(), |ui| {
                    let mut mode = camera.mode;
                    ui.horizontal(|ui| {
                        ui.label("Camera:");
                        ui.selectable_value(&mut mode, CameraMode::Orbit, "Orbit");
                        ui.selectable_value(&mut mode, CameraMode::FreeFly, "Free-fly");
                    });
                    if mode != camera.mode {
                        camera.set_mode(mode);
                    }

                    ui.horizontal(|ui| {
                        ui.label("Resolution:");
                        ui.selectable_value(&mut params.render_scale, 1, "Full");
                        ui.selectable_value(&mut params.render_scale, 2, "Half");
                        ui.selectable_value(&mut params.render_scale, 4, "Quarter");
                    });

                    ui.add(
                        egui::Slider::new(&mut params.time_scale, 0.0..=4.0).text("Time scale"),
                    );

                    if ui.button("Reset parameters").clicked() {
                        let mass = black_hole.mass;
                        *params = RenderParams::default();
                        black_hole.set_mass(mass);
                    }
                    if ui.button("Reset camera").clicked() {
                        *camera = OrbitCamera::default();
                    }
                });

                ui.add_space(8.0);

                ui.collapsing(RichText::new("📊 Status").strong(), |ui| {
                    egui::Grid::new("status_grid")
                        .num_columns(2)
                        .spacing([10.0, 4.0])
                        .show(ui, |ui| {
                            ui.label("FPS");
                            ui.label(format!("{fps:.1}"));
                            ui.end_row();

                            ui.label("March resolution");
                            ui.label(format!("{}x{}", march_size.0, march_size.1));
                            ui.end_row();

                            ui.label("Captured rays");
                            ui.label(format!(
                                "{} / {}",
                                stats.captured, stats.total_rays
                            ));
                            ui.end_row();

                            ui.label("Disk rays");
                            ui.label(format!("{}", stats.disk_rays));
                            ui.end_row();

                            ui.label("Mean steps");
                            ui.label(format!("{:.1}", stats.mean_steps));
                            ui.end_row();

                            ui.label("FOV");
                            ui.label(format!("{:.1}°", camera.fov()));
                            ui.end_row();
                        });
                });
            });
        });
}
