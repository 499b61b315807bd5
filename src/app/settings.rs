//! Settings sidebar - rotation, view and data status

use eframe::egui;
use crate::fetch_state::FetchState;
use crate::theme::colors;
use super::GlobeApp;

fn status_row(ui: &mut egui::Ui, label: &str, state: &FetchState) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label).color(colors::TEXT_MUTED));
        let color = match state {
            FetchState::Loaded => colors::OK,
            FetchState::Idle | FetchState::Loading => colors::PENDING,
            FetchState::Failed(_) => colors::ERROR,
        };
        ui.colored_label(color, state.label());
    });
    if let FetchState::Failed(reason) = state {
        ui.label(egui::RichText::new(reason).color(colors::TEXT_MUTED).small());
    }
}

impl GlobeApp {
    pub(crate) fn render_settings(&mut self, ctx: &egui::Context) {
        let half_width = ctx.screen_rect().width() * 0.18;
        egui::SidePanel::left("settings")
            .default_width(half_width)
            .min_width(240.0)
            .resizable(true)
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(8.0))
            .show(ctx, |ui| {
                let group_frame = egui::Frame::new()
                    .stroke(egui::Stroke::new(1.0, colors::TEXT_MUTED.gamma_multiply(0.6)))
                    .corner_radius(4.0)
                    .inner_margin(6.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(egui::RichText::new("Globe:").color(colors::TEXT_MUTED));

                    let rotating = self.container.scene().is_some_and(|s| s.is_rotating());
                    let mut autorotate = rotating;
                    if ui.checkbox(&mut autorotate, "Auto-rotate").changed() {
                        self.container.set_autorotate(autorotate);
                    }
                    ui.label(
                        egui::RichText::new("  Stops on drag or zoom")
                            .color(colors::TEXT_MUTED)
                            .small(),
                    );

                    ui.add_space(4.0);
                    if let Some(scene) = self.container.scene() {
                        let rotation = scene.state().rotation;
                        ui.label(
                            egui::RichText::new(format!(
                                "Rotation: {:.1}°, {:.1}°  Zoom: {:.2}x",
                                rotation.lambda,
                                rotation.phi,
                                scene.zoom()
                            ))
                            .color(colors::TEXT_MUTED),
                        );
                    }
                    if ui.button("Reset view").clicked() {
                        self.container.reset_view();
                    }
                });

                ui.add_space(8.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(egui::RichText::new("Data:").color(colors::TEXT_MUTED));

                    status_row(ui, "Users", &self.users_state());
                    status_row(ui, "Landmass", &self.landmass_state());
                    ui.label(
                        egui::RichText::new(format!(
                            "{} users, {} on the globe",
                            self.users.len(),
                            self.container.nodes().len()
                        ))
                        .color(colors::TEXT_MUTED),
                    );
                    if ui.button("Refresh users").clicked() {
                        self.refresh_users(ctx);
                    }
                    ui.label(
                        egui::RichText::new(self.config.api_url.as_str())
                            .color(colors::TEXT_MUTED)
                            .small(),
                    );
                });
            });
    }
}
