//! Header bar with title, signup stats and status

use eframe::egui;
use crate::fetch_state::FetchState;
use crate::theme::colors;
use crate::time::now_seconds;
use super::GlobeApp;

impl GlobeApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        self.fps_counter.tick();

        let users_state = self.users_state();
        let stats = self.stats;
        let visible = self
            .container
            .frame()
            .map(|f| f.visible_count())
            .unwrap_or(0);

        ui.horizontal(|ui| {
            let settings_text = if self.show_settings { "Settings <<<" } else { "Settings >>>" };
            if ui.button(egui::RichText::new(settings_text)).clicked() {
                self.show_settings = !self.show_settings;
            }

            ui.add_space(10.0);
            ui.label(egui::RichText::new("hacker globe").color(colors::ACCENT).strong());

            // RIGHT: Status and stats (right-to-left order)
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let countdown = if stats.launched() {
                    "launched".to_string()
                } else {
                    format!("{} days to launch", stats.days_until_launch)
                };
                ui.label(egui::RichText::new(countdown).color(colors::TEXT_MUTED));
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{} seats left", stats.seats_remaining))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{} builders", stats.signups))
                        .color(colors::TEXT_SECONDARY),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{} in view", visible))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                        .color(colors::TEXT_SECONDARY),
                );

                ui.add_space(10.0);

                let status_color = match &users_state {
                    FetchState::Loaded => colors::OK,
                    FetchState::Idle | FetchState::Loading => colors::PENDING,
                    FetchState::Failed(_) => colors::ERROR,
                };
                let status = ui.colored_label(status_color, egui::RichText::new(users_state.label()));
                if let FetchState::Failed(reason) = &users_state {
                    status.on_hover_text(reason);
                }
            });
        });
    }
}

/// FPS counter using platform-agnostic time
pub struct FpsCounter {
    frames: Vec<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(60),
        }
    }

    pub fn tick(&mut self) {
        self.record(now_seconds());
    }

    fn record(&mut self, now: f64) {
        self.frames.push(now);
        if self.frames.len() > 60 {
            self.frames.remove(0);
        }
    }

    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frames.first(), self.frames.last()) else {
            return 0.0;
        };
        let elapsed = last - first;
        if self.frames.len() < 2 || elapsed <= 0.0 {
            return 0.0;
        }
        (self.frames.len() as f64 - 1.0) / elapsed
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
