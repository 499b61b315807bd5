//! Participant details window, opened by marker selection

use eframe::egui;
use crate::core::GeoPoint;
use crate::theme::colors;
use super::GlobeApp;

fn tag_row(ui: &mut egui::Ui, label: &str, tags: Option<&[String]>) {
    let Some(tags) = tags.filter(|t| !t.is_empty()) else {
        return;
    };
    ui.label(egui::RichText::new(label).color(colors::TEXT_MUTED));
    ui.horizontal_wrapped(|ui| {
        for tag in tags {
            egui::Frame::new()
                .stroke(egui::Stroke::new(1.0, colors::ACCENT.gamma_multiply(0.5)))
                .corner_radius(4.0)
                .inner_margin(egui::Margin::symmetric(4, 1))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(tag).small());
                });
        }
    });
}

impl GlobeApp {
    pub(crate) fn render_details(&mut self, ctx: &egui::Context) {
        let Some(selected) = self.selected.borrow().clone() else {
            return;
        };
        let user = &selected.payload;
        let mut open = true;
        let mut focus: Option<GeoPoint> = None;

        egui::Window::new(user.display_name())
            .id(egui::Id::new("details"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
            .default_width(280.0)
            .show(ctx, |ui| {
                if !user.location.is_empty() {
                    ui.label(egui::RichText::new(&user.location).color(colors::TEXT_SECONDARY));
                }
                if let Some(status) = user.team_status.as_deref() {
                    ui.label(egui::RichText::new(status).color(colors::ACCENT));
                }
                if let Some(summary) = user.summary.as_deref() {
                    ui.add_space(4.0);
                    ui.label(summary);
                }
                if let Some(highlights) = user.highlights.as_deref() {
                    ui.add_space(4.0);
                    for line in highlights {
                        ui.label(format!("- {line}"));
                    }
                }

                ui.add_space(4.0);
                tag_row(ui, "Skills", user.skills.as_deref());
                tag_row(ui, "Interests", user.interests.as_deref());

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if let (Some(handle), Some(url)) = (user.twitter_handle(), user.x_account.as_deref()) {
                        ui.hyperlink_to(format!("@{handle}"), url);
                    }
                    if let (Some(handle), Some(url)) = (user.linkedin_handle(), user.linkedin_url.as_deref()) {
                        ui.hyperlink_to(format!("in/{handle}"), url);
                    }
                    if !user.anonymous && !user.email.is_empty() {
                        ui.hyperlink_to(&user.email, format!("mailto:{}", user.email));
                    }
                });

                if let Some(coords) = user.coordinates {
                    ui.add_space(4.0);
                    if ui.button("Show on globe").clicked() {
                        focus = Some(GeoPoint::new(coords.longitude, coords.latitude));
                    }
                }
            });

        if let Some(point) = focus {
            self.container.focus(point);
        }
        if !open {
            self.close_details();
        }
    }

    /// Dismiss the details window and hand the globe back to autorotation
    pub(crate) fn close_details(&mut self) {
        *self.selected.borrow_mut() = None;
        self.container.set_autorotate(true);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::config::AppConfig;
    use crate::core::{
        MarkerCategory, NoLandmass, NodeId, NodeSelected, PointerInput, ScreenPos, UserNode,
    };
    use crate::fetch_state::FetchState;

    fn app() -> GlobeApp {
        GlobeApp::with_parts(
            AppConfig::default(),
            Box::new(NoLandmass),
            None,
            Arc::new(Mutex::new(FetchState::Idle)),
            Arc::new(Mutex::new(FetchState::Idle)),
        )
    }

    #[test]
    fn test_closing_details_resumes_rotation() {
        let mut app = app();
        app.container.resize(1280.0, 720.0);
        app.container.handle(PointerInput::Down(ScreenPos::new(5.0, 5.0)), 0.1);
        app.container.handle(PointerInput::Up, 0.2);
        *app.selected.borrow_mut() = Some(NodeSelected {
            id: NodeId::from_key("ada@example.org"),
            index: 0,
            category: MarkerCategory::User,
            payload: UserNode::default(),
        });
        assert!(!app.container.scene().unwrap().is_rotating());

        app.close_details();
        assert!(app.selected.borrow().is_none());
        assert!(app.container.scene().unwrap().is_rotating());
    }
}
