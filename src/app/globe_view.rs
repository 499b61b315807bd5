//! Globe view: egui input -> pointer events, scene frame -> painter

use eframe::egui;

use crate::core::{PointerInput, ScreenPos};
use crate::theme::{colors, marker_color};
use crate::time::now_seconds;
use super::GlobeApp;

/// Pulse frequency of markers for newly joined users, Hz
const NEW_PULSE_HZ: f64 = 1.0;

fn to_local(pos: egui::Pos2, rect: egui::Rect) -> ScreenPos {
    ScreenPos::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

fn to_screen(pos: ScreenPos, rect: egui::Rect) -> egui::Pos2 {
    egui::pos2(rect.min.x + pos.x as f32, rect.min.y + pos.y as f32)
}

impl GlobeApp {
    pub(crate) fn render_globe(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let now = now_seconds();

        // Remounts the scene when the viewport size changes
        self.container.resize(rect.width() as f64, rect.height() as f64);

        self.handle_input(ui, &response, rect, now);
        self.container.tick(now);

        let Some(scene) = self.container.scene() else {
            return;
        };
        let frame = scene.frame();

        // Glow discs, outermost first, then the sphere itself
        let center = to_screen(frame.sphere.center, rect);
        for radius in frame.sphere.glow_radii.iter().rev() {
            painter.circle_filled(
                center,
                *radius as f32,
                egui::Color32::from_rgba_unmultiplied(
                    colors::ACCENT.r(),
                    colors::ACCENT.g(),
                    colors::ACCENT.b(),
                    colors::GLOW_ALPHA,
                ),
            );
        }
        painter.circle(
            center,
            frame.sphere.radius as f32,
            colors::SPHERE,
            egui::Stroke::new(1.0, colors::LAND_STROKE),
        );

        if !frame.land_fill.is_empty() {
            let mut mesh = egui::Mesh::default();
            for p in &frame.land_fill {
                mesh.colored_vertex(to_screen(*p, rect), colors::LAND_FILL);
            }
            mesh.indices = (0..frame.land_fill.len() as u32).collect();
            painter.add(egui::Shape::mesh(mesh));
        }

        let land_stroke = egui::Stroke::new(0.5, colors::LAND_STROKE);
        for run in &frame.land {
            let points: Vec<egui::Pos2> = run.iter().map(|p| to_screen(*p, rect)).collect();
            painter.add(egui::Shape::line(points, land_stroke));
        }

        let pulse = 0.6 + 0.4 * (now * NEW_PULSE_HZ * std::f64::consts::TAU).sin().abs();
        let mut pulsing = false;
        for marker in frame.visible_markers() {
            let opacity = if marker.is_new {
                pulsing = true;
                marker.opacity * pulse as f32
            } else {
                marker.opacity
            };
            painter.circle_filled(
                to_screen(marker.position, rect),
                marker.radius as f32,
                marker_color(marker.category, opacity),
            );
        }

        if let Some(hover) = response.hover_pos() {
            if frame.hit_test(to_local(hover, rect), self.config.globe.hit_tolerance).is_some() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
        }

        if scene.wants_frame() || pulsing {
            ui.ctx().request_repaint();
        }
    }

    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response, rect: egui::Rect, now: f64) {
        let pointer = response.interact_pointer_pos().map(|p| to_local(p, rect));

        if response.drag_started() {
            if let Some(pos) = pointer {
                self.container.handle(PointerInput::Down(pos), now);
            }
        }
        if response.dragged() {
            if let Some(pos) = pointer {
                self.container.handle(PointerInput::Move(pos), now);
            }
        }
        if response.drag_stopped() {
            self.container.handle(PointerInput::Up, now);
        } else if !response.dragged()
            && self.container.scene().is_some_and(|s| s.is_dragging())
        {
            // the pointer left the surface mid-drag
            self.container.handle(PointerInput::Leave, now);
        }

        if response.hovered() {
            let (scroll, zoom) = ui.input(|i| (i.raw_scroll_delta.y, i.zoom_delta()));
            if zoom != 1.0 {
                self.container.handle(PointerInput::Pinch(zoom as f64), now);
            } else if scroll != 0.0 {
                self.container.handle(PointerInput::Wheel(scroll as f64), now);
            }
        }

        if response.clicked() {
            self.container.stop_rotation();
            if let Some(pos) = pointer {
                if let Some(selected) = self.container.click(pos) {
                    tracing::debug!(name = %selected.payload.name, "Marker clicked");
                }
            }
        }
    }
}
