//! Black & green theme for the globe

use egui::Color32;

use crate::core::MarkerCategory;

/// Black background, grey landmass, green accents
pub mod colors {
    use super::Color32;

    // === Backgrounds ===
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(0, 0, 0);           // #000000
    pub const BG_ELEVATED: Color32 = Color32::from_rgb(12, 12, 12);       // #0C0C0C
    pub const BG_HOVER: Color32 = Color32::from_rgb(24, 24, 24);          // #181818

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(255, 255, 255);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 160, 160);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(80, 80, 80);

    pub const BORDER: Color32 = Color32::from_rgb(40, 40, 40);

    // === Globe ===
    pub const ACCENT: Color32 = Color32::from_rgb(34, 197, 94);           // #22c55e
    pub const PARTNER: Color32 = Color32::from_rgb(107, 70, 193);         // #6b46c1
    pub const SPHERE: Color32 = Color32::from_rgb(0, 0, 0);
    pub const LAND_FILL: Color32 = Color32::from_rgb(26, 26, 26);         // #1a1a1a
    pub const LAND_STROKE: Color32 = Color32::from_rgb(51, 51, 51);       // #333333

    /// Alpha of each glow disc behind the sphere (0.1 opacity)
    pub const GLOW_ALPHA: u8 = 26;

    // === Status ===
    pub const OK: Color32 = Color32::from_rgb(100, 200, 100);
    pub const PENDING: Color32 = Color32::from_rgb(200, 200, 100);
    pub const ERROR: Color32 = Color32::from_rgb(200, 100, 100);
}

/// Fill color of a marker with `opacity` applied
pub fn marker_color(category: MarkerCategory, opacity: f32) -> Color32 {
    let base = match category {
        MarkerCategory::User => colors::ACCENT,
        MarkerCategory::Partner => colors::PARTNER,
    };
    base.gamma_multiply(opacity.clamp(0.0, 1.0))
}

/// Dark egui Visuals with green selection
pub fn globe_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_ELEVATED;
    visuals.extreme_bg_color = BG_PRIMARY;
    visuals.faint_bg_color = BG_ELEVATED;

    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_fill = BG_PRIMARY;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.inactive.bg_fill = BG_PRIMARY;
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.weak_bg_fill = BG_PRIMARY;

    visuals.widgets.hovered.bg_fill = BG_ELEVATED;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ACCENT.gamma_multiply(0.5));
    visuals.widgets.hovered.weak_bg_fill = BG_ELEVATED;

    visuals.widgets.active.bg_fill = BG_HOVER;
    visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, ACCENT);
    visuals.widgets.active.weak_bg_fill = BG_HOVER;

    visuals.selection.bg_fill = ACCENT.gamma_multiply(0.35);
    visuals.selection.stroke = egui::Stroke::new(1.0, ACCENT);

    visuals.hyperlink_color = ACCENT;

    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}
