use eframe::egui;

pub const NIGHT: egui::Color32 = egui::Color32::from_rgb(26, 28, 44);
pub const PANEL: egui::Color32 = egui::Color32::from_rgb(41, 54, 111);
pub const INK: egui::Color32 = egui::Color32::from_rgb(244, 244, 244);
pub const GOLD: egui::Color32 = egui::Color32::from_rgb(255, 205, 117);
pub const MINT: egui::Color32 = egui::Color32::from_rgb(56, 183, 100);
pub const CHERRY: egui::Color32 = egui::Color32::from_rgb(177, 62, 83);
pub const SKY: egui::Color32 = egui::Color32::from_rgb(65, 166, 246);

/// Flat, blocky visuals in a limited arcade palette.
pub fn retro_visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    let square = egui::Rounding::same(0.0);

    visuals.window_fill = NIGHT;
    visuals.panel_fill = NIGHT;
    visuals.extreme_bg_color = PANEL;
    visuals.override_text_color = Some(INK);
    visuals.window_rounding = square;

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
    ] {
        widget.rounding = square;
    }
    visuals.widgets.inactive.bg_fill = PANEL;
    visuals.widgets.inactive.weak_bg_fill = PANEL;
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(2.0, GOLD);
    visuals.widgets.hovered.bg_fill = SKY;
    visuals.widgets.hovered.weak_bg_fill = SKY;
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(2.0, INK);
    visuals.widgets.active.bg_fill = GOLD;
    visuals.widgets.active.weak_bg_fill = GOLD;

    visuals.selection.bg_fill = SKY;
    visuals.warn_fg_color = GOLD;
    visuals.error_fg_color = CHERRY;
    visuals
}

pub fn apply(ctx: &egui::Context) {
    ctx.set_visuals(retro_visuals());
    let mut style = (*ctx.style()).clone();
    for (text_style, font) in style.text_styles.iter_mut() {
        font.family = egui::FontFamily::Monospace;
        font.size = match text_style {
            egui::TextStyle::Heading => 26.0,
            egui::TextStyle::Button => 18.0,
            egui::TextStyle::Small => 12.0,
            _ => 16.0,
        };
    }
    style.spacing.button_padding = egui::vec2(14.0, 8.0);
    ctx.set_style(style);
}
