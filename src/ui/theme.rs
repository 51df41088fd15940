use egui::{Color32, FontId, Rounding, Stroke, Visuals};

/// Canvas colors for the timeline; everything else follows egui visuals.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_canvas: Color32,
    pub bg_row_alt: Color32,
    pub bg_header: Color32,
    pub border: Color32,
    pub grid_day: Color32,
    pub grid_hour: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_dim: Color32,
    pub drop_target: Color32,
}

pub const DARK: Palette = Palette {
    bg_canvas: Color32::from_rgb(24, 24, 32),
    bg_row_alt: Color32::from_rgb(30, 30, 40),
    bg_header: Color32::from_rgb(34, 37, 48),
    border: Color32::from_rgb(50, 52, 64),
    grid_day: Color32::from_rgb(70, 74, 92),
    grid_hour: Color32::from_rgb(40, 42, 54),
    text_primary: Color32::from_rgb(226, 229, 238),
    text_secondary: Color32::from_rgb(155, 160, 178),
    text_dim: Color32::from_rgb(100, 105, 120),
    drop_target: Color32::from_rgb(90, 140, 220),
};

pub const LIGHT: Palette = Palette {
    bg_canvas: Color32::from_rgb(250, 250, 252),
    bg_row_alt: Color32::from_rgb(242, 243, 247),
    bg_header: Color32::from_rgb(232, 234, 240),
    border: Color32::from_rgb(210, 212, 222),
    grid_day: Color32::from_rgb(170, 174, 190),
    grid_hour: Color32::from_rgb(228, 230, 236),
    text_primary: Color32::from_rgb(30, 32, 40),
    text_secondary: Color32::from_rgb(85, 90, 105),
    text_dim: Color32::from_rgb(140, 145, 160),
    drop_target: Color32::from_rgb(37, 99, 235),
};

pub fn palette(dark_mode: bool) -> Palette {
    if dark_mode {
        DARK
    } else {
        LIGHT
    }
}

pub const ACCENT: Color32 = Color32::from_rgb(86, 146, 226);
pub const TEXT_ON_BAR: Color32 = Color32::WHITE;
pub const SUCCESS: Color32 = Color32::from_rgb(34, 197, 94);
pub const ERROR: Color32 = Color32::from_rgb(239, 68, 68);

// Chart geometry in points.
pub const HEADER_HEIGHT: f32 = 42.0;
pub const LABEL_WIDTH: f32 = 120.0;
pub const BAR_ROUNDING: f32 = 4.0;

/// Registration labels and day headings.
pub fn font_header() -> FontId {
    FontId::proportional(12.5)
}

/// Hour ticks and lane sub-labels.
pub fn font_sub() -> FontId {
    FontId::monospace(10.0)
}

/// Flight number drawn inside a bar.
pub fn font_bar() -> FontId {
    FontId::proportional(11.0)
}

pub fn font_menu() -> FontId {
    FontId::proportional(13.0)
}

// ── Visuals ──────────────────────────────────────────────────────────────────

/// Widget fills for the inactive, hovered and active states.
fn widget_fills(dark_mode: bool) -> [Color32; 3] {
    if dark_mode {
        [
            Color32::from_rgb(40, 43, 55),
            Color32::from_rgb(50, 54, 70),
            Color32::from_rgb(58, 63, 80),
        ]
    } else {
        [
            Color32::from_rgb(228, 231, 238),
            Color32::from_rgb(214, 220, 232),
            Color32::from_rgb(200, 210, 228),
        ]
    }
}

/// Egui visuals tuned to the timeline palette, applied every frame.
pub fn apply_theme(ctx: &egui::Context, dark_mode: bool) {
    let p = palette(dark_mode);
    let mut visuals = if dark_mode {
        Visuals::dark()
    } else {
        Visuals::light()
    };

    visuals.override_text_color = Some(p.text_primary);
    visuals.panel_fill = p.bg_row_alt;
    visuals.window_fill = p.bg_row_alt;
    visuals.extreme_bg_color = p.bg_canvas;
    visuals.window_stroke = Stroke::new(1.0, p.border);
    visuals.window_rounding = Rounding::same(6.0);

    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, p.border);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, p.text_secondary);

    let [inactive, hovered, active] = widget_fills(dark_mode);
    let widgets = &mut visuals.widgets;
    for (w, fill) in [
        (&mut widgets.inactive, inactive),
        (&mut widgets.hovered, hovered),
        (&mut widgets.active, active),
    ] {
        w.bg_fill = fill;
        w.weak_bg_fill = fill;
        w.rounding = Rounding::same(BAR_ROUNDING);
    }
    widgets.hovered.bg_stroke = Stroke::new(1.0, p.drop_target);
    widgets.active.bg_stroke = Stroke::new(1.0, p.drop_target);

    visuals.selection.bg_fill = p.drop_target.gamma_multiply(0.25);
    visuals.selection.stroke = Stroke::new(1.0, p.drop_target);

    ctx.set_visuals(visuals);
    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(6.0, 4.0);
        style.spacing.button_padding = egui::vec2(6.0, 3.0);
    });
}
