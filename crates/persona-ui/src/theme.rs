//! UI theme constants and gradient painting

use egui::{epaint::Mesh, Color32, CornerRadius, Painter, Pos2, Rect, Shape, Stroke, Vec2};

pub const BG_DEFAULT_START: Color32 = Color32::from_rgb(0x1e, 0x1e, 0x2e);
pub const BG_DEFAULT_END: Color32 = Color32::from_rgb(0x2a, 0x2a, 0x40);
pub const GLASS: Color32 = Color32::from_rgba_premultiplied(20, 20, 20, 20);
pub const GLASS_BORDER: Color32 = Color32::from_rgba_premultiplied(40, 40, 40, 40);
pub const TEXT_PRIMARY: Color32 = Color32::WHITE;
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(200, 200, 210);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(140, 140, 150);
pub const BUTTON_FILL: Color32 = Color32::WHITE;
pub const BUTTON_TEXT: Color32 = Color32::from_rgb(17, 24, 39);
pub const ERROR_BG: Color32 = Color32::from_rgb(80, 20, 24);
pub const ERROR_BORDER: Color32 = Color32::from_rgb(239, 68, 68);
pub const ERROR_TEXT: Color32 = Color32::from_rgb(254, 202, 202);
pub const CHIP_BG: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 77);

pub const CARD_ROUNDING: CornerRadius = CornerRadius::same(24);
pub const PANEL_ROUNDING: CornerRadius = CornerRadius::same(12);
pub const PILL_ROUNDING: CornerRadius = CornerRadius::same(255);
pub const PANEL_PADDING: Vec2 = Vec2::new(12.0, 8.0);

/// Apply the dark theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.dark_mode = true;
    style.visuals.panel_fill = Color32::TRANSPARENT;
    style.visuals.window_fill = BG_DEFAULT_END;
    style.visuals.extreme_bg_color = GLASS;

    style.visuals.widgets.inactive.bg_fill = GLASS;
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    style.visuals.widgets.hovered.bg_fill = GLASS_BORDER;
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);

    style.visuals.selection.stroke = Stroke::new(1.0, TEXT_PRIMARY);

    style.spacing.item_spacing = Vec2::new(8.0, 6.0);

    ctx.set_style(style);
}

/// `#RRGGBB` (either case) to a color; anything else is `None`.
pub fn parse_hex_color(s: &str) -> Option<Color32> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Palette of a persona as colors; unparsable entries are skipped and an
/// empty result falls back to the default background.
pub fn palette(colors: &[String]) -> Vec<Color32> {
    let parsed: Vec<Color32> = colors.iter().filter_map(|c| parse_hex_color(c)).collect();
    if parsed.is_empty() {
        vec![BG_DEFAULT_START, BG_DEFAULT_END]
    } else {
        parsed
    }
}

pub fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        mix(a.r(), b.r()),
        mix(a.g(), b.g()),
        mix(a.b(), b.b()),
        mix(a.a(), b.a()),
    )
}

/// Color at position `t` in 0..=1 across evenly spaced stops.
pub fn gradient_at(stops: &[Color32], t: f32) -> Color32 {
    match stops {
        [] => Color32::TRANSPARENT,
        [only] => *only,
        _ => {
            let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
            let i = (scaled.floor() as usize).min(stops.len() - 2);
            lerp_color(stops[i], stops[i + 1], scaled - i as f32)
        }
    }
}

/// Fill `rect` with a diagonal (top-left → bottom-right) gradient.
pub fn paint_gradient_rect(painter: &Painter, rect: Rect, stops: &[Color32]) {
    let mut mesh = Mesh::default();
    let corners = [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()];
    for corner in corners {
        mesh.colored_vertex(corner, gradient_at(stops, diagonal_t(rect, corner)));
    }
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    painter.add(Shape::mesh(mesh));
}

/// Fill a circle with the same diagonal gradient, as a triangle fan.
pub fn paint_gradient_circle(painter: &Painter, center: Pos2, radius: f32, stops: &[Color32]) {
    const SEGMENTS: u32 = 64;
    let bounds = Rect::from_center_size(center, Vec2::splat(radius * 2.0));

    let mut mesh = Mesh::default();
    mesh.colored_vertex(center, gradient_at(stops, 0.5));
    for i in 0..SEGMENTS {
        let angle = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
        let p = center + Vec2::angled(angle) * radius;
        mesh.colored_vertex(p, gradient_at(stops, diagonal_t(bounds, p)));
    }
    for i in 0..SEGMENTS {
        let next = (i + 1) % SEGMENTS;
        mesh.add_triangle(0, i + 1, next + 1);
    }
    painter.add(Shape::mesh(mesh));
}

fn diagonal_t(rect: Rect, p: Pos2) -> f32 {
    let span = rect.width() + rect.height();
    if span <= 0.0 {
        return 0.0;
    }
    ((p.x - rect.left()) + (p.y - rect.top())) / span
}
