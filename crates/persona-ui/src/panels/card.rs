//! Persona card — gradient avatar, mood badge, name, quote and color chips.

use egui::{self, RichText, Sense, Vec2};
use persona_types::persona::PersonaRecord;
use crate::theme::*;

pub fn persona_card(ui: &mut egui::Ui, persona: &PersonaRecord) {
    let stops = palette(&persona.colors);

    egui::Frame::default()
        .fill(GLASS)
        .stroke(egui::Stroke::new(1.0, GLASS_BORDER))
        .corner_radius(CARD_ROUNDING)
        .inner_margin(32.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width().min(860.0));
            ui.horizontal(|ui| {
                avatar(ui, &persona.initial(), &stops, 110.0, 64.0);
                ui.add_space(32.0);

                ui.vertical(|ui| {
                    mood_badge(ui, &persona.mood);
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(&persona.name)
                            .size(48.0)
                            .strong()
                            .color(TEXT_PRIMARY),
                    );
                    ui.add_space(12.0);
                    ui.label(
                        RichText::new(format!("“{}”", persona.quote))
                            .size(24.0)
                            .italics()
                            .color(TEXT_SECONDARY),
                    );
                    ui.add_space(24.0);
                    ui.horizontal_wrapped(|ui| {
                        for color in &persona.colors {
                            color_chip(ui, color);
                        }
                    });
                });
            });
        });
}

/// Gradient disc with a glyph in the middle. Also used by history entries.
pub fn avatar(ui: &mut egui::Ui, glyph: &str, stops: &[egui::Color32], radius: f32, font_size: f32) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(radius * 2.0), Sense::hover());
    let painter = ui.painter_at(rect);
    paint_gradient_circle(&painter, rect.center(), radius, stops);
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        glyph,
        egui::FontId::proportional(font_size),
        TEXT_PRIMARY,
    );
}

fn mood_badge(ui: &mut egui::Ui, mood: &str) {
    egui::Frame::default()
        .fill(GLASS_BORDER)
        .corner_radius(PILL_ROUNDING)
        .inner_margin(Vec2::new(14.0, 4.0))
        .show(ui, |ui| {
            ui.label(RichText::new(mood).strong().color(TEXT_PRIMARY));
        });
}

fn color_chip(ui: &mut egui::Ui, color: &str) {
    egui::Frame::default()
        .fill(CHIP_BG)
        .corner_radius(PILL_ROUNDING)
        .inner_margin(Vec2::new(6.0, 4.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(Vec2::splat(20.0), Sense::hover());
                let fill = parse_hex_color(color).unwrap_or(TEXT_MUTED);
                ui.painter().circle_filled(rect.center(), 10.0, fill);
                ui.label(
                    RichText::new(color.to_uppercase())
                        .monospace()
                        .small()
                        .color(TEXT_SECONDARY),
                );
            });
        });
}

