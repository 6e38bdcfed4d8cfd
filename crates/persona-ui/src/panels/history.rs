//! History grid — one tile per earlier persona, clicking re-displays it.

use egui::{self, RichText, Sense, Vec2};
use persona_core::session::SessionState;
use crate::panels::card::avatar;
use crate::state::SessionAction;
use crate::theme::*;

pub const HEADING: &str = "历史灵感回响";

const TILE_SIZE: Vec2 = Vec2::new(190.0, 56.0);

pub fn history_panel(ui: &mut egui::Ui, state: &SessionState, actions: &mut Vec<SessionAction>) {
    if state.history.is_empty() {
        return;
    }

    ui.add_space(48.0);
    ui.label(RichText::new(HEADING).size(20.0).color(TEXT_MUTED));
    ui.add_space(16.0);

    let active = state.active_persona.as_ref().map(|p| p.timestamp);

    ui.horizontal_wrapped(|ui| {
        for record in &state.history {
            let selected = active == Some(record.timestamp);
            let stroke = if selected { TEXT_SECONDARY } else { GLASS_BORDER };

            let response = egui::Frame::default()
                .fill(GLASS)
                .stroke(egui::Stroke::new(1.0, stroke))
                .corner_radius(PANEL_ROUNDING)
                .inner_margin(PANEL_PADDING)
                .show(ui, |ui| {
                    ui.set_min_size(TILE_SIZE - PANEL_PADDING * 2.0);
                    ui.horizontal(|ui| {
                        avatar(ui, &record.initial(), &palette(&record.colors), 16.0, 12.0);
                        ui.vertical(|ui| {
                            ui.label(RichText::new(&record.name).strong().color(TEXT_PRIMARY));
                            ui.label(RichText::new(&record.mood).small().color(TEXT_MUTED));
                        });
                    });
                })
                .response
                .interact(Sense::click())
                .on_hover_cursor(egui::CursorIcon::PointingHand);

            if response.clicked() {
                actions.push(SessionAction::SelectHistory(record.timestamp));
            }
        }
    });
}
