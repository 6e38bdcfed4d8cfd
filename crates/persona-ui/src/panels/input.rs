//! Header, name input and error banner.

use egui::{self, Align, Layout, RichText, Vec2};
use persona_core::session::SessionState;
use crate::state::SessionAction;
use crate::theme::*;

pub const TITLE: &str = "名字色彩实验室";
pub const SUBTITLE: &str = "每一个名字，都有一抹专属的色彩与灵魂";
pub const PLACEHOLDER: &str = "输入你的名字...";
pub const SUBMIT_LABEL: &str = "寻找灵感";
pub const LOADING_LABEL: &str = "编织中...";

/// Label of the submit button for the current state
pub fn submit_label(state: &SessionState) -> &'static str {
    if state.is_loading {
        LOADING_LABEL
    } else {
        SUBMIT_LABEL
    }
}

pub fn header(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(32.0);
        ui.label(
            RichText::new(TITLE)
                .size(40.0)
                .strong()
                .color(TEXT_PRIMARY),
        );
        ui.add_space(8.0);
        ui.label(RichText::new(SUBTITLE).size(18.0).color(TEXT_SECONDARY));
        ui.add_space(32.0);
    });
}

/// Render the input form. Pushes an `EditInput` when the text changes and a
/// `Submit` on Enter or button click.
pub fn input_panel(ui: &mut egui::Ui, state: &SessionState, actions: &mut Vec<SessionAction>) {
    let mut text = state.input_text.clone();

    ui.allocate_ui_with_layout(
        Vec2::new(ui.available_width().min(560.0), 0.0),
        Layout::top_down(Align::Center),
        |ui| {
            ui.horizontal(|ui| {
                let input = egui::TextEdit::singleline(&mut text)
                    .hint_text(PLACEHOLDER)
                    .desired_width(ui.available_width() - 150.0)
                    .margin(Vec2::new(16.0, 12.0))
                    .font(egui::FontId::proportional(18.0));

                let response = ui.add_enabled(!state.is_loading, input);
                if response.changed() {
                    actions.push(SessionAction::EditInput(text.clone()));
                }

                let can_submit = !state.is_loading && !text.trim().is_empty();
                let button = ui.add_enabled(
                    can_submit,
                    egui::Button::new(
                        RichText::new(submit_label(state))
                            .color(BUTTON_TEXT)
                            .strong()
                            .size(16.0),
                    )
                    .fill(BUTTON_FILL)
                    .corner_radius(PANEL_ROUNDING)
                    .min_size(Vec2::new(140.0, 44.0)),
                );

                let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if (enter && can_submit) || button.clicked() {
                    actions.push(SessionAction::Submit);
                }
            });

            if let Some(message) = state.error_message() {
                ui.add_space(12.0);
                error_banner(ui, &message);
            }
        },
    );
}

fn error_banner(ui: &mut egui::Ui, message: &str) {
    egui::Frame::default()
        .fill(ERROR_BG)
        .stroke(egui::Stroke::new(1.0, ERROR_BORDER))
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(message).color(ERROR_TEXT).strong());
            });
        });
}
