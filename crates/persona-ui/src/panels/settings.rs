//! Settings panel — generation provider, model, API key, watchdog.
//! Values live for the session only.

use egui::{self, RichText};
use persona_types::config::{LlmConfig, LlmProvider, DEFAULT_TIMEOUT_MS};
use crate::theme::*;

/// What the caller should do after rendering the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    /// Nothing changed
    None,
    /// A field was changed; the generation port must be rebuilt
    Changed,
}

/// Render the settings panel. Returns an action for the caller to handle.
pub fn settings_panel(ui: &mut egui::Ui, config: &mut LlmConfig) -> SettingsAction {
    let mut changed = false;

    egui::Frame::default()
        .fill(BG_DEFAULT_END)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.heading(RichText::new("设置").color(TEXT_PRIMARY));
            ui.separator();

            // Provider
            ui.label(RichText::new("Provider").color(TEXT_SECONDARY).small());
            let previous = config.provider;
            egui::ComboBox::from_id_salt("llm_provider")
                .selected_text(config.provider.label())
                .show_ui(ui, |ui| {
                    for p in LlmProvider::all() {
                        ui.selectable_value(&mut config.provider, *p, p.label());
                    }
                });
            if config.provider != previous {
                apply_provider_defaults(config, previous);
                changed = true;
            }

            ui.add_space(4.0);

            // Model
            ui.label(RichText::new("Model").color(TEXT_SECONDARY).small());
            if ui.text_edit_singleline(&mut config.model).changed() {
                changed = true;
            }

            ui.add_space(4.0);

            // API Key (masked)
            ui.label(RichText::new("API Key").color(TEXT_SECONDARY).small());
            let mut api_key = config.api_key.clone().unwrap_or_default();
            let api_key_edit = egui::TextEdit::singleline(&mut api_key)
                .password(true)
                .hint_text("API_KEY");
            if ui.add(api_key_edit).changed() {
                config.api_key = Some(api_key).filter(|k| !k.trim().is_empty());
                changed = true;
            }
            if config.credential().is_err() {
                ui.label(RichText::new("未配置密钥").color(ERROR_BORDER).small());
            }

            ui.add_space(4.0);

            // Custom base URL
            ui.label(RichText::new("API Base URL (optional)").color(TEXT_SECONDARY).small());
            let mut base_url = config.api_base.clone().unwrap_or_default();
            if ui
                .add(
                    egui::TextEdit::singleline(&mut base_url)
                        .hint_text(config.provider.default_base_url()),
                )
                .changed()
            {
                config.api_base = if base_url.trim().is_empty() {
                    None
                } else {
                    Some(base_url)
                };
                changed = true;
            }

            ui.add_space(4.0);

            // Temperature
            ui.label(RichText::new("Temperature").color(TEXT_SECONDARY).small());
            if ui
                .add(egui::Slider::new(&mut config.temperature, 0.0..=2.0))
                .changed()
            {
                changed = true;
            }

            // Watchdog
            ui.add_space(4.0);
            let mut watchdog = config.timeout_ms.is_some();
            if ui.checkbox(&mut watchdog, "Request timeout").changed() {
                config.timeout_ms = watchdog.then_some(DEFAULT_TIMEOUT_MS);
                changed = true;
            }
            if let Some(ms) = config.timeout_ms.as_mut() {
                let mut secs = *ms / 1000;
                if ui
                    .add(egui::Slider::new(&mut secs, 5..=300).suffix(" s"))
                    .changed()
                {
                    *ms = secs * 1000;
                    changed = true;
                }
            }
        });

    if changed {
        SettingsAction::Changed
    } else {
        SettingsAction::None
    }
}

/// Switch the model to the new provider's default unless the user had
/// typed a custom one.
pub fn apply_provider_defaults(config: &mut LlmConfig, previous: LlmProvider) {
    if config.model.trim().is_empty() || config.model == previous.default_model() {
        config.model = config.provider.default_model().to_string();
    }
    log::info!(
        "Provider switched: {} -> {} (model {:?})",
        previous.label(),
        config.provider.label(),
        config.model
    );
}
