//! Main egui application — composes all panels and drives the session.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use egui::{self, Align, CentralPanel, Layout, RichText, ScrollArea, SidePanel, TopBottomPanel};

use persona_core::event_bus::EventBus;
use persona_core::generator::PersonaGenerator;
use persona_core::session::PersonaSessionController;
use persona_platform::llm::build_generation_port;
use persona_types::config::AppConfig;
use persona_ui::panels::settings::SettingsAction;
use persona_ui::panels::{card, history, input, settings};
use persona_ui::state::{FontStatus, SessionAction, UiState};
use persona_ui::theme;

const CJK_FONT_URL: &str = "NotoSansSC-Regular.otf";

/// The main application state
pub struct PersonaApp {
    ui_state: UiState,
    config: AppConfig,
    event_bus: EventBus,
    controller: Rc<RefCell<PersonaSessionController>>,
    generator: Rc<PersonaGenerator>,
    first_frame: bool,
    font_status: Rc<Cell<FontStatus>>,
}

impl PersonaApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::from_env();
        if config.llm.credential().is_err() {
            log::warn!("API_KEY was not set at build time; enter a key in Settings");
        }

        let event_bus = EventBus::new();
        let controller = PersonaSessionController::new(&config.session, event_bus.clone());
        let generator = Self::build_generator(&config);

        Self {
            ui_state: UiState::new(),
            config,
            event_bus,
            controller: Rc::new(RefCell::new(controller)),
            generator,
            first_frame: true,
            font_status: Rc::new(Cell::new(FontStatus::Loading)),
        }
    }

    fn build_generator(config: &AppConfig) -> Rc<PersonaGenerator> {
        let port = build_generation_port(&config.llm);
        log::info!(
            "Generation provider: {} ({})",
            port.provider_name(),
            config.llm.model
        );
        Rc::new(PersonaGenerator::new(port, &config.llm))
    }

    /// Download the CJK font in the background and report progress through
    /// `status`.
    fn load_cjk_font(ctx: egui::Context, status: Rc<Cell<FontStatus>>) {
        wasm_bindgen_futures::spawn_local(async move {
            match fetch_bytes(CJK_FONT_URL).await {
                Ok(bytes) => {
                    install_cjk_font(&ctx, bytes);
                    status.set(FontStatus::Ready);
                    log::info!("CJK font loaded from {}", CJK_FONT_URL);
                }
                Err(e) => {
                    status.set(FontStatus::Failed);
                    log::warn!("Failed to load CJK font from {}: {:?}", CJK_FONT_URL, e);
                }
            }
            ctx.request_repaint();
        });
    }

    fn paint_background(&self, ctx: &egui::Context) {
        let controller = self.controller.borrow();
        let stops = match &controller.state().active_persona {
            Some(persona) => theme::palette(&persona.colors),
            None => vec![theme::BG_DEFAULT_START, theme::BG_DEFAULT_END],
        };
        let painter = ctx.layer_painter(egui::LayerId::background());
        theme::paint_gradient_rect(&painter, ctx.screen_rect(), &stops);
    }
}

impl eframe::App for PersonaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            Self::load_cjk_font(ctx.clone(), self.font_status.clone());
            self.first_frame = false;
        }

        self.ui_state.font = self.font_status.get();

        // Drain events from the session controller
        if self.event_bus.has_pending() {
            self.ui_state.process_events(self.event_bus.drain());
            ctx.request_repaint();
        }

        if self.controller.borrow().state().is_loading {
            ctx.request_repaint();
        }

        self.paint_background(ctx);

        let mut actions = Vec::new();

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar")
            .frame(egui::Frame::NONE.inner_margin(theme::PANEL_PADDING))
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(self.ui_state.status_line())
                            .color(theme::TEXT_SECONDARY)
                            .small(),
                    );
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui
                            .selectable_label(self.ui_state.show_settings, "设置")
                            .clicked()
                        {
                            actions.push(SessionAction::ToggleSettings);
                        }
                        ui.label(
                            RichText::new(format!(
                                "{} · {}",
                                self.config.llm.provider.label(),
                                self.config.llm.model
                            ))
                            .color(theme::TEXT_MUTED)
                            .small(),
                        );
                    });
                });
            });

        // ── Settings side panel ──────────────────────────────
        if self.ui_state.show_settings {
            SidePanel::right("settings_panel")
                .min_width(280.0)
                .max_width(350.0)
                .show(ctx, |ui| {
                    if settings::settings_panel(ui, &mut self.config.llm) == SettingsAction::Changed {
                        self.generator = Self::build_generator(&self.config);
                    }
                });
        }

        // ── Main content ─────────────────────────────────────
        let scroll_to_top = self.ui_state.take_scroll_request();
        CentralPanel::default()
            .frame(egui::Frame::NONE.inner_margin(16.0))
            .show(ctx, |ui| {
                let mut scroll = ScrollArea::vertical().auto_shrink([false, false]);
                if scroll_to_top {
                    scroll = scroll.vertical_scroll_offset(0.0);
                }
                scroll.show(ui, |ui| {
                    ui.with_layout(Layout::top_down(Align::Center), |ui| {
                        let controller = self.controller.borrow();
                        let state = controller.state();

                        input::header(ui);
                        input::input_panel(ui, state, &mut actions);
                        ui.add_space(48.0);

                        if let Some(persona) = state.active_persona.as_ref().filter(|_| !state.is_loading) {
                            card::persona_card(ui, persona);
                        }

                        history::history_panel(ui, state, &mut actions);
                        footer(ui);
                    });
                });
            });

        for action in actions {
            self.apply(action, ctx);
        }
    }
}

impl PersonaApp {
    fn apply(&mut self, action: SessionAction, ctx: &egui::Context) {
        match action {
            SessionAction::EditInput(text) => self.controller.borrow_mut().edit_input(text),
            SessionAction::Submit => self.dispatch_submit(ctx),
            SessionAction::SelectHistory(timestamp) => {
                if !self.controller.borrow_mut().select_history(timestamp) {
                    log::warn!("History entry {} no longer exists", timestamp);
                }
            }
            SessionAction::ToggleSettings => {
                self.ui_state.show_settings = !self.ui_state.show_settings;
            }
        }
    }

    /// Start a generation for the current input (async). The controller is
    /// only borrowed before and after the await, never across it.
    fn dispatch_submit(&self, ctx: &egui::Context) {
        let pending = {
            let mut controller = self.controller.borrow_mut();
            let input = controller.state().input_text.clone();
            match controller.begin_submit(&input) {
                Ok(p) => p,
                Err(reason) => {
                    log::debug!("Submit rejected: {:?}", reason);
                    return;
                }
            }
        };

        let controller = self.controller.clone();
        let generator = self.generator.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let outcome = generator.generate(pending.name()).await;
            controller.borrow_mut().finish(pending, outcome);
            ctx.request_repaint();
        });
    }
}

fn footer(ui: &mut egui::Ui) {
    let year = js_sys::Date::new_0().get_full_year();
    ui.add_space(64.0);
    ui.label(
        RichText::new(format!("© {} {} · DESIGNED BY AI", year, input::TITLE))
            .small()
            .color(theme::TEXT_MUTED),
    );
    ui.add_space(24.0);
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let resp: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await?
        .dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", resp.status())));
    }
    let buf = JsFuture::from(resp.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Put the CJK face first for proportional text and last for monospace.
fn install_cjk_font(ctx: &egui::Context, bytes: Vec<u8>) {
    const NAME: &str = "noto_sans_sc";
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(NAME.to_owned(), egui::FontData::from_owned(bytes).into());
    for (family, first) in [
        (egui::FontFamily::Proportional, true),
        (egui::FontFamily::Monospace, false),
    ] {
        let faces = fonts.families.entry(family).or_default();
        if first {
            faces.insert(0, NAME.to_owned());
        } else {
            faces.push(NAME.to_owned());
        }
    }
    ctx.set_fonts(fonts);
}
