//! UI-level state that is not part of the session itself.
//! Updated each frame by draining the EventBus.

use persona_types::event::{RejectReason, SessionEvent};

/// What the user asked for during a frame. The app applies these to the
/// session controller after all panels have rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    EditInput(String),
    Submit,
    SelectHistory(u64),
    ToggleSettings,
}

/// Progress of the CJK font download. Until it lands, Chinese glyphs
/// render as boxes, so the status line stays in ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStatus {
    #[default]
    Loading,
    Ready,
    Failed,
}

pub const STATUS_FONT_LOADING: &str = "Loading fonts...";

/// State visible to UI panels
pub struct UiState {
    /// Whether settings panel is open
    pub show_settings: bool,
    /// Status line text
    pub status_text: String,
    /// Set when a history entry was picked so the page scrolls back up
    pub scroll_to_top: bool,
    pub font: FontStatus,
}

pub const STATUS_READY: &str = "准备就绪";

impl UiState {
    pub fn new() -> Self {
        Self {
            show_settings: false,
            status_text: STATUS_READY.to_string(),
            scroll_to_top: false,
            font: FontStatus::Loading,
        }
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::SubmitStarted { name } => {
                    self.status_text = format!("正在为「{}」编织灵感...", name);
                }
                SessionEvent::SubmitRejected { reason } => {
                    if reason == RejectReason::AlreadyLoading {
                        self.status_text = "上一次请求仍在进行中".to_string();
                    }
                }
                SessionEvent::PersonaGenerated { name, .. } => {
                    self.status_text = format!("「{}」的灵感已生成", name);
                    self.scroll_to_top = true;
                }
                SessionEvent::SubmitFailed { message } => {
                    self.status_text = message;
                }
                SessionEvent::HistorySelected { .. } => {
                    self.status_text = STATUS_READY.to_string();
                    self.scroll_to_top = true;
                }
            }
        }
    }

    /// Text for the top bar; held at a font notice until glyphs are available.
    pub fn status_line(&self) -> &str {
        match self.font {
            FontStatus::Loading => STATUS_FONT_LOADING,
            FontStatus::Ready | FontStatus::Failed => &self.status_text,
        }
    }

    /// Returns and clears the pending scroll request
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_top)
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
