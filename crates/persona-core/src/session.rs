//! Session controller — the state machine behind the page.
//!
//! A submission is split in two so no borrow of the controller is held while
//! the generation call is outstanding:
//! 1. `begin_submit` checks the guard, enters loading and hands out a
//!    [`PendingSubmission`]
//! 2. the caller awaits [`PersonaGenerator::generate`]
//! 3. `finish` consumes the ticket and applies the outcome
//!
//! Only one ticket can exist at a time because `begin_submit` refuses while
//! loading.

use std::rc::Rc;

use persona_types::{
    PersonaError, Result,
    config::SessionConfig,
    event::{RejectReason, SessionEvent},
    persona::{PersonaFields, PersonaRecord},
};

use crate::event_bus::EventBus;
use crate::generator::PersonaGenerator;
use crate::ports::{Clock, SystemClock};

/// Everything the UI binds to
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub input_text: String,
    pub active_persona: Option<Rc<PersonaRecord>>,
    /// Most recent first
    pub history: Vec<Rc<PersonaRecord>>,
    pub is_loading: bool,
    pub last_error: Option<PersonaError>,
}

impl SessionState {
    /// Banner text for the current error, if any
    pub fn error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(PersonaError::user_message)
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading && !self.input_text.trim().is_empty()
    }
}

/// Proof that a submission was accepted; consumed by `finish`.
#[derive(Debug)]
pub struct PendingSubmission {
    name: String,
}

impl PendingSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of applying a finished generation
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Generated(Rc<PersonaRecord>),
    Failed(PersonaError),
    Rejected(RejectReason),
}

pub struct PersonaSessionController {
    state: SessionState,
    capacity: usize,
    clock: Box<dyn Clock>,
    event_bus: EventBus,
    last_timestamp: u64,
}

impl PersonaSessionController {
    pub fn new(config: &SessionConfig, event_bus: EventBus) -> Self {
        Self::with_clock(config, event_bus, Box::new(SystemClock))
    }

    pub fn with_clock(config: &SessionConfig, event_bus: EventBus, clock: Box<dyn Clock>) -> Self {
        Self {
            state: SessionState::default(),
            capacity: config.effective_capacity(),
            clock,
            event_bus,
            last_timestamp: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Idle → Loading, if the trimmed name is non-empty and nothing is in
    /// flight. A refused submit changes nothing but the event log.
    pub fn begin_submit(&mut self, name: &str) -> std::result::Result<PendingSubmission, RejectReason> {
        if self.state.is_loading {
            log::debug!("Submit ignored: generation already in flight");
            self.event_bus.emit(SessionEvent::SubmitRejected {
                reason: RejectReason::AlreadyLoading,
            });
            return Err(RejectReason::AlreadyLoading);
        }

        let name = name.trim();
        if name.is_empty() {
            self.event_bus.emit(SessionEvent::SubmitRejected {
                reason: RejectReason::EmptyName,
            });
            return Err(RejectReason::EmptyName);
        }

        self.state.last_error = None;
        self.state.is_loading = true;
        self.event_bus.emit(SessionEvent::SubmitStarted {
            name: name.to_string(),
        });
        log::debug!("Submit accepted for {:?}", name);

        Ok(PendingSubmission {
            name: name.to_string(),
        })
    }

    /// Loading → Idle, applying the outcome of the generation call.
    pub fn finish(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<PersonaFields>,
    ) -> SubmitOutcome {
        self.state.is_loading = false;

        match outcome {
            Ok(fields) => {
                let timestamp = self.next_timestamp();
                let record = Rc::new(PersonaRecord::new(pending.name, fields, timestamp));

                self.state.active_persona = Some(record.clone());
                self.state.history.insert(0, record.clone());
                self.state.history.truncate(self.capacity);
                self.state.input_text.clear();

                self.event_bus.emit(SessionEvent::PersonaGenerated {
                    name: record.name.clone(),
                    timestamp,
                });
                SubmitOutcome::Generated(record)
            }
            Err(err) => {
                log::warn!("Generation for {:?} failed: {}", pending.name, err);
                self.event_bus.emit(SessionEvent::SubmitFailed {
                    message: err.user_message(),
                });
                self.state.last_error = Some(err.clone());
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Submit the current input and await the result in one step.
    ///
    /// Holding `&mut self` across the await is fine for tests and for
    /// callers that own the controller outright; the app uses
    /// `begin_submit`/`finish` instead.
    pub async fn submit(&mut self, generator: &PersonaGenerator) -> SubmitOutcome {
        let input = self.state.input_text.clone();
        let pending = match self.begin_submit(&input) {
            Ok(p) => p,
            Err(reason) => return SubmitOutcome::Rejected(reason),
        };
        let outcome = generator.generate(pending.name()).await;
        self.finish(pending, outcome)
    }

    /// Update the input; any visible error goes away as soon as the user
    /// edits. Ignored while loading, when the input is disabled.
    pub fn edit_input(&mut self, text: impl Into<String>) {
        if self.state.is_loading {
            return;
        }
        let text = text.into();
        if text != self.state.input_text {
            self.state.last_error = None;
        }
        self.state.input_text = text;
    }

    /// Show an existing history entry. Neither reorders nor duplicates.
    /// Returns false when no entry has that timestamp.
    pub fn select_history(&mut self, timestamp: u64) -> bool {
        let Some(record) = self
            .state
            .history
            .iter()
            .find(|r| r.timestamp == timestamp)
            .cloned()
        else {
            return false;
        };

        self.state.active_persona = Some(record);
        self.event_bus.emit(SessionEvent::HistorySelected { timestamp });
        true
    }

    /// Drop all state, e.g. between tests or on a "clear" action.
    pub fn reset(&mut self) {
        self.state = SessionState::default();
        self.last_timestamp = 0;
        self.event_bus.clear();
    }

    /// Clock reading bumped past the previous record so ids stay unique.
    fn next_timestamp(&mut self) -> u64 {
        let now = self.clock.now_millis();
        let ts = if now > self.last_timestamp {
            now
        } else {
            self.last_timestamp + 1
        };
        self.last_timestamp = ts;
        ts
    }
}
