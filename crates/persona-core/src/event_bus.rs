//! Outbox of [`SessionEvent`]s from the session controller to the app shell.
//!
//! Every controller transition records one event here and the app takes the
//! whole batch once per frame. Events are logged as they are recorded.

use std::cell::RefCell;
use std::rc::Rc;

use persona_types::event::SessionEvent;

#[derive(Clone, Default)]
pub struct EventBus {
    pending: Rc<RefCell<Vec<SessionEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: SessionEvent) {
        match &event {
            SessionEvent::SubmitFailed { message } => log::warn!("Submit failed: {}", message),
            SessionEvent::SubmitRejected { reason } => log::debug!("Submit rejected: {:?}", reason),
            other => log::info!("{:?}", other),
        }
        self.pending.borrow_mut().push(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    /// Forget undelivered events; used when the session is reset.
    pub fn clear(&self) {
        self.pending.borrow_mut().clear();
    }
}
