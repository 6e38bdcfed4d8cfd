use serde::{Deserialize, Serialize};

/// Events emitted by the session controller.
/// The app drains these each frame for logging and the status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A submission passed the guard and a generation call is outstanding
    SubmitStarted { name: String },

    /// A submission was refused without any state change
    SubmitRejected { reason: RejectReason },

    /// A persona was created and became active
    PersonaGenerated { name: String, timestamp: u64 },

    /// The generation call failed; prior state kept
    SubmitFailed { message: String },

    /// An existing history entry became active
    HistorySelected { timestamp: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    EmptyName,
    AlreadyLoading,
}
