//! Echo suppression for self-caused updates.
//!
//! After the engine reports a reorder, the host usually applies it and sends
//! the resulting task list straight back. That inbound update carries nothing
//! new, and ingesting it as an external change would reset UI state and could
//! re-trigger a notification. The suppressor remembers what was sent and
//! classifies the next inbound payload.

use crate::model::task::Task;
use crate::parse::ParseError;

/// Order-insensitive view of an inbound payload, used for equality checks.
///
/// Tasks are sorted by ID so a host that reorders records or reformats the
/// JSON still produces an equal snapshot. A payload that failed to parse keeps
/// its error so two different broken payloads don't compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    tasks: Vec<Task>,
    error: Option<ParseError>,
}

impl Snapshot {
    pub fn of(tasks: &[Task]) -> Self {
        let mut tasks = tasks.to_vec();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        Snapshot { tasks, error: None }
    }

    pub fn failed(error: ParseError) -> Self {
        Snapshot {
            tasks: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EchoState {
    Idle,
    AwaitingEcho { sent: Snapshot },
}

/// How an inbound payload should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Same as the last ingested payload; nothing to do
    Unchanged,
    /// The host reflected our own change back; consume silently
    Echo,
    /// The host re-sent the pre-change payload while we awaited an echo;
    /// keep local state
    Stale,
    /// A genuine external change. `preserve_state` is set when it arrived
    /// while an echo was pending, so UI state is pruned rather than reset.
    External { preserve_state: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoSuppressor {
    state: EchoState,
    last_seen: Option<Snapshot>,
}

impl Default for EchoSuppressor {
    fn default() -> Self {
        EchoSuppressor {
            state: EchoState::Idle,
            last_seen: None,
        }
    }
}

impl EchoSuppressor {
    pub fn state(&self) -> &EchoState {
        &self.state
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, EchoState::AwaitingEcho { .. })
    }

    /// Remember the initial payload without classifying it.
    pub fn prime(&mut self, snapshot: Snapshot) {
        self.last_seen = Some(snapshot);
        self.state = EchoState::Idle;
    }

    /// A self-caused change was just emitted; expect it back.
    pub fn record_sent(&mut self, sent: Snapshot) {
        self.state = EchoState::AwaitingEcho { sent };
    }

    /// Classify an inbound payload and advance the state machine.
    /// Every call leaves the suppressor idle.
    pub fn classify(&mut self, inbound: Snapshot) -> Inbound {
        let state = std::mem::replace(&mut self.state, EchoState::Idle);
        let matches_last = self.last_seen.as_ref() == Some(&inbound);

        let verdict = match state {
            EchoState::AwaitingEcho { sent } if sent == inbound => Inbound::Echo,
            EchoState::AwaitingEcho { .. } if matches_last => Inbound::Stale,
            EchoState::AwaitingEcho { .. } => Inbound::External {
                preserve_state: true,
            },
            EchoState::Idle if matches_last => Inbound::Unchanged,
            EchoState::Idle => Inbound::External {
                preserve_state: false,
            },
        };

        if matches!(verdict, Inbound::Echo | Inbound::External { .. }) {
            self.last_seen = Some(inbound);
        }
        verdict
    }
}
