//! The reconciliation engine as a reducer.
//!
//! All mutable UI state lives in [`State`]. Each host event goes through
//! [`update`], which takes the state by value and hands it back together with
//! an [`Effect`] telling the host whether its outputs changed.

use crate::model::config::ResetPolicy;
use crate::model::store::TaskStore;
use crate::model::task::{Direction, OrderChange, TreeNode};
use crate::model::view::{SelectAllState, ViewState};
use crate::ops::echo::{EchoState, EchoSuppressor, Inbound, Snapshot};
use crate::ops::{reorder_ops, select_ops, tree_ops};
use crate::parse::{self, ParseError, ValidationError};

/// Something the host or the user did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The host delivered (possibly unchanged) task data
    Inbound(Option<String>),
    /// Click on a task row
    ToggleNode(String),
    /// Click on a task's expander
    ToggleExpand(String),
    /// Click on the "select all" control
    ToggleSelectAll,
    ExpandAll,
    CollapseAll,
    /// Move button on a task row
    Move { id: String, direction: Direction },
    /// Drag gesture finished: `moved` was dropped at `target`'s position
    Drop { moved: String, target: String },
}

/// What the host should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Re-render only
    None,
    /// Outputs changed; the host should read them
    Notify,
}

/// Complete engine state: task store, UI state and echo bookkeeping.
#[derive(Debug, Clone)]
pub struct State {
    store: TaskStore,
    view: ViewState,
    echo: EchoSuppressor,
    pending_order: Vec<OrderChange>,
    parse_error: Option<ParseError>,
    dropped: Vec<ValidationError>,
    policy: ResetPolicy,
}

impl State {
    /// Start from the host's initial payload.
    pub fn new(raw: Option<&str>, policy: ResetPolicy) -> Self {
        let mut state = State {
            store: TaskStore::default(),
            view: ViewState::default(),
            echo: EchoSuppressor::default(),
            pending_order: Vec::new(),
            parse_error: None,
            dropped: Vec::new(),
            policy,
        };
        let snapshot = state.ingest(raw);
        state.echo.prime(snapshot);
        state
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn echo_state(&self) -> &EchoState {
        self.echo.state()
    }

    /// Set when the last inbound payload couldn't be parsed. The task list is
    /// empty in that case and the host should show a non-fatal indicator.
    pub fn parse_error(&self) -> Option<&ParseError> {
        self.parse_error.as_ref()
    }

    /// Records dropped by the last ingest
    pub fn dropped(&self) -> &[ValidationError] {
        &self.dropped
    }

    /// Fresh tree for rendering
    pub fn tree(&self) -> Vec<TreeNode> {
        tree_ops::build_tree(self.store.tasks())
    }

    pub fn select_all_state(&self) -> SelectAllState {
        select_ops::select_all_state(&self.view, &self.store)
    }

    /// Outbound selection payload
    pub fn selected_output(&self) -> Option<String> {
        parse::serialize_selected(&self.view.selected)
    }

    /// Outbound order-change payload. Read-once: the pending changes are
    /// cleared, so a second read without a new reorder returns None.
    pub fn take_order_output(&mut self) -> Option<String> {
        parse::serialize_order_changes(&self.take_order_changes())
    }

    /// Structured form of [`State::take_order_output`]. Also read-once.
    pub fn take_order_changes(&mut self) -> Vec<OrderChange> {
        std::mem::take(&mut self.pending_order)
    }

    /// Pending order changes without consuming them
    pub fn pending_order(&self) -> &[OrderChange] {
        &self.pending_order
    }

    // -----------------------------------------------------------------------
    // Event handling
    // -----------------------------------------------------------------------

    fn apply(&mut self, event: Event) -> Effect {
        match event {
            Event::Inbound(raw) => self.receive(raw.as_deref()),
            Event::ToggleNode(id) => {
                if select_ops::toggle_node(&mut self.view, &self.store, &id) {
                    Effect::Notify
                } else {
                    Effect::None
                }
            }
            Event::ToggleExpand(id) => {
                if !select_ops::toggle_expand(&mut self.view, &self.store, &id) {
                    tracing::debug!(id = %id, "expand ignored: not a parent task");
                }
                Effect::None
            }
            Event::ToggleSelectAll => {
                if select_ops::toggle_select_all(&mut self.view, &self.store) {
                    Effect::Notify
                } else {
                    Effect::None
                }
            }
            Event::ExpandAll => {
                select_ops::expand_all(&mut self.view, &self.store);
                Effect::None
            }
            Event::CollapseAll => {
                select_ops::collapse_all(&mut self.view);
                Effect::None
            }
            Event::Move { id, direction } => {
                let result = reorder_ops::move_step(&mut self.store, &id, direction);
                self.finish_reorder(result)
            }
            Event::Drop { moved, target } => {
                let result = reorder_ops::drop_onto(&mut self.store, &moved, &target);
                self.finish_reorder(result)
            }
        }
    }

    fn finish_reorder(
        &mut self,
        result: Result<Vec<OrderChange>, reorder_ops::MoveError>,
    ) -> Effect {
        match result {
            Ok(changes) if changes.is_empty() => Effect::None,
            Ok(changes) => {
                tracing::debug!(count = changes.len(), "reorder emitted order changes");
                self.pending_order = changes;
                self.echo.record_sent(Snapshot::of(self.store.tasks()));
                Effect::Notify
            }
            Err(e) => {
                tracing::debug!(error = %e, "reorder rejected");
                Effect::None
            }
        }
    }

    fn receive(&mut self, raw: Option<&str>) -> Effect {
        let snapshot = snapshot_of(raw);
        match self.echo.classify(snapshot) {
            Inbound::Unchanged => Effect::None,
            Inbound::Echo => {
                tracing::debug!("inbound update is our own echo; consumed");
                self.pending_order.clear();
                Effect::None
            }
            Inbound::Stale => {
                tracing::debug!("inbound update predates our reorder; keeping local order");
                self.pending_order.clear();
                Effect::None
            }
            Inbound::External { preserve_state } => {
                let before = self.view.selected.clone();
                self.ingest(raw);
                let policy = if preserve_state {
                    ResetPolicy::Partial
                } else {
                    self.policy
                };
                let removed = select_ops::reconcile_view(&mut self.view, &self.store, policy);
                tracing::debug!(?policy, removed, "external task list change ingested");
                if self.view.selected != before {
                    Effect::Notify
                } else {
                    Effect::None
                }
            }
        }
    }

    /// Replace the store from a payload. Returns the payload's snapshot.
    fn ingest(&mut self, raw: Option<&str>) -> Snapshot {
        match parse::load(raw) {
            Ok(loaded) => {
                let snapshot = Snapshot::of(&loaded.tasks);
                self.store = TaskStore::new(loaded.tasks);
                self.dropped = loaded.dropped;
                self.parse_error = None;
                snapshot
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not parse task data");
                self.store = TaskStore::default();
                self.dropped = Vec::new();
                self.parse_error = Some(e.clone());
                Snapshot::failed(e)
            }
        }
    }
}

fn snapshot_of(raw: Option<&str>) -> Snapshot {
    match parse::load(raw) {
        Ok(loaded) => Snapshot::of(&loaded.tasks),
        Err(e) => Snapshot::failed(e),
    }
}

impl Default for State {
    fn default() -> Self {
        State::new(None, ResetPolicy::default())
    }
}

/// Process one event. The state goes in by value and comes back out.
pub fn update(mut state: State, event: Event) -> (State, Effect) {
    let effect = state.apply(event);
    (state, effect)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
