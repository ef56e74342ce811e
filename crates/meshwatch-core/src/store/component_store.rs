// ── ComponentStore ──
//
// Holds the current state behind a watch channel. Dispatches are
// serialized by the channel's internal lock; readers get `Arc` snapshots.

use std::sync::Arc;

use meshwatch_api::StatusPayload;
use tokio::sync::watch;
use tracing::trace;

use super::action::Action;
use super::reducer::reduce;
use super::state::ComponentsState;
use crate::error::CoreError;
use crate::model::StatusUpdate;
use crate::stream::StateStream;

/// Reactive container for [`ComponentsState`].
#[derive(Debug)]
pub struct ComponentStore {
    state: watch::Sender<Arc<ComponentsState>>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::with_state(ComponentsState::default())
    }

    pub fn with_state(initial: ComponentsState) -> Self {
        let (state, _) = watch::channel(Arc::new(initial));
        Self { state }
    }

    /// Run `action` through the reducer. Subscribers are only woken when
    /// the state actually changed.
    pub fn dispatch(&self, action: Action) {
        let label = action.to_string();
        let changed = self.state.send_if_modified(|current| {
            let next = reduce((**current).clone(), action);
            if next == **current {
                false
            } else {
                *current = Arc::new(next);
                true
            }
        });
        trace!(action = %label, changed, "dispatched");
    }

    /// Validate and merge a status update.
    ///
    /// A payload without an operator section is rejected and the state is
    /// left untouched.
    pub fn update_connection_status(&self, payload: StatusPayload) -> Result<(), CoreError> {
        let update = StatusUpdate::try_from(payload)?;
        self.dispatch(Action::UpdateConnectionStatus(update));
        Ok(())
    }

    /// Current state.
    pub fn snapshot(&self) -> Arc<ComponentsState> {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new()
    }
}
