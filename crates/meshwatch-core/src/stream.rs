// ── Reactive state streams ──
//
// Subscription type for consuming store changes.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::ComponentsState;

/// A subscription to the component-status store.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed`](Self::changed) or by converting to a `Stream`.
#[derive(Debug)]
pub struct StateStream {
    current: Arc<ComponentsState>,
    receiver: watch::Receiver<Arc<ComponentsState>>,
}

impl StateStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<ComponentsState>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// Snapshot as of the last `changed()` (or creation).
    pub fn current(&self) -> &Arc<ComponentsState> {
        &self.current
    }

    /// Latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Arc<ComponentsState> {
        self.receiver.borrow().clone()
    }

    /// `true` if the store changed since the last `changed()`.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next change. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<ComponentsState>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    ///
    /// The first item is the current state.
    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot per store change.
pub struct StateWatchStream {
    inner: WatchStream<Arc<ComponentsState>>,
}

impl Stream for StateWatchStream {
    type Item = Arc<ComponentsState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
