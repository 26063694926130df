// ── Central store ──
//
// Single writer, many readers. Reductions run under the `watch` sender's
// write lock, so two actions are never reduced concurrently; readers get
// `Arc` snapshots that never change underneath them. The action feed is
// published under the same lock, so its order is the reduction order.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::trace;

use super::reducer::reduce;
use super::state::RootState;
use crate::action::Action;

const ACTION_CHANNEL_SIZE: usize = 256;

/// Shared handle to the store. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    state: Arc<watch::Sender<Arc<RootState>>>,
    actions: broadcast::Sender<Arc<Action>>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(RootState::new())
    }

    /// Start from an existing snapshot.
    pub fn with_state(state: RootState) -> Self {
        let (tx, _) = watch::channel(Arc::new(state));
        let (actions, _) = broadcast::channel(ACTION_CHANNEL_SIZE);
        Self {
            state: Arc::new(tx),
            actions,
        }
    }

    /// Reduce `action` into the store and return the resulting snapshot.
    pub fn dispatch(&self, action: &Action) -> Arc<RootState> {
        let mut reduced = Arc::default();
        self.state.send_modify(|state| {
            *state = Arc::new(reduce(state, action));
            reduced = Arc::clone(state);
            // No receivers is fine.
            let _ = self.actions.send(Arc::new(action.clone()));
        });
        trace!(action = %action.action_type(), "state updated");
        reduced
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<RootState> {
        self.state.borrow().clone()
    }

    /// Subscribe to every snapshot produced from now on.
    pub fn subscribe(&self) -> StoreSubscription {
        StoreSubscription::new(self.state.subscribe())
    }

    /// Every action reduced from now on, in reduction order.
    pub fn actions(&self) -> broadcast::Receiver<Arc<Action>> {
        self.actions.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("receivers", &self.state.receiver_count())
            .finish_non_exhaustive()
    }
}

/// A subscription to store snapshots.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed). Intermediate snapshots may be
/// skipped when several reductions land between two polls.
pub struct StoreSubscription {
    current: Arc<RootState>,
    receiver: watch::Receiver<Arc<RootState>>,
}

impl StoreSubscription {
    fn new(receiver: watch::Receiver<Arc<RootState>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time or by the last `changed()`.
    pub fn current(&self) -> &Arc<RootState> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<RootState> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if every store handle has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<RootState>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mdmconsole_api::{QueryParameters, RequestDescriptor, ResourceKind};

    #[tokio::test]
    async fn dispatch_notifies_subscribers() {
        let store = Store::new();
        let mut sub = store.subscribe();
        assert!(!sub.current().resource(ResourceKind::Tags).unwrap().loading);

        let descriptor =
            RequestDescriptor::index(ResourceKind::Tags, &QueryParameters::new()).unwrap();
        let reduced = store.dispatch(&Action::request(&descriptor));
        assert!(reduced.resource(ResourceKind::Tags).unwrap().loading);

        let seen = sub.changed().await.unwrap();
        assert_eq!(seen, reduced);
        assert_eq!(store.snapshot(), reduced);
    }

    #[test]
    fn action_feed_preserves_order() {
        let store = Store::new();
        let mut feed = store.actions();
        let descriptor = RequestDescriptor::read(ResourceKind::Tags, "4");
        store.dispatch(&Action::request(&descriptor));
        store.dispatch(&Action::success(
            &descriptor,
            mdmconsole_api::Document::NoContent,
        ));

        assert_eq!(feed.try_recv().unwrap().action_type(), "tags/READ_REQUEST");
        assert_eq!(feed.try_recv().unwrap().action_type(), "tags/READ_SUCCESS");
        assert!(feed.try_recv().is_err());
    }

    #[test]
    fn action_feed_matches_reduction_order_across_threads() {
        use mdmconsole_api::{DetailResponse, Document, ResourceObject};

        use crate::action::ActionPhase;

        const THREADS: usize = 4;
        const PER_THREAD: usize = 50;

        let store = Store::new();
        let mut feed = store.actions();
        let create = RequestDescriptor::create(ResourceKind::Tags, serde_json::Map::new());

        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let (store, create) = (&store, &create);
                scope.spawn(move || {
                    for n in 0..PER_THREAD {
                        let detail = DetailResponse {
                            data: ResourceObject::new(format!("{t}-{n}"), "tags"),
                            included: Vec::new(),
                            links: None,
                            meta: None,
                        };
                        store.dispatch(&Action::success(create, Document::Detail(detail)));
                    }
                });
            }
        });

        let mut published = Vec::new();
        while let Ok(action) = feed.try_recv() {
            if let ActionPhase::Success(Document::Detail(ref detail)) = action.phase {
                published.push(detail.data.id.to_string());
            }
        }
        assert_eq!(published.len(), THREADS * PER_THREAD);

        // Creates prepend, so the item list is the reduction order reversed.
        let snapshot = store.snapshot();
        let mut reduced: Vec<String> = snapshot
            .resource(ResourceKind::Tags)
            .unwrap()
            .items
            .iter()
            .map(|item| item.id.to_string())
            .collect();
        reduced.reverse();
        assert_eq!(published, reduced);
    }

    #[test]
    fn snapshots_are_immutable() {
        let store = Store::new();
        let before = store.snapshot();
        let descriptor = RequestDescriptor::read(ResourceKind::Devices, "1");
        store.dispatch(&Action::request(&descriptor));

        assert!(!before.resource(ResourceKind::Devices).unwrap().loading);
        assert!(store.snapshot().resource(ResourceKind::Devices).unwrap().loading);
    }
}
