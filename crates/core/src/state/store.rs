//! Observable state container driven by actions

use std::sync::Arc;
use tokio::sync::watch;

/// State that evolves through a pure transition function
pub trait Reducible: Clone + Send + Sync + 'static {
    /// Message describing one change
    type Action: std::fmt::Debug;

    /// Returns the state that results from applying `action`
    fn reduce(&self, action: Self::Action) -> Self;
}

/// Holds the current state and publishes every transition
///
/// Clones share the same state. Subscribers see the latest value only, so
/// intermediate states may be skipped by slow observers.
#[derive(Clone)]
pub struct Store<S: Reducible> {
    tx: Arc<watch::Sender<S>>,
}

impl<S: Reducible> Store<S> {
    /// Creates a store with an initial state
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Applies an action and notifies subscribers
    pub fn dispatch(&self, action: S::Action) {
        log::trace!("dispatch {:?}", action);
        self.tx.send_modify(|state| *state = state.reduce(action));
    }

    /// Returns a snapshot of the current state
    pub fn state(&self) -> S {
        self.tx.borrow().clone()
    }

    /// Subscribes to state changes
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }
}

impl<S: Reducible + Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Reducible + std::fmt::Debug> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("state", &*self.tx.borrow()).finish()
    }
}
