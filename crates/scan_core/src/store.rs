use std::sync::mpsc;

use crate::{update, AppState, AppViewModel, Effect, Msg};

/// Owns the live [`AppState`] and fans out a view snapshot after every
/// dispatch that changed something.
///
/// Subscribers get an immutable [`AppViewModel`] over a channel; a subscriber
/// whose receiver was dropped is pruned on the next publish.
#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
    subscribers: Vec<mpsc::Sender<AppViewModel>>,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Registers a new subscriber. The current view is delivered right away so
    /// the subscriber can draw before the first change.
    pub fn subscribe(&mut self) -> mpsc::Receiver<AppViewModel> {
        let (tx, rx) = mpsc::channel();
        if tx.send(self.state.view()).is_ok() {
            self.subscribers.push(tx);
        }
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.view();
        let was_dirty = state.consume_dirty();
        self.state = state;
        if was_dirty {
            self.publish(view);
        }
        effects
    }

    fn publish(&mut self, view: AppViewModel) {
        self.subscribers.retain(|tx| tx.send(view.clone()).is_ok());
    }
}
