use std::sync::Arc;

use tracing::debug;

use crate::{reducer::Transition, state::LocalState};

/// Observer of state snapshots, e.g. a renderer.
pub trait RenderSink {
    fn render(&mut self, state: &LocalState);
}

impl<F> RenderSink for F
where
    F: FnMut(&LocalState),
{
    fn render(&mut self, state: &LocalState) {
        self(state)
    }
}

/// Holds the one current snapshot. Every write replaces the snapshot wholesale and then renders
/// it to every sink before returning, so sinks never see a half-applied transition.
pub struct StateStore {
    state: Arc<LocalState>,
    sinks: Vec<Box<dyn RenderSink + Send>>,
}

impl StateStore {
    pub fn new() -> Self {
        StateStore {
            state: Arc::new(LocalState::default()),
            sinks: Vec::new(),
        }
    }

    pub fn state(&self) -> &LocalState {
        &self.state
    }

    /// Shared handle to the current snapshot; stays valid after later writes.
    pub fn snapshot(&self) -> Arc<LocalState> {
        self.state.clone()
    }

    pub fn subscribe(&mut self, sink: impl RenderSink + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn apply<F>(&mut self, transition: F)
    where
        F: FnOnce(&LocalState) -> LocalState,
    {
        self.state = Arc::new(transition(&self.state));
        for sink in self.sinks.iter_mut() {
            sink.render(&self.state);
        }
    }

    /// Apply a batch of transitions as one write with a single render pass.
    pub fn dispatch(&mut self, transitions: &[Transition]) {
        if transitions.is_empty() {
            return;
        }
        debug!("Applying {:?}", transitions);
        self.apply(|state| {
            transitions
                .iter()
                .fold(state.clone(), |acc, transition| transition.apply(&acc))
        });
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
