use tracing::info;

use crate::types::ProcessingState;

pub type ProgressObserver = Box<dyn Fn(&ProcessingState) + Send + 'static>;

/// Push-style fan-out of processing state to whoever is watching a session.
#[derive(Default)]
pub struct ProgressHub {
    observers: Vec<ProgressObserver>,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, cb: impl Fn(&ProcessingState) + Send + 'static) {
        self.observers.push(Box::new(cb));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn emit(&self, state: &ProcessingState) {
        info!(
            phase = %state.phase,
            progress = state.progress,
            "{}",
            state.message
        );
        for cb in &self.observers {
            cb(state);
        }
    }
}

impl std::fmt::Debug for ProgressHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressHub")
            .field("observers", &self.observers.len())
            .finish()
    }
}
