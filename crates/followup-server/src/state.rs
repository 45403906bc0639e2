use std::sync::{Arc, Mutex};

use followup_core::Engine;

/// Shared application state passed to all route handlers.
///
/// The engine is synchronous (rusqlite and tantivy block), so handlers
/// take the lock inside `spawn_blocking` rather than on the async path.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<Engine>>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }
}
