use std::sync::Mutex;

use tracing::debug;

use super::state::{Action, SessionState};

/// Single-writer state container. All mutation funnels through
/// `dispatch`, which applies the pure reducer under the lock; the lock
/// is never held across an await.
///
/// Long-lived tasks (pipeline monitor, event ingestor, deferred timers)
/// are tagged with the session id they were opened for and must use
/// `dispatch_for`: if the session has since changed, the action is
/// discarded. A stale monitor must never mutate current state.
pub struct SessionStore {
    inner: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self { inner: Mutex::new(SessionState::new()) }
    }

    pub fn with_state(state: SessionState) -> Self {
        Self { inner: Mutex::new(state) }
    }

    pub fn dispatch(&self, action: Action) {
        let mut state = self.inner.lock().expect("session store poisoned");
        state.reduce(action);
    }

    /// Check-and-discard dispatch for session-scoped writers.
    /// Returns false when the action was dropped as stale.
    pub fn dispatch_for(&self, session_id: &str, action: Action) -> bool {
        let mut state = self.inner.lock().expect("session store poisoned");
        if state.session_id.as_deref() != Some(session_id) {
            debug!(
                "discarded stale action for session {} (current: {:?})",
                session_id, state.session_id
            );
            return false;
        }
        state.reduce(action);
        true
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.lock().expect("session store poisoned").clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.inner.lock().expect("session store poisoned").session_id.clone()
    }

    pub fn session_matches(&self, session_id: &str) -> bool {
        self.inner.lock().expect("session store poisoned").session_id.as_deref()
            == Some(session_id)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
