use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::api::{best_effort, ApiClient};
use crate::session::{Action, SessionStore};

/// Settle window between stopping the previous monitoring stream and
/// starting one for the new session. The backend needs the old stream
/// fully torn down before it accepts a new session binding.
const MONITORING_SETTLE: Duration = Duration::from_millis(500);

/// Restart the classroom monitoring stream for a freshly created
/// session. Best-effort by contract: failure is logged and swallowed,
/// it must never abort the recording/upload start that requested it.
pub async fn restart_for_session(store: &Arc<SessionStore>, api: &ApiClient, session_id: &str) {
    if store.snapshot().monitoring_active {
        if best_effort(api.stop_monitoring().await, "monitoring stop").is_some() {
            store.dispatch(Action::SetMonitoringActive(false));
        }
        tokio::time::sleep(MONITORING_SETTLE).await;
    }

    info!("starting monitoring for session {}", session_id);
    if best_effort(api.start_monitoring(session_id).await, "monitoring start").is_some() {
        store.dispatch(Action::SetMonitoringActive(true));
    }
}

/// Boot-time hygiene: stop any monitoring stream left over from a
/// previous run. A "nothing to stop" error is the normal case.
pub async fn stop_existing(store: &Arc<SessionStore>, api: &ApiClient) {
    best_effort(api.stop_monitoring().await, "stop existing monitoring");
    store.dispatch(Action::SetMonitoringActive(false));
}
