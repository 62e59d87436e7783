use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::session::SessionStore;

/// Recording clock: ticks once per second while the session is
/// recording with audio devices present, stops the moment either
/// condition drops. Starting again replaces any previous clock.
pub struct RecordingTimer {
    elapsed: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self { elapsed: Arc::new(AtomicU64::new(0)), handle: None }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    pub fn reset(&mut self) {
        self.stop();
        self.elapsed.store(0, Ordering::Relaxed);
    }

    pub fn start(&mut self, store: Arc<SessionStore>) {
        self.stop();
        let elapsed = Arc::clone(&self.elapsed);
        self.handle = Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // First tick fires immediately; skip it so 1s elapses per count.
            tick.tick().await;
            loop {
                tick.tick().await;
                let snap = store.snapshot();
                if !(snap.is_recording && snap.has_audio_devices) {
                    return;
                }
                elapsed.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for RecordingTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Default for RecordingTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-padded MM:SS for the header clock.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(7), "00:07");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(600), "10:00");
        assert_eq!(format_elapsed(3601), "60:01");
    }
}
