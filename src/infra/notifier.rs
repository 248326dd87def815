// ============================================================
// Layer 6 — Run Notifier
// ============================================================
// Announces the start and end of a long training run.
//
// Notifications are fire-and-forget: they are emitted as
// `tracing` events carrying a `channel` field, so any subscriber
// layer that forwards logs can pick them up. Nothing here can
// fail the run.

use crate::domain::traits::Notifier;

pub struct LogNotifier {
    channel: String,
}

impl LogNotifier {
    pub fn new(channel: impl Into<String>) -> Self {
        Self { channel: channel.into() }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(channel = %self.channel, "[notify] {}", message);
    }
}

/// Used when `--noti` is off.
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _message: &str) {}
}

/// Pick the notifier for a run.
pub fn notifier_for(enabled: bool, channel: &str) -> Box<dyn Notifier> {
    if enabled {
        Box::new(LogNotifier::new(channel))
    } else {
        Box::new(SilentNotifier)
    }
}
