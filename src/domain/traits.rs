// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only talks to these traits, so the
// on-disk dataset layout and the notification channel can be
// swapped without touching the training workflow.

use anyhow::Result;
use crate::domain::post::Post;

// ─── PostSource ───────────────────────────────────────────────────────────────
/// Any component that can load posts from a source.
///
/// Implementations:
///   - PostLoader → walks <dataset>/<location>/<post>/text.txt
pub trait PostSource {
    /// Load every readable post. Unreadable posts are skipped.
    fn load_all(&self) -> Result<Vec<Post>>;
}

// ─── Notifier ─────────────────────────────────────────────────────────────────
/// Best-effort, fire-and-forget notification channel.
///
/// `notify` cannot fail: a broken channel must never abort a
/// training run, so implementations swallow and log their errors.
pub trait Notifier {
    fn notify(&self, message: &str);
}
