// ============================================================
// Layer 3 — Post Domain Type
// ============================================================
// Represents the text of a single social-media post as it was
// found on disk, before any cleaning or padding.
//
// The dataset layout groups posts by location:
//   <dataset>/<location>/<post>/text.txt
// so the `source` is kept as "<location>/<post>" for traceability.

/// A raw post loaded from disk.
#[derive(Debug, Clone)]
pub struct Post {
    /// "<location>/<post>" — where the text came from
    pub source: String,

    /// The raw caption text, usually already ending in `<EOS>`
    pub text: String,
}

impl Post {
    /// Create a new Post from a source identifier and its text.
    ///
    /// Example:
    ///   let post = Post::new("seoul/2019-01-01_UTC", "coffee with friends <EOS>");
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text:   text.into(),
        }
    }
}
