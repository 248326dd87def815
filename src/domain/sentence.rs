// ============================================================
// Layer 3 — PaddedSentence Domain Type
// ============================================================
// Every training example must have exactly the same length so
// that the convolution stack sees a fixed-shape "image" of
// sentence_len × embedding_dim.
//
// Rules:
//   - shorter sentences are right-padded with <PAD>
//   - longer sentences are truncated and the final kept token
//     is forced to <EOS>
//
// Example (max_len = 6):
//   "a b c <EOS>"             → a b c <EOS> <PAD> <PAD>
//   "a b c d e f g h <EOS>"   → a b c d e <EOS>

/// Reserved padding token, part of every vocabulary
pub const PAD_TOKEN: &str = "<PAD>";

/// Reserved end-of-sentence token, part of every vocabulary
pub const EOS_TOKEN: &str = "<EOS>";

/// Returns true for the two reserved tokens
pub fn is_reserved(token: &str) -> bool {
    token == PAD_TOKEN || token == EOS_TOKEN
}

/// An ordered sequence of exactly `max_len` tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedSentence {
    tokens: Vec<String>,
}

impl PaddedSentence {
    /// Pad or truncate `tokens` to exactly `max_len` entries.
    pub fn new<I, S>(tokens: I, max_len: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();

        if tokens.len() > max_len {
            tokens.truncate(max_len);
            if let Some(last) = tokens.last_mut() {
                *last = EOS_TOKEN.to_string();
            }
        }
        tokens.resize(max_len, PAD_TOKEN.to_string());

        Self { tokens }
    }

    /// Split whitespace-separated text and pad it.
    pub fn from_text(text: &str, max_len: usize) -> Self {
        Self::new(text.split_whitespace(), max_len)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The sentence text with every <PAD> removed.
    pub fn strip_padding(&self) -> String {
        strip_padding(&self.tokens.join(" "))
    }
}

/// Remove <PAD> tokens from a space-joined sentence and trim it.
pub fn strip_padding(text: &str) -> String {
    text.split_whitespace()
        .filter(|t| *t != PAD_TOKEN)
        .collect::<Vec<_>>()
        .join(" ")
}
