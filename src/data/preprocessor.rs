// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans a raw post caption before it is mapped to word vectors.
//
// The embedding vocabulary is lower-cased single-line text, so
// captions lose invisible spaces, line breaks and capitals first.
//
// Cleaning steps (applied in order):
//   1. Replace Unicode whitespace variants and control chars with a space
//   2. Collapse all runs of whitespace (including newlines) into one space
//   3. Lower-case every token except the reserved <PAD>/<EOS>
//   4. Make sure the sentence ends in <EOS>

use crate::domain::sentence::{is_reserved, PaddedSentence, EOS_TOKEN};

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw caption into a single space-separated line.
    pub fn clean(&self, text: &str) -> String {

        // ── Step 1: Normalise individual characters ───────────────────────────
        let normalised: String = text
            .chars()
            .map(|c| match c {
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            })
            .collect();

        // ── Steps 2 + 3: Collapse whitespace, lower-case words ────────────────
        normalised
            .split_whitespace()
            .map(|token| {
                if is_reserved(token) {
                    token.to_string()
                } else {
                    token.to_lowercase()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Clean, terminate with <EOS> and pad/truncate to `max_len`.
    pub fn to_sentence(&self, text: &str, max_len: usize) -> PaddedSentence {
        let cleaned = self.clean(text);
        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();

        // ── Step 4: Terminate ─────────────────────────────────────────────────
        if tokens.last() != Some(&EOS_TOKEN) {
            tokens.push(EOS_TOKEN);
        }

        PaddedSentence::new(tokens, max_len)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_lines() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello \t  world\r\nagain  "), "hello world again");
    }

    #[test]
    fn test_lowercases_but_keeps_reserved_tokens() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("Coffee TIME <EOS>"), "coffee time <EOS>");
    }

    #[test]
    fn test_removes_invisible_chars() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("a\u{00A0}b\u{200B}c\x01d"), "a b c d");
    }

    #[test]
    fn test_appends_eos_once() {
        let p = Preprocessor::new();
        let s = p.to_sentence("sunny day", 5);
        assert_eq!(s.tokens(), &["sunny", "day", "<EOS>", "<PAD>", "<PAD>"]);

        let s = p.to_sentence("sunny day <EOS>", 5);
        assert_eq!(s.tokens(), &["sunny", "day", "<EOS>", "<PAD>", "<PAD>"]);
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
        assert_eq!(p.to_sentence("", 2).tokens(), &["<EOS>", "<PAD>"]);
    }
}
