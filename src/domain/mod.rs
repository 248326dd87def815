// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types describing what the system works with:
// posts, fixed-length padded sentences and the traits other
// layers implement.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits

// A raw post loaded from disk
pub mod post;

// Fixed-length token sequences and the reserved tokens
pub mod sentence;

// Core abstractions (traits) that other layers implement
pub mod traits;
