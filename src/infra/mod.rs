// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the concerns that don't belong in any specific
// business layer:
//
//   embedding_store.rs  — Pretrained word vectors
//                         Reads FASTTEXT_<dataset>.vec once and
//                         maps tokens ↔ ids ↔ vectors.
//
//   nearest_neighbor.rs — Vector → word lookup
//                         Cosine similarity against the whole
//                         vocabulary, used to read predictions.
//
//   rouge.rs            — ROUGE-1 / ROUGE-2 F-scores
//
//   checkpoint.rs       — Saving and loading model weights
//                         Encoder, decoder and optimiser records
//                         plus a versioned JSON manifest. Also
//                         saves/loads TrainConfig as JSON so
//                         reconstruction can rebuild the model.
//
//   metrics.rs          — Per-epoch evaluation table
//                         Written to Evaluation_result.csv when
//                         training ends.
//
//   notifier.rs         — Start/end run notifications
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Word-vector table loading and lookup
pub mod embedding_store;

/// Nearest-neighbour decoding of predicted vectors
pub mod nearest_neighbor;

/// ROUGE-N scoring
pub mod rouge;

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Evaluation table CSV writer
pub mod metrics;

/// Fire-and-forget run notifications
pub mod notifier;
