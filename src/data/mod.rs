// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from post folders on disk to tensor batches.
//
//   <dataset>/<location>/<post>/text.txt
//       │
//       ▼
//   PostLoader        → reads every caption, skips broken posts
//       │
//       ▼
//   Preprocessor      → cleans, lower-cases, pads to a fixed length
//       │
//       ▼
//   EmbeddingTable    → maps tokens to vocabulary ids (infra layer)
//       │
//       ▼
//   split_train_val   → seeded shuffle + split
//       │
//       ▼
//   SentenceDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SentenceBatcher   → looks up word vectors, stacks into tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop

/// Walks the dataset directory and reads captions
pub mod loader;

/// Cleans captions and turns them into padded sentences
pub mod preprocessor;

/// Implements Burn's Dataset trait for padded sentences
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
