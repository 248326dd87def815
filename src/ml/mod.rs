// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn modules and the loops that
// drive them.
//
// What's in this layer:
//
//   layers.rs    — Weight init, SELU, L2 normalisation
//
//   encoder.rs   — Three strided conv stages:
//                  [B, L, E] → [B, latent]
//
//   decoder.rs   — Three transposed conv stages back to
//                  [B, L, E], plus temperature-scaled cosine
//                  log-probabilities over the vocabulary
//
//   model.rs     — Encoder + decoder, stage length arithmetic
//
//   trainer.rs   — The training loop
//                  Forward pass, MSE loss, backward pass,
//                  AdamW step, validation and checkpointing
//
//   evaluator.rs — Held-out loss and ROUGE-1/2 via
//                  nearest-neighbour decoding
//
//   inferencer.rs — Loads a checkpoint and reconstructs one
//                  sentence
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Zhang et al. (2017) Deconvolutional Paragraph
//            Representation Learning

/// Backend aliases for training and inference
pub mod backend;

/// Weight initialisation and activation helpers
pub mod layers;

/// Convolutional sentence encoder
pub mod encoder;

/// Deconvolutional sentence decoder
pub mod decoder;

/// Full text autoencoder
pub mod model;

/// Validation loss and ROUGE
pub mod evaluator;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Single-sentence reconstruction from a checkpoint
pub mod inferencer;
