// ============================================================
// Layer 2 — Reconstruct Use Case
// ============================================================
// Loads the saved training config and the best checkpoint,
// then passes a single sentence through the autoencoder.
//
// Useful for eyeballing what the latent space keeps: a good
// model returns the input sentence word for word.

use anyhow::Result;

use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::InferBackend;
use crate::ml::inferencer::{Reconstruction, Reconstructor};

pub struct ReconstructUseCase {
    reconstructor: Reconstructor<InferBackend>,
}

impl ReconstructUseCase {
    pub fn new(checkpoint_dir: &str, checkpoint_name: &str) -> Result<Self> {
        let ckpt          = CheckpointManager::new(checkpoint_dir);
        let reconstructor = Reconstructor::from_checkpoint(&ckpt, checkpoint_name)?;
        Ok(Self { reconstructor })
    }

    pub fn reconstruct(&self, sentence: &str) -> Result<Reconstruction> {
        tracing::debug!("Reconstructing: {}", sentence);
        self.reconstructor.reconstruct(sentence)
    }
}
