// ============================================================
// Layer 5 — Reconstructor
// ============================================================
// Runs one sentence through a trained autoencoder:
//
//   text → clean + pad → word vectors → encoder → latent
//        → decoder → predicted vectors → nearest words
//
// The model is rebuilt from train_config.json and the best
// checkpoint, directly on the inference backend, so batch norm
// uses its running statistics.
use anyhow::{anyhow, Result};
use burn::prelude::*;

use crate::data::preprocessor::Preprocessor;
use crate::domain::sentence::strip_padding;
use crate::infra::{
    checkpoint::CheckpointManager,
    embedding_store::EmbeddingTable,
    nearest_neighbor::NearestNeighborIndex,
    rouge::RougeScorer,
};
use crate::ml::backend::{default_device, InferBackend};
use crate::ml::model::TextAutoencoder;

#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub input:   String,
    pub output:  String,
    pub rouge_1: f64,
    pub rouge_2: f64,
    /// Mean probability of the most likely word at each position
    pub confidence: f64,
}

pub struct Reconstructor<B: Backend> {
    model:        TextAutoencoder<B>,
    table:        EmbeddingTable,
    vocabulary:   Tensor<B, 2>,
    index:        NearestNeighborIndex<B>,
    scorer:       RougeScorer,
    preprocessor: Preprocessor,
    max_len:      usize,
    device:       B::Device,
}

impl Reconstructor<InferBackend> {
    /// Rebuild the model saved under `name` in `ckpt_manager`.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, name: &str) -> Result<Self> {
        let device = default_device();
        let cfg    = ckpt_manager.load_config()?;

        let table = EmbeddingTable::load_vec(
            &EmbeddingTable::path_for(&cfg.embedding_dir, &cfg.target_dataset),
        )?;

        let model: TextAutoencoder<InferBackend> = cfg.model_config(table.dim()).init(&device)?;
        let (model, meta) = ckpt_manager.load_model(name, model, &device)?;
        tracing::info!(
            "Model loaded from checkpoint (epoch {}, val_loss {:.6})",
            meta.epoch + 1, meta.best_loss
        );

        Ok(Self::new(model, table, cfg.max_sentence_len, device))
    }
}

impl<B: Backend> Reconstructor<B> {
    pub fn new(
        model:   TextAutoencoder<B>,
        table:   EmbeddingTable,
        max_len: usize,
        device:  B::Device,
    ) -> Self {
        let vocabulary = table.to_tensor::<B>(&device);
        let index      = NearestNeighborIndex::build(&table, &device);
        Self {
            model,
            table,
            vocabulary,
            index,
            scorer: RougeScorer::default(),
            preprocessor: Preprocessor::new(),
            max_len,
            device,
        }
    }

    pub fn reconstruct(&self, text: &str) -> Result<Reconstruction> {
        let sentence = self.preprocessor.to_sentence(text, self.max_len);
        let ids      = self.table.encode(&sentence)?;

        let x = Tensor::<B, 3>::from_data(
            TensorData::new(self.table.gather(&ids), [1, self.max_len, self.table.dim()]),
            &self.device,
        );

        let out = self.model.forward(x, self.vocabulary.clone());

        let confidence: f64 = out.log_prob
            .max_dim(2)
            .exp()
            .mean()
            .into_scalar()
            .elem::<f64>();

        let decoded = self.index.decode(out.x_hat)?
            .pop()
            .ok_or_else(|| anyhow!("Decoder produced no sentence"))?;

        let input  = sentence.strip_padding();
        let output = strip_padding(&decoded);

        Ok(Reconstruction {
            rouge_1: self.scorer.rouge_1(&output, &input),
            rouge_2: self.scorer.rouge_2(&output, &input),
            input,
            output,
            confidence,
        })
    }
}
