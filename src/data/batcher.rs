// ============================================================
// Layer 4 — Sentence Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<SentenceSample>
// into tensors the autoencoder can consume.
//
// Two views of the same batch are produced:
//
//   token_ids   [batch, seq_len]                 Int
//   embeddings  [batch, seq_len, embedding_dim]  Float
//
// The embedding lookup happens here, against the frozen
// pretrained table, because the word vectors are never trained:
// the encoder input and the reconstruction target are the same
// embedded tensor.
//
// All samples are pre-padded to the same length, so stacking is
// a plain flatten + reshape.

use std::sync::Arc;
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SentenceSample;
use crate::infra::embedding_store::EmbeddingTable;

#[derive(Debug, Clone)]
pub struct SentenceBatch<B: Backend> {
    /// Vocabulary ids, shape: [batch_size, seq_len]
    /// Read back as the reference words when scoring reconstructions
    pub token_ids: Tensor<B, 2, Int>,

    /// Word vectors, shape: [batch_size, seq_len, embedding_dim]
    pub embeddings: Tensor<B, 3>,
}

#[derive(Clone, Debug)]
pub struct SentenceBatcher<B: Backend> {
    table:  Arc<EmbeddingTable>,
    device: B::Device,
}

impl<B: Backend> SentenceBatcher<B> {
    pub fn new(table: Arc<EmbeddingTable>, device: B::Device) -> Self {
        Self { table, device }
    }
}

impl<B: Backend> Batcher<SentenceSample, SentenceBatch<B>> for SentenceBatcher<B> {
    fn batch(&self, items: Vec<SentenceSample>) -> SentenceBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(SentenceSample::len).unwrap_or(0);
        let dim        = self.table.dim();

        let ids: Vec<u32> = items
            .iter()
            .flat_map(|s| s.token_ids.iter().copied())
            .collect();

        let ids_i32: Vec<i32> = ids.iter().map(|&x| x as i32).collect();
        let token_ids = Tensor::<B, 1, Int>::from_ints(
            ids_i32.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let embeddings = Tensor::<B, 3>::from_data(
            TensorData::new(self.table.gather(&ids), [batch_size, seq_len, dim]),
            &self.device,
        );

        SentenceBatch { token_ids, embeddings }
    }
}
