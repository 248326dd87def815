// ============================================================
// Layer 6 — Nearest-Neighbour Index
// ============================================================
// Turns continuous predicted embeddings back into words.
//
// For every predicted position we pick the vocabulary token
// whose vector has the highest cosine similarity. The vocabulary
// is L2-normalised and transposed once at build time, so a whole
// batch is decoded with one matmul + argmax on the tensor backend:
//
//   x [rows, dim] · Wᵀ [dim, vocab] → scores [rows, vocab] → argmax
//
// The query rows are not normalised: scaling a row by a positive
// factor does not move its argmax.
//
// The score matrix is built in row chunks so that its size stays
// bounded for large vocabularies.
//
// This decoding step is only used for logging and ROUGE
// evaluation. It is not differentiable and never feeds the
// training signal.

use anyhow::{anyhow, ensure, Result};
use burn::prelude::*;

use crate::infra::embedding_store::EmbeddingTable;
use crate::ml::layers::l2_normalize;

/// Upper bound on the elements of one [rows, vocab] score chunk
const SCORE_BUDGET: usize = 1 << 24;

pub struct NearestNeighborIndex<B: Backend> {
    tokens: Vec<String>,
    /// Unit-norm vocabulary, transposed: [dim, vocab]
    unit_t: Tensor<B, 2>,
    dim:    usize,
    /// Query rows scored per matmul
    chunk_rows: usize,
}

impl<B: Backend> NearestNeighborIndex<B> {
    pub fn build(table: &EmbeddingTable, device: &B::Device) -> Self {
        let unit_t = l2_normalize(table.to_tensor::<B>(device), 1).transpose();
        let tokens = (0..table.len() as u32)
            .filter_map(|id| table.token(id).map(str::to_string))
            .collect();

        let chunk_rows = (SCORE_BUDGET / table.len().max(1)).max(1);

        tracing::debug!("Built nearest-neighbour index over {} tokens", table.len());
        Self { tokens, unit_t, dim: table.dim(), chunk_rows }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Closest vocabulary id at every position of a
    /// [batch, seq_len, dim] tensor, one Vec per batch row.
    pub fn nearest_ids(&self, x: Tensor<B, 3>) -> Result<Vec<Vec<u32>>> {
        let [batch_size, seq_len, dim] = x.dims();
        ensure!(
            dim == self.dim,
            "tensor width {dim} does not match embedding dimension {}",
            self.dim
        );
        if batch_size == 0 || seq_len == 0 {
            return Ok(Vec::new());
        }

        let rows    = batch_size * seq_len;
        let queries = x.reshape([rows, dim]);
        let mut ids = Vec::with_capacity(rows);

        for start in (0..rows).step_by(self.chunk_rows) {
            let end  = (start + self.chunk_rows).min(rows);
            let best = queries
                .clone()
                .slice([start..end, 0..dim])
                .matmul(self.unit_t.clone())
                .argmax(1);
            ids.extend(read_ids(best)?);
        }

        Ok(ids.chunks(seq_len).map(<[u32]>::to_vec).collect())
    }

    /// Nearest-neighbour decode of a [batch, seq_len, dim] tensor,
    /// one space-joined sentence per batch row (padding kept).
    pub fn decode(&self, x: Tensor<B, 3>) -> Result<Vec<String>> {
        Ok(self
            .nearest_ids(x)?
            .iter()
            .map(|ids| self.join(ids))
            .collect())
    }

    /// Words of a [batch, seq_len] id tensor from any backend,
    /// one sentence per batch row.
    pub fn sentences<K: Backend>(&self, ids: Tensor<K, 2, Int>) -> Result<Vec<String>> {
        let [_, seq_len] = ids.dims();
        if seq_len == 0 {
            return Ok(Vec::new());
        }
        Ok(read_ids(ids)?
            .chunks(seq_len)
            .map(|ids| self.join(ids))
            .collect())
    }

    fn join(&self, ids: &[u32]) -> String {
        ids.iter()
            .filter_map(|&id| self.tokens.get(id as usize))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn read_ids<K: Backend, const D: usize>(ids: Tensor<K, D, Int>) -> Result<Vec<u32>> {
    ids.into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map(|ids| ids.into_iter().map(|id| id as u32).collect())
        .map_err(|e| anyhow!("Cannot read token ids: {e:?}"))
}
