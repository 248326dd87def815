// ============================================================
// Layer 6 — Embedding Store
// ============================================================
// Loads the pretrained word-vector table the whole pipeline is
// built around. The table is read once at start-up and never
// mutated: training only learns the encoder/decoder, never the
// word vectors themselves.
//
// File format (FastText / word2vec text format):
//
//   <count> <dim>               ← optional header line
//   <PAD> 0.12 -0.40 ...        ← one token per line
//   <EOS> 0.31  0.05 ...
//   coffee -0.22 0.18 ...
//
// File naming convention:
//   <embedding_dir>/FASTTEXT_<dataset>.vec
//
// Unknown tokens:
//   The vocabulary is assumed to cover the corpus. A token that
//   is not in the table is reported as EmbeddingError::UnknownToken
//   and the caller decides what to do (the loader skips the post).

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use burn::prelude::*;
use thiserror::Error;

use crate::domain::sentence::{PaddedSentence, EOS_TOKEN, PAD_TOKEN};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("token '{0}' is not in the embedding vocabulary")]
    UnknownToken(String),

    #[error("reserved token '{0}' is missing from the embedding table")]
    MissingSpecialToken(&'static str),

    #[error("dimension mismatch for '{token}': expected {expected}, got {got}")]
    DimensionMismatch { token: String, expected: usize, got: usize },

    #[error("malformed vector on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("embedding table is empty")]
    Empty,

    #[error("cannot read embedding file '{path}': {source}")]
    Io {
        path:   PathBuf,
        source: std::io::Error,
    },
}

/// Read-only vocabulary of fixed-size word vectors.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    tokens:  Vec<String>,
    ids:     HashMap<String, u32>,
    /// Row-major [vocab_size * dim]
    vectors: Vec<f32>,
    dim:     usize,
}

impl EmbeddingTable {
    /// Build a table from (token, vector) pairs.
    /// The reserved tokens <PAD> and <EOS> must be present.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, EmbeddingError>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut tokens  = Vec::new();
        let mut ids     = HashMap::new();
        let mut vectors = Vec::new();
        let mut dim     = None;

        for (token, vector) in pairs {
            let expected = *dim.get_or_insert(vector.len());
            if vector.len() != expected {
                return Err(EmbeddingError::DimensionMismatch {
                    token,
                    expected,
                    got: vector.len(),
                });
            }
            // First occurrence wins, like gensim's KeyedVectors loader
            if ids.contains_key(&token) {
                continue;
            }
            ids.insert(token.clone(), tokens.len() as u32);
            tokens.push(token);
            vectors.extend_from_slice(&vector);
        }

        let dim = dim.filter(|d| *d > 0).ok_or(EmbeddingError::Empty)?;

        for special in [PAD_TOKEN, EOS_TOKEN] {
            if !ids.contains_key(special) {
                return Err(EmbeddingError::MissingSpecialToken(special));
            }
        }

        Ok(Self { tokens, ids, vectors, dim })
    }

    /// Load a `.vec` text file.
    pub fn load_vec(path: &Path) -> Result<Self, EmbeddingError> {
        let text = fs::read_to_string(path).map_err(|source| EmbeddingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse_vec(&text)?;
        tracing::info!(
            "Loaded {} word vectors (dim={}) from '{}'",
            table.len(),
            table.dim(),
            path.display()
        );
        Ok(table)
    }

    /// Parse the text format described at the top of this file.
    pub fn parse_vec(text: &str) -> Result<Self, EmbeddingError> {
        let mut pairs = Vec::new();

        for (i, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(token) = fields.next() else { continue };
            let rest: Vec<&str> = fields.collect();

            // "<count> <dim>" header
            if i == 0 && rest.len() == 1 && token.parse::<usize>().is_ok()
                && rest[0].parse::<usize>().is_ok()
            {
                continue;
            }

            let vector = rest
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| EmbeddingError::Malformed {
                    line:   i + 1,
                    reason: e.to_string(),
                })?;
            pairs.push((token.to_string(), vector));
        }

        Self::from_pairs(pairs)
    }

    /// Standard location of the vector file for a dataset.
    pub fn path_for(embedding_dir: &str, dataset: &str) -> PathBuf {
        Path::new(embedding_dir).join(format!("FASTTEXT_{dataset}.vec"))
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token_id(&self, token: &str) -> Result<u32, EmbeddingError> {
        self.ids
            .get(token)
            .copied()
            .ok_or_else(|| EmbeddingError::UnknownToken(token.to_string()))
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    pub fn vector(&self, id: u32) -> Option<&[f32]> {
        let start = id as usize * self.dim;
        self.vectors.get(start..start + self.dim)
    }

    pub fn pad_id(&self) -> u32 {
        self.ids[PAD_TOKEN]
    }

    pub fn eos_id(&self) -> u32 {
        self.ids[EOS_TOKEN]
    }

    /// Map every token of a padded sentence to its vocabulary id.
    pub fn encode(&self, sentence: &PaddedSentence) -> Result<Vec<u32>, EmbeddingError> {
        sentence.tokens().iter().map(|t| self.token_id(t)).collect()
    }

    /// Concatenate the vectors of `ids` into one row-major buffer
    /// of length ids.len() * dim.
    ///
    /// Ids must come from `encode`/`token_id` on this same table.
    pub fn gather(&self, ids: &[u32]) -> Vec<f32> {
        let mut out = Vec::with_capacity(ids.len() * self.dim);
        for &id in ids {
            let start = id as usize * self.dim;
            out.extend_from_slice(&self.vectors[start..start + self.dim]);
        }
        out
    }

    /// The table as a [vocab_size, dim] tensor.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::from_data(
            TensorData::new(self.vectors.clone(), [self.len(), self.dim]),
            device,
        )
    }
}
