// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration       (this layer)
//   Step 2: Load the word-vector table       (Layer 6 - infra)
//   Step 3: Load post captions               (Layer 4 - data)
//   Step 4: Clean, pad and encode sentences  (Layer 4 - data)
//   Step 5: Split train/validation           (Layer 4 - data)
//   Step 6: Save config                      (Layer 6 - infra)
//   Step 7: Run training loop                (Layer 5 - ml)
//   Step 8: Write the evaluation table       (Layer 6 - infra)
//
// A start and an end notification bracket the whole run, and
// the end notification is sent whether or not training failed.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, ensure, Context, Result};
use std::{path::Path, sync::Arc};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{SentenceDataset, SentenceSample},
    loader::PostLoader,
    preprocessor::Preprocessor,
    splitter::split_train_val,
};
use crate::domain::post::Post;
use crate::domain::traits::PostSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    embedding_store::EmbeddingTable,
    notifier::notifier_for,
};
use crate::ml::model::{ModelDims, TextAutoencoderConfig};
use crate::ml::trainer::{run_training, TrainingData};

/// Number of conv stages the autoencoder is built with.
pub const SUPPORTED_LAYERS: usize = 3;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the checkpoints and
// reloaded by `reconstruct` to rebuild the same architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub target_dataset:    String,
    pub dataset_dir:       String,
    pub embedding_dir:     String,
    pub checkpoint_dir:    String,
    pub output_dir:        String,
    pub max_sentence_len:  usize,
    pub batch_size:        usize,
    pub epochs:            usize,
    pub lr:                f64,
    pub weight_decay:      f64,
    pub lr_decay_interval: usize,
    pub log_interval:      usize,
    pub test_interval:     usize,
    pub save_interval:     usize,
    pub shuffle:           bool,
    pub split_rate:        f64,
    pub latent_size:       usize,
    pub filter_size:       usize,
    pub filter_shape:      usize,
    pub num_layer:         usize,
    pub tau:               f64,
    pub seed:              u64,
    pub noti:              bool,
    /// Checkpoint name to continue from
    pub resume:            Option<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            target_dataset:    String::new(),
            dataset_dir:       "data/dataset".to_string(),
            embedding_dir:     "data/embedding".to_string(),
            checkpoint_dir:    "checkpoints".to_string(),
            output_dir:        "output".to_string(),
            max_sentence_len:  70,
            batch_size:        16,
            epochs:            80,
            lr:                3e-4,
            weight_decay:      3e-5,
            lr_decay_interval: 0,
            log_interval:      100,
            test_interval:     1,
            save_interval:     1,
            shuffle:           true,
            split_rate:        0.9,
            latent_size:       900,
            filter_size:       300,
            filter_shape:      5,
            num_layer:         SUPPORTED_LAYERS,
            tau:               0.01,
            seed:              42,
            noti:              false,
            resume:            None,
        }
    }
}

impl TrainConfig {
    /// Reject settings the pipeline cannot run with, before any
    /// file is read.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.target_dataset.is_empty(), "target_dataset must be set");
        ensure!(self.batch_size > 0, "batch_size must be at least 1");
        ensure!(self.test_interval > 0, "test_interval must be at least 1");
        ensure!(self.save_interval > 0, "save_interval must be at least 1");
        ensure!(self.lr > 0.0, "lr must be positive, got {}", self.lr);
        ensure!(self.tau > 0.0, "tau must be positive, got {}", self.tau);
        ensure!(
            self.split_rate > 0.0 && self.split_rate <= 1.0,
            "split_rate must be in (0, 1], got {}", self.split_rate
        );
        ensure!(
            self.num_layer == SUPPORTED_LAYERS,
            "only a {SUPPORTED_LAYERS}-layer autoencoder is supported, got num_layer={}",
            self.num_layer
        );
        ModelDims::new(self.max_sentence_len, self.filter_shape)?;
        Ok(())
    }

    /// Architecture for word vectors of width `embedding_dim`.
    pub fn model_config(&self, embedding_dim: usize) -> TextAutoencoderConfig {
        TextAutoencoderConfig::new(
            embedding_dim,
            self.max_sentence_len,
            self.filter_size,
            self.filter_shape,
            self.latent_size,
        )
        .with_tau(self.tau)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg      = &self.config;
        let notifier = notifier_for(cfg.noti, &cfg.target_dataset);

        notifier.notify(&format!("Text autoencoder training started on '{}'", cfg.target_dataset));
        let outcome = self.run();
        match &outcome {
            Ok(())  => notifier.notify("Text autoencoder training finished"),
            Err(e)  => notifier.notify(&format!("Text autoencoder training failed: {e:#}")),
        }
        outcome
    }

    fn run(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Word vectors ──────────────────────────────────────────────
        // The table is frozen: it supplies both the encoder input
        // and the reconstruction target.
        let vec_path = EmbeddingTable::path_for(&cfg.embedding_dir, &cfg.target_dataset);
        tracing::info!("Loading word vectors from '{}'", vec_path.display());
        let table = EmbeddingTable::load_vec(&vec_path)
            .with_context(|| format!("Cannot load embeddings for '{}'", cfg.target_dataset))?;
        tracing::info!("Vocabulary: {} tokens × {} dims", table.len(), table.dim());

        // ── Step 3: Load captions ─────────────────────────────────────────────
        let loader = PostLoader::new(&cfg.dataset_dir, &cfg.target_dataset);
        let posts  = loader.load_all()?;

        // ── Step 4: Clean, pad, encode ────────────────────────────────────────
        let samples = build_samples(&posts, &table, cfg.max_sentence_len);
        if samples.is_empty() {
            bail!("No usable posts found under '{}'", loader.root().display());
        }

        // ── Step 5: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, cfg.split_rate, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );
        if train_samples.is_empty() {
            bail!("Training split is empty; add more posts or raise split_rate");
        }
        if val_samples.is_empty() {
            tracing::warn!("Validation split is empty; validation loss will be NaN");
        }

        let data = TrainingData {
            table: Arc::new(table),
            train: SentenceDataset::new(train_samples),
            valid: SentenceDataset::new(val_samples),
        };

        // ── Step 6: Save config for reconstruction ────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        let results = run_training(cfg, data, &ckpt_manager)?;

        // ── Step 8: Persist per-epoch metrics ─────────────────────────────────
        results.write_csv(Path::new(&cfg.output_dir))?;

        Ok(())
    }
}

/// Turn raw posts into fixed-length id sequences.
///
/// Posts containing a word the vocabulary does not cover are
/// logged and dropped.
fn build_samples(posts: &[Post], table: &EmbeddingTable, max_len: usize) -> Vec<SentenceSample> {
    let preprocessor = Preprocessor::new();
    let mut samples  = Vec::with_capacity(posts.len());
    let mut skipped  = 0usize;

    for post in posts {
        let sentence = preprocessor.to_sentence(&post.text, max_len);
        match table.encode(&sentence) {
            Ok(ids) => samples.push(SentenceSample::new(ids)),
            Err(e) => {
                tracing::warn!("Skipping post '{}': {}", post.source, e);
                skipped += 1;
            }
        }
    }

    tracing::info!("Built {} samples ({} skipped)", samples.len(), skipped);
    samples
}
