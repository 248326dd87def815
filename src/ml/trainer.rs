// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch loop for the text autoencoder using Burn's DataLoader
// and AdamW.
//
//   INIT      build model + optimiser, or restore both from a
//             checkpoint and continue at the next epoch
//   TRAIN     per batch: reconstruct → MSE → backward → step
//             every `log_interval` batches of an epoch, starting
//             with the first, log one decoded sample
//   VALIDATE  every `test_interval` epochs on model.valid()
//   SAVE      only when validation loss strictly improves and
//             the epoch falls on `save_interval`
//   DONE      return the per-epoch evaluation table
//
// Key Burn insight:
//   - Training runs on an Autodiff backend for gradients
//   - model.valid() returns the model on the inner backend:
//     no graph, batch norm switches to its running statistics
//   - The validation batcher must build inner-backend tensors
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use anyhow::Result;
use std::sync::Arc;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{SentenceBatch, SentenceBatcher},
    dataset::SentenceDataset,
};
use crate::infra::{
    checkpoint::{CheckpointManager, CheckpointMeta, DEFAULT_CHECKPOINT_NAME},
    embedding_store::EmbeddingTable,
    metrics::{EpochMetrics, EvaluationTable},
    nearest_neighbor::NearestNeighborIndex,
    rouge::RougeScorer,
};
use crate::ml::backend::{default_device, TrainBackend};
use crate::ml::evaluator::Evaluator;
use crate::ml::model::TextAutoencoder;

/// Everything the loop trains and validates on.
pub struct TrainingData {
    pub table: Arc<EmbeddingTable>,
    pub train: SentenceDataset,
    pub valid: SentenceDataset,
}

// ─── Best-loss tracking ───────────────────────────────────────────────────────
/// Remembers the lowest validation loss seen so far.
#[derive(Debug, Clone, Copy)]
pub struct BestLossTracker {
    best: f64,
}

impl BestLossTracker {
    pub fn new() -> Self {
        Self { best: f64::INFINITY }
    }

    /// Continue from the best loss stored in a checkpoint.
    pub fn resume(best: f64) -> Self {
        Self { best }
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    /// Record `loss`; true only on a strict improvement.
    /// NaN never improves.
    pub fn observe(&mut self, loss: f64) -> bool {
        if loss < self.best {
            self.best = loss;
            true
        } else {
            false
        }
    }
}

impl Default for BestLossTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Halve the learning rate every `interval` epochs. 0 disables decay.
pub fn step_decay_lr(base_lr: f64, epoch: usize, interval: usize) -> f64 {
    if interval == 0 {
        return base_lr;
    }
    base_lr * 0.5f64.powi((epoch / interval) as i32)
}

/// True on every `interval`-th epoch, counting epochs from 1.
fn is_due(epoch: usize, interval: usize) -> bool {
    interval > 0 && (epoch + 1) % interval == 0
}

/// True for batch 0, `interval`, 2·`interval`, ... of an epoch.
/// 0 turns sample logging off.
fn is_log_step(step: usize, interval: usize) -> bool {
    interval > 0 && step % interval == 0
}

/// Feed a validated epoch's loss to `tracker` and decide whether
/// to write a checkpoint: only a strict improvement that lands on
/// a `save_interval` epoch is saved. The tracker is updated either
/// way.
fn checkpoint_decision(
    tracker:       &mut BestLossTracker,
    epoch:         usize,
    loss:          f64,
    save_interval: usize,
) -> bool {
    let improved = tracker.observe(loss);
    improved && is_due(epoch, save_interval)
}

// ─── Single step ──────────────────────────────────────────────────────────────
pub struct StepOutput<B: AutodiffBackend> {
    pub model: TextAutoencoder<B>,
    pub loss:  f64,
    /// Reconstruction from before the parameter update
    pub x_hat: Tensor<B, 3>,
}

/// One forward/backward/update pass over `batch`.
pub fn train_step<B, O>(
    model: TextAutoencoder<B>,
    optim: &mut O,
    batch: &SentenceBatch<B>,
    lr:    f64,
) -> StepOutput<B>
where
    B: AutodiffBackend,
    O: Optimizer<TextAutoencoder<B>, B>,
{
    let x     = batch.embeddings.clone();
    let x_hat = model.reconstruct(x.clone());
    let loss  = MseLoss::new().forward(x_hat.clone(), x, Reduction::Mean);

    let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &model);
    let model = optim.step(lr, model, grads);

    StepOutput { model, loss: loss_val, x_hat: x_hat.detach() }
}

// ─── Entry point ──────────────────────────────────────────────────────────────
pub fn run_training(
    cfg:          &TrainConfig,
    data:         TrainingData,
    ckpt_manager: &CheckpointManager,
) -> Result<EvaluationTable> {
    let device = default_device();
    tracing::info!("Using device: {:?}", device);
    TrainBackend::seed(cfg.seed);
    train_loop::<TrainBackend>(cfg, data, ckpt_manager, device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    data:         TrainingData,
    ckpt_manager: &CheckpointManager,
    device:       B::Device,
) -> Result<EvaluationTable> {
    let TrainingData { table, train, valid } = data;

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config(table.dim());
    let dims      = model_cfg.dims()?;
    let mut model: TextAutoencoder<B> = model_cfg.init(&device)?;
    tracing::info!(
        "Model ready: t1={} t2={} t3={}, filter_size={}, latent_size={}",
        dims.t1, dims.t2, dims.t3, cfg.filter_size, cfg.latent_size
    );

    // ── AdamW optimiser ───────────────────────────────────────────────────────
    // Adam update with weight decay applied directly to the parameters
    // θ = θ - lr * (m̂ / (√v̂ + ε) + λθ)
    let mut optim = AdamWConfig::new()
        .with_weight_decay(cfg.weight_decay as f32)
        .init();

    // ── Resume ────────────────────────────────────────────────────────────────
    let mut tracker     = BestLossTracker::new();
    let mut start_epoch = 0usize;

    if let Some(name) = &cfg.resume {
        let (restored, restored_optim, meta) = ckpt_manager.load(name, model, optim, &device)?;
        model       = restored;
        optim       = restored_optim;
        tracker     = BestLossTracker::resume(meta.best_loss);
        start_epoch = meta.next_epoch();
        tracing::info!(
            "Resuming from '{}' at epoch {} (best loss {:.6})",
            name, start_epoch, meta.best_loss
        );
    }

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = SentenceBatcher::<B>::new(table.clone(), device.clone());
    let mut train_builder = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1);
    if cfg.shuffle {
        train_builder = train_builder.shuffle(cfg.seed);
    }
    let train_loader = train_builder.build(train);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batches = valid.sample_count().div_ceil(cfg.batch_size);
    let val_batcher = SentenceBatcher::<B::InnerBackend>::new(table.clone(), device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(valid);

    let evaluator = Evaluator::<B::InnerBackend>::new(
        NearestNeighborIndex::build(&table, &device),
        RougeScorer::default(),
    );
    let mut results = EvaluationTable::new();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in start_epoch..cfg.epochs {
        let lr = step_decay_lr(cfg.lr, epoch, cfg.lr_decay_interval);

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for (step, batch) in train_loader.iter().enumerate() {
            let out = train_step(model, &mut optim, &batch, lr);
            model = out.model;

            train_loss_sum += out.loss;
            train_batches  += 1;

            if is_log_step(step, cfg.log_interval) {
                log_sample(evaluator.index(), &batch, out.x_hat, epoch, step, out.loss)?;
            }
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        if !is_due(epoch, cfg.test_interval) {
            println!(
                "Epoch {:>3}/{} | lr={:.2e} | train_loss={:.6}",
                epoch + 1, cfg.epochs, lr, avg_train_loss,
            );
            continue;
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let result = evaluator.evaluate(&model.valid(), val_loader.iter(), val_batches)?;
        results.push(EpochMetrics::new(epoch, result.avg_loss, result.rouge_1, result.rouge_2));

        println!(
            "Epoch {:>3}/{} | lr={:.2e} | train_loss={:.6} | val_loss={:.6} | rouge_1={:.4} | rouge_2={:.4}",
            epoch + 1, cfg.epochs, lr, avg_train_loss,
            result.avg_loss, result.rouge_1, result.rouge_2,
        );

        // ── Checkpoint decision ───────────────────────────────────────────────
        if checkpoint_decision(&mut tracker, epoch, result.avg_loss, cfg.save_interval) {
            let meta = CheckpointMeta::new(epoch, tracker.best());
            ckpt_manager.save(DEFAULT_CHECKPOINT_NAME, &model, &optim, &meta)?;
            tracing::info!(
                "Checkpoint saved for epoch {} (val_loss {:.6})",
                epoch + 1, result.avg_loss
            );
        }
    }

    tracing::info!("Training complete! Best validation loss: {:.6}", tracker.best());
    Ok(results)
}

/// Log the first sentence of `batch` next to its reconstruction.
fn log_sample<B: AutodiffBackend>(
    index: &NearestNeighborIndex<B::InnerBackend>,
    batch: &SentenceBatch<B>,
    x_hat: Tensor<B, 3>,
    epoch: usize,
    step:  usize,
    loss:  f64,
) -> Result<()> {
    let [_, seq_len, dim] = x_hat.dims();

    let input  = index.sentences(batch.token_ids.clone().slice([0..1, 0..seq_len]))?;
    let output = index.decode(x_hat.inner().slice([0..1, 0..seq_len, 0..dim]))?;

    tracing::info!(
        "epoch {} step {} | loss={:.6}\n  input:  {}\n  output: {}",
        epoch + 1,
        step,
        loss,
        input.first().map(String::as_str).unwrap_or(""),
        output.first().map(String::as_str).unwrap_or(""),
    );
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use burn::{
        backend::{Autodiff, NdArray},
        data::dataloader::batcher::Batcher,
    };
    use crate::data::dataset::SentenceSample;
    use crate::domain::sentence::strip_padding;
    use crate::ml::model::TextAutoencoderConfig;

    type TestBackend = Autodiff<NdArray>;

    fn toy_table() -> Arc<EmbeddingTable> {
        Arc::new(
            EmbeddingTable::parse_vec(
                "<PAD> -0.5 -0.5 -0.5 -0.5\n\
                 <EOS> 0.5 -0.5 0.5 -0.5\n\
                 a 0.5 0.5 -0.5 -0.5\n\
                 b -0.5 0.5 0.5 -0.5\n\
                 c 0.5 -0.5 -0.5 0.5",
            )
            .unwrap(),
        )
    }

    fn sample(table: &EmbeddingTable, text: &str) -> SentenceSample {
        SentenceSample::new(text.split(' ').map(|t| table.token_id(t).unwrap()).collect())
    }

    fn saved_epochs(losses: &[f64], save_interval: usize) -> (Vec<usize>, f64) {
        let mut tracker = BestLossTracker::new();
        let saved = losses
            .iter()
            .enumerate()
            .filter_map(|(epoch, &loss)| {
                checkpoint_decision(&mut tracker, epoch, loss, save_interval).then_some(epoch)
            })
            .collect();
        (saved, tracker.best())
    }

    #[test]
    fn test_checkpoints_only_on_strict_improvement() {
        assert_eq!(saved_epochs(&[5.0, 3.0, 4.0, 2.0], 1), (vec![0, 1, 3], 2.0));
        assert_eq!(saved_epochs(&[5.0, 5.0, f64::NAN], 1), (vec![0], 5.0));
    }

    #[test]
    fn test_save_interval_skips_off_epochs_but_tracks_best() {
        // Epoch 0 improves but is not a save epoch
        assert_eq!(saved_epochs(&[5.0, 3.0, 4.0, 2.0], 2), (vec![1, 3], 2.0));

        // The best loss from epoch 2 still blocks the worse epoch 3
        assert_eq!(saved_epochs(&[3.0, 4.0, 2.0, 2.5], 2), (vec![], 2.0));
    }

    #[test]
    fn test_sample_logging_starts_each_epoch() {
        assert!(is_log_step(0, 100));
        assert!(!is_log_step(99, 100));
        assert!(is_log_step(100, 100));
        assert!(is_log_step(3, 1));
        assert!(!is_log_step(0, 0));
    }

    #[test]
    fn test_tracker_ignores_equal_and_nan() {
        let mut tracker = BestLossTracker::resume(1.0);
        assert!(!tracker.observe(1.0));
        assert!(!tracker.observe(f64::NAN));
        assert!(tracker.observe(0.5));
    }

    #[test]
    fn test_step_decay() {
        assert_eq!(step_decay_lr(1.0, 0, 10), 1.0);
        assert_eq!(step_decay_lr(1.0, 9, 10), 1.0);
        assert_eq!(step_decay_lr(1.0, 10, 10), 0.5);
        assert_eq!(step_decay_lr(1.0, 25, 10), 0.25);
        assert_eq!(step_decay_lr(3e-4, 50, 0), 3e-4);
    }

    #[test]
    fn test_interval_gating() {
        assert!(is_due(0, 1));
        assert!(!is_due(0, 2));
        assert!(is_due(1, 2));
        assert!(!is_due(3, 0));
    }

    #[test]
    fn test_learns_to_reconstruct_single_sentence() {
        let table  = toy_table();
        let device = Default::default();
        TestBackend::seed(7);

        let mut model = TextAutoencoderConfig::new(4, 6, 16, 2, 16)
            .init::<TestBackend>(&device)
            .unwrap();
        let mut optim = AdamWConfig::new().with_weight_decay(0.0).init();

        let batcher = SentenceBatcher::<TestBackend>::new(table.clone(), device.clone());
        let batch   = batcher.batch(vec![sample(&table, "a b c <EOS> <PAD> <PAD>"); 8]);

        let mut first_loss = None;
        for _ in 0..600 {
            let out = train_step(model, &mut optim, &batch, 1e-2);
            first_loss.get_or_insert(out.loss);
            model = out.model;
        }

        let x_hat = model.reconstruct(batch.embeddings.clone());
        let loss  = MseLoss::new()
            .forward(x_hat.clone(), batch.embeddings.clone(), Reduction::Mean)
            .into_scalar()
            .elem::<f64>();
        assert!(loss < 0.05, "loss stayed at {loss}");
        assert!(loss < first_loss.unwrap());

        let index   = NearestNeighborIndex::<TestBackend>::build(&table, &device);
        let decoded = index.decode(x_hat).unwrap();
        for sentence in decoded {
            assert_eq!(strip_padding(&sentence), "a b c <EOS>");
        }
    }

    fn toy_config(dir: &Path) -> TrainConfig {
        TrainConfig {
            checkpoint_dir:   dir.join("ckpt").to_string_lossy().into_owned(),
            output_dir:       dir.join("out").to_string_lossy().into_owned(),
            max_sentence_len: 6,
            batch_size:       2,
            epochs:           2,
            lr:               1e-2,
            weight_decay:     0.0,
            lr_decay_interval: 1,
            log_interval:     1,
            latent_size:      8,
            filter_size:      8,
            filter_shape:     2,
            ..TrainConfig::default()
        }
    }

    fn toy_data(table: &Arc<EmbeddingTable>) -> TrainingData {
        let train = ["a b c <EOS> <PAD> <PAD>", "c b <EOS> <PAD> <PAD> <PAD>", "b a <EOS> <PAD> <PAD> <PAD>"];
        let valid = ["a c <EOS> <PAD> <PAD> <PAD>", "b b c <EOS> <PAD> <PAD>"];
        TrainingData {
            table: table.clone(),
            train: SentenceDataset::new(train.iter().map(|s| sample(table, s)).collect()),
            valid: SentenceDataset::new(valid.iter().map(|s| sample(table, s)).collect()),
        }
    }

    #[test]
    fn test_loop_saves_and_resumes_at_next_epoch() {
        let dir    = std::env::temp_dir().join(format!("post_ae_trainer_{}", std::process::id()));
        let table  = toy_table();
        let device = <TestBackend as Backend>::Device::default();
        let mut cfg = toy_config(&dir);
        let manager = CheckpointManager::new(&cfg.checkpoint_dir);

        let table_a = train_loop::<TestBackend>(&cfg, toy_data(&table), &manager, device.clone()).unwrap();
        assert_eq!(table_a.rows().len(), 2);
        assert_eq!(table_a.rows()[0].epoch, 0);

        // First validated epoch always improves on +∞
        let meta = manager.read_meta(DEFAULT_CHECKPOINT_NAME).unwrap();
        assert!(meta.epoch <= 1);

        cfg.epochs = 3;
        cfg.resume = Some(DEFAULT_CHECKPOINT_NAME.to_string());
        let table_b = train_loop::<TestBackend>(&cfg, toy_data(&table), &manager, device).unwrap();

        let epochs: Vec<usize> = table_b.rows().iter().map(|m| m.epoch).collect();
        assert_eq!(epochs.first().copied(), Some(meta.next_epoch()));
        assert_eq!(epochs.last().copied(), Some(2));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
