// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores everything needed to resume training.
//
// What gets saved per checkpoint:
//   1. Encoder weights    (encoder.mpk.gz)
//   2. Decoder weights    (decoder.mpk.gz)
//   3. Optimiser state    (optimizer.mpk.gz)
//   4. checkpoint.json    — schema version, epoch, best loss
//
// Plus, once per run:
//   train_config.json     — hyperparameters, so the model can be
//                           rebuilt for inference
//
// The weights are stored with full precision so that a save/load
// round trip restores bit-identical parameters.
//
// checkpoint.json is written last, through a temporary file and
// a rename. A checkpoint directory without a manifest is treated
// as incomplete and never loaded.
//
// File naming convention:
//   checkpoints/
//     text_autoencoder/
//       encoder.mpk.gz
//       decoder.mpk.gz
//       optimizer.mpk.gz
//       checkpoint.json
//     train_config.json

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    optim::Optimizer,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::TextAutoencoder;

pub const CHECKPOINT_SCHEMA_VERSION: u32 = 1;

/// Name the training loop saves its best model under
pub const DEFAULT_CHECKPOINT_NAME: &str = "text_autoencoder";

const MANIFEST_FILE: &str = "checkpoint.json";
const CONFIG_FILE:   &str = "train_config.json";

type CheckpointRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Contents of checkpoint.json
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub schema_version: u32,

    /// Zero-based epoch whose validation produced this checkpoint
    pub epoch: usize,

    /// Best validation loss seen up to and including `epoch`
    pub best_loss: f64,
}

impl CheckpointMeta {
    pub fn new(epoch: usize, best_loss: f64) -> Self {
        Self { schema_version: CHECKPOINT_SCHEMA_VERSION, epoch, best_loss }
    }

    /// The epoch a resumed run starts from.
    pub fn next_epoch(&self) -> usize {
        self.epoch + 1
    }
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn checkpoint_dir(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Persist model, optimiser and metadata together.
    pub fn save<B, O>(
        &self,
        name:  &str,
        model: &TextAutoencoder<B>,
        optim: &O,
        meta:  &CheckpointMeta,
    ) -> Result<()>
    where
        B: AutodiffBackend,
        O: Optimizer<TextAutoencoder<B>, B>,
    {
        let dir = self.checkpoint_dir(name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;

        let recorder = CheckpointRecorder::new();

        recorder
            .record(model.encoder.clone().into_record(), dir.join("encoder"))
            .with_context(|| format!("Failed to save encoder to '{}'", dir.display()))?;
        recorder
            .record(model.decoder.clone().into_record(), dir.join("decoder"))
            .with_context(|| format!("Failed to save decoder to '{}'", dir.display()))?;
        Recorder::<B>::record(&recorder, optim.to_record(), dir.join("optimizer"))
            .with_context(|| format!("Failed to save optimizer to '{}'", dir.display()))?;

        write_json_atomic(&dir.join(MANIFEST_FILE), meta)?;

        tracing::debug!(
            "Saved checkpoint '{}': epoch {}, best_loss {:.6}",
            name, meta.epoch, meta.best_loss
        );
        Ok(())
    }

    /// Restore model, optimiser and metadata saved by `save`.
    ///
    /// `model` and `optim` must be freshly built with the same
    /// architecture; their state is replaced.
    pub fn load<B, O>(
        &self,
        name:   &str,
        model:  TextAutoencoder<B>,
        optim:  O,
        device: &B::Device,
    ) -> Result<(TextAutoencoder<B>, O, CheckpointMeta)>
    where
        B: AutodiffBackend,
        O: Optimizer<TextAutoencoder<B>, B>,
    {
        let (model, meta) = self.load_model(name, model, device)?;
        let dir = self.checkpoint_dir(name);

        let optim_record: O::Record =
            Recorder::<B>::load(&CheckpointRecorder::new(), dir.join("optimizer"), device)
                .with_context(|| format!("Cannot load optimizer state from '{}'", dir.display()))?;

        Ok((model, optim.load_record(optim_record), meta))
    }

    /// Restore only the model weights, e.g. for inference.
    pub fn load_model<B: Backend>(
        &self,
        name:   &str,
        model:  TextAutoencoder<B>,
        device: &B::Device,
    ) -> Result<(TextAutoencoder<B>, CheckpointMeta)> {
        let meta = self.read_meta(name)?;
        let dir  = self.checkpoint_dir(name);
        let recorder = CheckpointRecorder::new();

        tracing::info!("Loading checkpoint '{}' from epoch {}", name, meta.epoch);

        let TextAutoencoder { encoder, decoder } = model;
        let encoder = encoder.load_record(
            recorder
                .load(dir.join("encoder"), device)
                .with_context(|| format!("Cannot load encoder from '{}'", dir.display()))?,
        );
        let decoder = decoder.load_record(
            recorder
                .load(dir.join("decoder"), device)
                .with_context(|| format!("Cannot load decoder from '{}'", dir.display()))?,
        );

        Ok((TextAutoencoder { encoder, decoder }, meta))
    }

    /// Read and validate checkpoint.json.
    pub fn read_meta(&self, name: &str) -> Result<CheckpointMeta> {
        let path = self.checkpoint_dir(name).join(MANIFEST_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!("Cannot read '{}'. Has this checkpoint been saved?", path.display())
        })?;
        let meta: CheckpointMeta = serde_json::from_str(&json)
            .with_context(|| format!("Malformed checkpoint manifest '{}'", path.display()))?;

        if meta.schema_version > CHECKPOINT_SCHEMA_VERSION {
            bail!(
                "Checkpoint '{}' uses schema version {}, this build reads up to {}",
                name, meta.schema_version, CHECKPOINT_SCHEMA_VERSION
            );
        }
        Ok(meta)
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'reconstruct'.",
                path.display()
            )
        })?;

        Ok(serde_json::from_str(&json)?)
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("Cannot write '{}'", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Cannot move '{}' into place", path.display()))?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{Autodiff, NdArray},
        nn::loss::{MseLoss, Reduction},
        optim::{AdamWConfig, GradientsParams},
        tensor::Distribution,
    };
    use crate::ml::model::TextAutoencoderConfig;

    type TestBackend = Autodiff<NdArray>;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("post_ae_ckpt_{tag}_{}", std::process::id()))
    }

    type Model = TextAutoencoder<TestBackend>;

    fn to_vec<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    /// Every conv / deconv weight and bias.
    fn weights(model: &Model) -> Vec<f32> {
        let (e, d) = (&model.encoder, &model.decoder);
        let mut all = Vec::new();
        for w in [&e.conv1.weight, &e.conv2.weight, &e.conv3.weight,
                  &d.deconv1.weight, &d.deconv2.weight, &d.deconv3.weight] {
            all.extend(to_vec(w.val()));
        }
        for b in [&e.conv1.bias, &e.conv2.bias, &e.conv3.bias,
                  &d.deconv1.bias, &d.deconv2.bias, &d.deconv3.bias].into_iter().flatten() {
            all.extend(to_vec(b.val()));
        }
        all
    }

    /// Affine parameters and running statistics of every batch norm.
    fn batch_norm_state(model: &Model) -> Vec<f32> {
        let mut all = Vec::new();
        for norm in [&model.encoder.norm1, &model.encoder.norm2,
                     &model.decoder.norm1, &model.decoder.norm2] {
            all.extend(to_vec(norm.gamma.val()));
            all.extend(to_vec(norm.beta.val()));
            all.extend(to_vec(norm.running_mean.value()));
            all.extend(to_vec(norm.running_var.value()));
        }
        all
    }

    fn train_once<O: Optimizer<Model, TestBackend>>(model: Model, optim: &mut O, x: &Tensor<TestBackend, 3>) -> Model {
        let loss  = MseLoss::new().forward(model.reconstruct(x.clone()), x.clone(), Reduction::Mean);
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        optim.step(1e-2, model, grads)
    }

    #[test]
    fn test_round_trip_restores_parameters_and_epoch() {
        let dir = temp_dir("roundtrip");
        let device = Default::default();
        let cfg = TextAutoencoderConfig::new(4, 6, 4, 2, 6);

        TestBackend::seed(1);
        let mut model = cfg.init::<TestBackend>(&device).unwrap();
        let mut optim = AdamWConfig::new().init::<TestBackend, Model>();

        // A few steps so there are moments and running statistics to persist
        let x = Tensor::<TestBackend, 3>::random([2, 6, 4], Distribution::Uniform(-0.5, 0.5), &device);
        for _ in 0..3 {
            model = train_once(model, &mut optim, &x);
        }

        let manager = CheckpointManager::new(&dir);
        manager.save("best", &model, &optim, &CheckpointMeta::new(3, 0.25)).unwrap();

        TestBackend::seed(2);
        let fresh = cfg.init::<TestBackend>(&device).unwrap();
        assert_ne!(weights(&fresh), weights(&model));
        assert_ne!(batch_norm_state(&fresh), batch_norm_state(&model));

        let (restored, _optim, meta) = manager
            .load("best", fresh, AdamWConfig::new().init::<TestBackend, Model>(), &device)
            .unwrap();

        assert_eq!(weights(&restored), weights(&model));
        assert_eq!(batch_norm_state(&restored), batch_norm_state(&model));
        assert_eq!(meta.epoch, 3);
        assert_eq!(meta.best_loss, 0.25);
        assert_eq!(meta.next_epoch(), 4);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_restored_optimizer_continues_identically() {
        let dir = temp_dir("optim");
        let device = Default::default();
        let cfg = TextAutoencoderConfig::new(4, 6, 4, 2, 6);

        TestBackend::seed(3);
        let mut model = cfg.init::<TestBackend>(&device).unwrap();
        let mut optim = AdamWConfig::new().init::<TestBackend, Model>();

        let x = Tensor::<TestBackend, 3>::random([2, 6, 4], Distribution::Uniform(-0.5, 0.5), &device);
        for _ in 0..3 {
            model = train_once(model, &mut optim, &x);
        }

        let manager = CheckpointManager::new(&dir);
        manager.save("best", &model, &optim, &CheckpointMeta::new(2, 0.5)).unwrap();

        let (restored, mut restored_optim, _) = manager
            .load(
                "best",
                cfg.init::<TestBackend>(&device).unwrap(),
                AdamWConfig::new().init::<TestBackend, Model>(),
                &device,
            )
            .unwrap();

        // Same gradients, same moments: the next update matches exactly
        let next = Tensor::<TestBackend, 3>::random([2, 6, 4], Distribution::Uniform(-0.5, 0.5), &device);
        let continued = train_once(model, &mut optim, &next);
        let resumed   = train_once(restored.clone(), &mut restored_optim, &next);
        assert_eq!(weights(&resumed), weights(&continued));

        // Without the saved moments the update differs
        let mut blank = AdamWConfig::new().init::<TestBackend, Model>();
        let restarted = train_once(restored, &mut blank, &next);
        assert_ne!(weights(&restarted), weights(&continued));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let dir = temp_dir("missing");
        let manager = CheckpointManager::new(&dir);
        assert!(manager.read_meta("nothing_here").is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let dir = temp_dir("schema");
        let manager = CheckpointManager::new(&dir);
        fs::create_dir_all(dir.join("future")).unwrap();
        fs::write(
            dir.join("future").join(MANIFEST_FILE),
            r#"{"schema_version": 99, "epoch": 1, "best_loss": 0.5}"#,
        )
        .unwrap();
        assert!(manager.read_meta("future").is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = temp_dir("config");
        let manager = CheckpointManager::new(&dir);
        let cfg = TrainConfig { epochs: 7, latent_size: 12, ..TrainConfig::default() };
        manager.save_config(&cfg).unwrap();
        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.epochs, 7);
        assert_eq!(loaded.latent_size, 12);
        let _ = fs::remove_dir_all(&dir);
    }
}
