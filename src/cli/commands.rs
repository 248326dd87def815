// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `reconstruct`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{ArgAction, Args, Subcommand};
use crate::application::train_use_case::TrainConfig;
use crate::infra::checkpoint::DEFAULT_CHECKPOINT_NAME;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the text autoencoder on a dataset's post captions
    Train(TrainArgs),

    /// Encode and decode one sentence with a trained checkpoint
    Reconstruct(ReconstructArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Folder name of the target dataset
    #[arg(long)]
    pub target_dataset: String,

    /// Root holding one folder per dataset:
    /// <dataset_dir>/<dataset>/<location>/<post>/text.txt
    #[arg(long, default_value = "data/dataset")]
    pub dataset_dir: String,

    /// Directory with FASTTEXT_<dataset>.vec word-vector files
    #[arg(long, default_value = "data/embedding")]
    pub embedding_dir: String,

    /// Directory to save checkpoints and the training config
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Directory for Evaluation_result.csv
    #[arg(long, default_value = "output")]
    pub output_dir: String,

    /// Every caption is padded or truncated to this many tokens
    #[arg(long, default_value_t = 70)]
    pub max_sentence_len: usize,

    /// Initial learning rate
    #[arg(long, default_value_t = 3e-4)]
    pub lr: f64,

    /// AdamW weight decay
    #[arg(long, default_value_t = 3e-5)]
    pub weight_decay: f64,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 80)]
    pub epochs: usize,

    /// Number of sentences processed together in one forward pass
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Halve the learning rate every this many epochs (0 = constant rate)
    #[arg(long, default_value_t = 0)]
    pub lr_decay_interval: usize,

    /// Log a decoded sample every this many batches of an epoch,
    /// starting with the first (0 = never)
    #[arg(long, default_value_t = 100)]
    pub log_interval: usize,

    /// Validate every this many epochs
    #[arg(long, default_value_t = 1)]
    pub test_interval: usize,

    /// Consider saving a checkpoint every this many epochs
    #[arg(long, default_value_t = 1)]
    pub save_interval: usize,

    /// Shuffle training data every epoch
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub shuffle: bool,

    /// Fraction of posts used for training; the rest validates
    #[arg(long, default_value_t = 0.9)]
    pub split_rate: f64,

    /// Size of the latent sentence vector
    #[arg(long, default_value_t = 900)]
    pub latent_size: usize,

    /// Number of convolution filters per stage
    #[arg(long, default_value_t = 300)]
    pub filter_size: usize,

    /// Kernel height (in tokens) of the strided stages
    #[arg(long, default_value_t = 5)]
    pub filter_shape: usize,

    /// Number of conv stages; only 3 is supported
    #[arg(long, default_value_t = 3)]
    pub num_layer: usize,

    /// Softmax temperature for the vocabulary scores
    #[arg(long, default_value_t = 0.01)]
    pub tau: f64,

    /// Seed for weight init, the split and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Send start/end notifications for the run
    #[arg(long)]
    pub noti: bool,

    /// Checkpoint name to resume from
    #[arg(long)]
    pub resume: Option<String>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            target_dataset:    a.target_dataset,
            dataset_dir:       a.dataset_dir,
            embedding_dir:     a.embedding_dir,
            checkpoint_dir:    a.checkpoint_dir,
            output_dir:        a.output_dir,
            max_sentence_len:  a.max_sentence_len,
            batch_size:        a.batch_size,
            epochs:            a.epochs,
            lr:                a.lr,
            weight_decay:      a.weight_decay,
            lr_decay_interval: a.lr_decay_interval,
            log_interval:      a.log_interval,
            test_interval:     a.test_interval,
            save_interval:     a.save_interval,
            shuffle:           a.shuffle,
            split_rate:        a.split_rate,
            latent_size:       a.latent_size,
            filter_size:       a.filter_size,
            filter_shape:      a.filter_shape,
            num_layer:         a.num_layer,
            tau:               a.tau,
            seed:              a.seed,
            noti:              a.noti,
            resume:            a.resume,
        }
    }
}

/// All arguments for the `reconstruct` command
#[derive(Args, Debug)]
pub struct ReconstructArgs {
    /// The sentence to encode and decode
    #[arg(long)]
    pub sentence: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Name of the checkpoint to load
    #[arg(long, default_value = DEFAULT_CHECKPOINT_NAME)]
    pub checkpoint: String,
}
