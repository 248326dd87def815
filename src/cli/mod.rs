// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`       — trains the autoencoder on post captions
//   2. `reconstruct` — loads a checkpoint and round-trips a sentence
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ReconstructArgs, TrainArgs};

/// Top-level command line, parsed by clap.
#[derive(Parser, Debug)]
#[command(
    name = "post-autoencoder",
    version = "0.1.0",
    about = "Train a convolutional text autoencoder on social-media post captions."
)]
pub struct Cli {
    /// The subcommand to run (train or reconstruct)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)       => Self::run_train(args),
            Commands::Reconstruct(args) => Self::run_reconstruct(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on dataset: {}", args.target_dataset);

        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Best checkpoint and evaluation table saved.");
        Ok(())
    }

    /// Handles the `reconstruct` subcommand.
    fn run_reconstruct(args: ReconstructArgs) -> Result<()> {
        use crate::application::reconstruct_use_case::ReconstructUseCase;

        let use_case = ReconstructUseCase::new(&args.checkpoint_dir, &args.checkpoint)?;
        let result   = use_case.reconstruct(&args.sentence)?;

        println!("\nInput:          {}", result.input);
        println!("Reconstruction: {}", result.output);
        println!(
            "ROUGE-1 {:.4} | ROUGE-2 {:.4} | confidence {:.1}%",
            result.rouge_1, result.rouge_2, result.confidence * 100.0
        );
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;

    #[test]
    fn test_train_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "post-autoencoder", "train",
            "--target-dataset", "seoul",
            "--epochs", "5",
            "--shuffle", "false",
            "--resume", "text_autoencoder",
            "--noti",
        ])
        .unwrap();

        let Commands::Train(args) = cli.command else {
            panic!("expected the train subcommand");
        };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.target_dataset, "seoul");
        assert_eq!(cfg.epochs, 5);
        assert!(!cfg.shuffle);
        assert!(cfg.noti);
        assert_eq!(cfg.resume.as_deref(), Some("text_autoencoder"));
        assert_eq!(cfg.max_sentence_len, 70);
        assert_eq!(cfg.tau, 0.01);
    }

    #[test]
    fn test_lr_decay_is_opt_in() {
        let parse = |extra: &[&str]| -> TrainConfig {
            let mut argv = vec!["post-autoencoder", "train", "--target-dataset", "seoul"];
            argv.extend_from_slice(extra);
            match Cli::try_parse_from(argv).unwrap().command {
                Commands::Train(args) => args.into(),
                _ => panic!("expected the train subcommand"),
            }
        };
        assert_eq!(parse(&[]).lr_decay_interval, 0);
        assert_eq!(TrainConfig::default().lr_decay_interval, 0);
        assert_eq!(parse(&["--lr-decay-interval", "10"]).lr_decay_interval, 10);
    }

    #[test]
    fn test_train_requires_dataset() {
        assert!(Cli::try_parse_from(["post-autoencoder", "train"]).is_err());
    }

    #[test]
    fn test_reconstruct_defaults() {
        let cli = Cli::try_parse_from([
            "post-autoencoder", "reconstruct", "--sentence", "coffee downtown",
        ])
        .unwrap();
        let Commands::Reconstruct(args) = cli.command else {
            panic!("expected the reconstruct subcommand");
        };
        assert_eq!(args.checkpoint, "text_autoencoder");
        assert_eq!(args.checkpoint_dir, "checkpoints");
    }
}
