// ============================================================
// Layer 6 — Evaluation Table
// ============================================================
// Collects one row of validation metrics per evaluated epoch
// and writes them as a CSV table when training finishes.
//
// Metrics recorded per epoch:
//   - avg_loss: mean squared reconstruction error on validation
//   - rouge_1:  average unigram overlap of decoded sentences
//   - rouge_2:  average bigram overlap of decoded sentences
//
// Output file: <output_dir>/Evaluation_result.csv
//
// Example CSV output:
//   ,avg_loss,rouge_1,rouge_2
//   0,0.041233,0.312000,0.101000
//   1,0.037710,0.354000,0.127000
//
// The leading unnamed column is the row index, so the file
// loads straight into a dataframe with the same layout as the
// evaluation tables produced by earlier experiments.

use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

pub const EVALUATION_FILE: &str = "Evaluation_result.csv";

/// One row of the evaluation table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetrics {
    /// Zero-based epoch index the row was measured after
    pub epoch: usize,

    /// Average reconstruction loss over all validation batches
    pub avg_loss: f64,

    /// Average ROUGE-1 F-score, in [0, 1]
    pub rouge_1: f64,

    /// Average ROUGE-2 F-score, in [0, 1]
    pub rouge_2: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, avg_loss: f64, rouge_1: f64, rouge_2: f64) -> Self {
        Self { epoch, avg_loss, rouge_1, rouge_2 }
    }
}

/// In-memory table, persisted once at the end of a run.
#[derive(Debug, Default, Clone)]
pub struct EvaluationTable {
    rows: Vec<EpochMetrics>,
}

impl EvaluationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, m: EpochMetrics) {
        tracing::debug!(
            "Recorded epoch {} metrics: loss={:.6}, rouge_1={:.4}, rouge_2={:.4}",
            m.epoch, m.avg_loss, m.rouge_1, m.rouge_2,
        );
        self.rows.push(m);
    }

    pub fn rows(&self) -> &[EpochMetrics] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as CSV text.
    pub fn to_csv(&self) -> String {
        let mut out = String::from(",avg_loss,rouge_1,rouge_2\n");
        for (i, m) in self.rows.iter().enumerate() {
            out.push_str(&format!(
                "{},{:.6},{:.6},{:.6}\n",
                i, m.avg_loss, m.rouge_1, m.rouge_2
            ));
        }
        out
    }

    /// Write the table to <dir>/Evaluation_result.csv and return the path.
    pub fn write_csv(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;

        let path = dir.join(EVALUATION_FILE);
        let mut f = fs::File::create(&path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;
        f.write_all(self.to_csv().as_bytes())?;

        tracing::info!("Wrote {} evaluation rows to '{}'", self.rows.len(), path.display());
        Ok(path)
    }
}
