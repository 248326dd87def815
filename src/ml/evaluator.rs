// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Scores a model on held-out sentences.
//
// Per batch:
//   1. Reconstruct the embedded sentences      (no gradients)
//   2. MSE between predicted and true vectors  → loss
//   3. Read the reference words straight from the batch ids,
//      decode the prediction through the nearest-neighbour
//      index, drop <PAD>
//   4. ROUGE-1 / ROUGE-2 of prediction vs. reference,
//      averaged over the sentences of the batch
//
// The epoch result is the plain mean of the per-batch values.
//
// Callers pass `model.valid()`: the inner-backend copy runs
// batch norm with its running statistics and tracks no
// gradients, while the training model itself is untouched.

use anyhow::Result;
use burn::{
    nn::loss::{MseLoss, Reduction},
    prelude::*,
};
use indicatif::ProgressBar;

use crate::data::batcher::SentenceBatch;
use crate::domain::sentence::strip_padding;
use crate::infra::{nearest_neighbor::NearestNeighborIndex, rouge::RougeScorer};
use crate::ml::model::TextAutoencoder;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationResult {
    pub avg_loss: f64,
    pub rouge_1:  f64,
    pub rouge_2:  f64,
}

pub struct Evaluator<B: Backend> {
    index:  NearestNeighborIndex<B>,
    scorer: RougeScorer,
}

impl<B: Backend> Evaluator<B> {
    pub fn new(index: NearestNeighborIndex<B>, scorer: RougeScorer) -> Self {
        Self { index, scorer }
    }

    pub fn index(&self) -> &NearestNeighborIndex<B> {
        &self.index
    }

    /// Run the whole held-out set through `model`.
    ///
    /// `total_batches` only sizes the progress bar. An empty set
    /// yields a NaN loss and zero ROUGE.
    pub fn evaluate<I>(
        &self,
        model:         &TextAutoencoder<B>,
        batches:       I,
        total_batches: usize,
    ) -> Result<EvaluationResult>
    where
        I: IntoIterator<Item = SentenceBatch<B>>,
    {
        let mse = MseLoss::new();
        let pb  = ProgressBar::new(total_batches as u64);

        let mut loss_sum  = 0.0f64;
        let mut rouge_1   = 0.0f64;
        let mut rouge_2   = 0.0f64;
        let mut steps     = 0usize;

        for batch in batches {
            let x     = batch.embeddings;
            let x_hat = model.reconstruct(x.clone());

            loss_sum += mse
                .forward(x_hat.clone(), x, Reduction::Mean)
                .into_scalar()
                .elem::<f64>();

            let references  = self.index.sentences(batch.token_ids)?;
            let predictions = self.index.decode(x_hat)?;
            let (r1, r2)    = self.score_pairs(&predictions, &references);

            rouge_1 += r1;
            rouge_2 += r2;
            steps   += 1;
            pb.inc(1);
        }
        pb.finish_and_clear();

        if steps == 0 {
            tracing::warn!("Evaluation set is empty; reporting NaN loss");
            return Ok(EvaluationResult { avg_loss: f64::NAN, rouge_1: 0.0, rouge_2: 0.0 });
        }

        let n = steps as f64;
        Ok(EvaluationResult {
            avg_loss: loss_sum / n,
            rouge_1:  rouge_1 / n,
            rouge_2:  rouge_2 / n,
        })
    }

    /// Mean ROUGE-1 / ROUGE-2 over aligned prediction/reference pairs.
    pub fn score_pairs(&self, predictions: &[String], references: &[String]) -> (f64, f64) {
        if predictions.is_empty() {
            return (0.0, 0.0);
        }
        let mut r1 = 0.0;
        let mut r2 = 0.0;
        for (pred, reference) in predictions.iter().zip(references) {
            let pred      = strip_padding(pred);
            let reference = strip_padding(reference);
            r1 += self.scorer.rouge_1(&pred, &reference);
            r2 += self.scorer.rouge_2(&pred, &reference);
        }
        let n = predictions.len() as f64;
        (r1 / n, r2 / n)
    }
}
