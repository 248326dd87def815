// ============================================================
// Layer 5 — Deconvolution Decoder
// ============================================================
// Mirror image of the encoder: a latent vector is expanded back
// into a sequence of predicted word vectors.
//
//   [B, latent, 1, 1]
//      │  deconv (t3 × 1)                         → BN → SELU
//      ▼
//   [B, 2F, t3, 1]
//      │  deconv (filter_shape × 1), stride (2, 1) → BN → SELU
//      ▼
//   [B, F, t2, 1]
//      │  deconv (filter_shape × E), stride (2, 1) → tanh
//      ▼
//   [B, 1, t1, E]  →  x_hat: [B, t1, E]
//
// Stride-2 stages floor away one row when (len − filter_shape) is
// odd, so the matching transposed stage gets one row of output
// padding and the decoder always reproduces t1 exactly.
//
// Scoring against the vocabulary:
//   Instead of a learned softmax projection, each predicted
//   position is compared to every vocabulary vector:
//
//     log p(w | position) = log_softmax( cos(x̂, e_w) / τ )
//
//   Both sides are L2-normalised, so the dot product is the
//   cosine similarity. A small τ sharpens the distribution.

use burn::{
    nn::{
        conv::{ConvTranspose2d, ConvTranspose2dConfig},
        BatchNorm, BatchNormConfig,
    },
    prelude::*,
    tensor::activation::{log_softmax, tanh},
};

use crate::ml::layers::{init_conv_transpose2d, l2_normalize, selu};
use crate::ml::model::ModelDims;

#[derive(Config, Debug)]
pub struct DeconvolutionDecoderConfig {
    pub embedding_dim: usize,
    pub filter_size:   usize,
    pub filter_shape:  usize,
    pub latent_size:   usize,
    #[config(default = 0.01)]
    pub tau: f64,
}

impl DeconvolutionDecoderConfig {
    pub fn init<B: Backend>(&self, dims: &ModelDims, device: &B::Device) -> DeconvolutionDecoder<B> {
        let deconv1 = init_conv_transpose2d(
            ConvTranspose2dConfig::new([self.latent_size, self.filter_size * 2], [dims.t3, 1]),
            device,
        );
        let norm1 = BatchNormConfig::new(self.filter_size * 2).init(device);

        let deconv2 = init_conv_transpose2d(
            ConvTranspose2dConfig::new([self.filter_size * 2, self.filter_size], [self.filter_shape, 1])
                .with_stride([2, 1])
                .with_padding_out([dims.stage2_padding_out(), 0]),
            device,
        );
        let norm2 = BatchNormConfig::new(self.filter_size).init(device);

        let deconv3 = init_conv_transpose2d(
            ConvTranspose2dConfig::new([self.filter_size, 1], [self.filter_shape, self.embedding_dim])
                .with_stride([2, 1])
                .with_padding_out([dims.stage1_padding_out(), 0]),
            device,
        );

        DeconvolutionDecoder {
            deconv1, norm1, deconv2, norm2, deconv3,
            latent_size:   self.latent_size,
            sentence_len:  dims.t1,
            embedding_dim: self.embedding_dim,
            tau:           self.tau,
        }
    }
}

#[derive(Module, Debug)]
pub struct DeconvolutionDecoder<B: Backend> {
    pub deconv1: ConvTranspose2d<B>,
    pub norm1:   BatchNorm<B, 2>,
    pub deconv2: ConvTranspose2d<B>,
    pub norm2:   BatchNorm<B, 2>,
    pub deconv3: ConvTranspose2d<B>,
    pub latent_size:   usize,
    pub sentence_len:  usize,
    pub embedding_dim: usize,
    pub tau:           f64,
}

/// Everything the decoder predicts for a batch.
pub struct DecoderOutput<B: Backend> {
    /// Predicted word vectors: [batch, seq_len, embedding_dim]
    pub x_hat: Tensor<B, 3>,
    /// Per-position log-probabilities over the vocabulary: [batch, seq_len, vocab]
    pub log_prob: Tensor<B, 3>,
}

impl<B: Backend> DeconvolutionDecoder<B> {
    /// h: [batch, latent_size] → x_hat: [batch, seq_len, embedding_dim]
    pub fn forward(&self, h: Tensor<B, 2>) -> Tensor<B, 3> {
        let [batch_size, _] = h.dims();
        let h = h.reshape([batch_size, self.latent_size, 1, 1]);

        let h2 = selu(self.norm1.forward(self.deconv1.forward(h)));
        let h1 = selu(self.norm2.forward(self.deconv2.forward(h2)));
        let x_hat = tanh(self.deconv3.forward(h1));

        x_hat.reshape([batch_size, self.sentence_len, self.embedding_dim])
    }

    /// Temperature-scaled cosine log-probabilities.
    ///
    /// x_hat: [batch, seq_len, dim], vocabulary: [vocab, dim] → [batch, seq_len, vocab]
    pub fn score(&self, x_hat: Tensor<B, 3>, vocabulary: Tensor<B, 2>) -> Tensor<B, 3> {
        let [batch_size, seq_len, dim] = x_hat.dims();
        let [vocab_size, _] = vocabulary.dims();

        let x = l2_normalize(x_hat, 2).reshape([batch_size * seq_len, dim]);
        let w = l2_normalize(vocabulary, 1);

        let logits = x.matmul(w.transpose()).div_scalar(self.tau);
        log_softmax(logits.reshape([batch_size, seq_len, vocab_size]), 2)
    }

    pub fn decode(&self, h: Tensor<B, 2>, vocabulary: Tensor<B, 2>) -> DecoderOutput<B> {
        let x_hat    = self.forward(h);
        let log_prob = self.score(x_hat.clone(), vocabulary);
        DecoderOutput { x_hat, log_prob }
    }
}
