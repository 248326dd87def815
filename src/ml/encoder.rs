// ============================================================
// Layer 5 — Convolution Encoder
// ============================================================
// Compresses a padded sentence into a single latent vector.
//
// The embedded sentence is treated as a one-channel image of
// sentence_len × embedding_dim and pushed through three conv
// stages:
//
//   [B, 1, t1, E]
//      │  conv (filter_shape × E), stride (2, 1) → BN → SELU
//      ▼
//   [B, F, t2, 1]
//      │  conv (filter_shape × 1), stride (2, 1) → BN → SELU
//      ▼
//   [B, 2F, t3, 1]
//      │  conv (t3 × 1) collapses what is left of the sequence → tanh
//      ▼
//   [B, latent, 1, 1]  →  [B, latent]
//
// with t2 = ⌊(t1 − filter_shape)/2⌋ + 1 and t3 = ⌊(t2 − filter_shape)/2⌋ + 1.
// The final tanh keeps every latent component in [-1, 1].
//
// Reference: Zhang et al. (2017) Deconvolutional Paragraph
//            Representation Learning

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig,
    },
    prelude::*,
    tensor::activation::tanh,
};

use crate::ml::layers::{init_conv2d, selu};
use crate::ml::model::ModelDims;

#[derive(Config, Debug)]
pub struct ConvolutionEncoderConfig {
    pub embedding_dim: usize,
    pub filter_size:   usize,
    pub filter_shape:  usize,
    pub latent_size:   usize,
}

impl ConvolutionEncoderConfig {
    pub fn init<B: Backend>(&self, dims: &ModelDims, device: &B::Device) -> ConvolutionEncoder<B> {
        let conv1 = init_conv2d(
            Conv2dConfig::new([1, self.filter_size], [self.filter_shape, self.embedding_dim])
                .with_stride([2, 1]),
            device,
        );
        let norm1 = BatchNormConfig::new(self.filter_size).init(device);

        let conv2 = init_conv2d(
            Conv2dConfig::new([self.filter_size, self.filter_size * 2], [self.filter_shape, 1])
                .with_stride([2, 1]),
            device,
        );
        let norm2 = BatchNormConfig::new(self.filter_size * 2).init(device);

        let conv3 = init_conv2d(
            Conv2dConfig::new([self.filter_size * 2, self.latent_size], [dims.t3, 1]),
            device,
        );

        ConvolutionEncoder {
            conv1, norm1, conv2, norm2, conv3,
            latent_size: self.latent_size,
        }
    }
}

#[derive(Module, Debug)]
pub struct ConvolutionEncoder<B: Backend> {
    pub conv1: Conv2d<B>,
    pub norm1: BatchNorm<B, 2>,
    pub conv2: Conv2d<B>,
    pub norm2: BatchNorm<B, 2>,
    pub conv3: Conv2d<B>,
    pub latent_size: usize,
}

impl<B: Backend> ConvolutionEncoder<B> {
    /// x: [batch, seq_len, embedding_dim] → [batch, latent_size]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, seq_len, embedding_dim] = x.dims();
        let x = x.reshape([batch_size, 1, seq_len, embedding_dim]);

        let h1 = selu(self.norm1.forward(self.conv1.forward(x)));
        let h2 = selu(self.norm2.forward(self.conv2.forward(h1)));
        let h  = tanh(self.conv3.forward(h2));

        // Reshape rather than squeeze so a batch of one keeps its batch axis.
        h.reshape([batch_size, self.latent_size])
    }

    /// Encode a single sentence: [seq_len, embedding_dim] → [1, latent_size]
    pub fn encode_one(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward(x.unsqueeze::<3>())
    }
}
