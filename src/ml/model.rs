use anyhow::{ensure, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ml::decoder::{DecoderOutput, DeconvolutionDecoder, DeconvolutionDecoderConfig};
use crate::ml::encoder::{ConvolutionEncoder, ConvolutionEncoderConfig};

/// Sequence lengths at each stage of the conv stack.
///
/// t1 = sentence length, t2 = ⌊(t1 − k)/2⌋ + 1, t3 = ⌊(t2 − k)/2⌋ + 1
/// where k is the filter shape (stride 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDims {
    pub t1: usize,
    pub t2: usize,
    pub t3: usize,
    pub filter_shape: usize,
}

impl ModelDims {
    pub fn new(sentence_len: usize, filter_shape: usize) -> Result<Self> {
        ensure!(filter_shape > 0, "filter_shape must be at least 1");
        ensure!(
            sentence_len >= filter_shape,
            "sentence length {sentence_len} is shorter than filter_shape {filter_shape}"
        );
        let t1 = sentence_len;
        let t2 = (t1 - filter_shape) / 2 + 1;
        ensure!(
            t2 >= filter_shape,
            "second conv stage length {t2} is shorter than filter_shape {filter_shape}; \
             use a longer sentence length or a smaller filter"
        );
        let t3 = (t2 - filter_shape) / 2 + 1;
        Ok(Self { t1, t2, t3, filter_shape })
    }

    /// Output padding for the transposed stage that rebuilds t2 from t3.
    pub fn stage2_padding_out(&self) -> usize {
        (self.t2 - self.filter_shape) % 2
    }

    /// Output padding for the transposed stage that rebuilds t1 from t2.
    pub fn stage1_padding_out(&self) -> usize {
        (self.t1 - self.filter_shape) % 2
    }
}

#[derive(Config, Debug)]
pub struct TextAutoencoderConfig {
    pub embedding_dim: usize,
    pub sentence_len:  usize,
    pub filter_size:   usize,
    pub filter_shape:  usize,
    pub latent_size:   usize,
    #[config(default = 0.01)]
    pub tau: f64,
}

impl TextAutoencoderConfig {
    pub fn dims(&self) -> Result<ModelDims> {
        ModelDims::new(self.sentence_len, self.filter_shape)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<TextAutoencoder<B>> {
        ensure!(self.tau > 0.0, "tau must be positive, got {}", self.tau);
        let dims = self.dims()?;

        let encoder = ConvolutionEncoderConfig::new(
            self.embedding_dim, self.filter_size, self.filter_shape, self.latent_size,
        )
        .init(&dims, device);

        let decoder = DeconvolutionDecoderConfig::new(
            self.embedding_dim, self.filter_size, self.filter_shape, self.latent_size,
        )
        .with_tau(self.tau)
        .init(&dims, device);

        Ok(TextAutoencoder { encoder, decoder })
    }
}

#[derive(Module, Debug)]
pub struct TextAutoencoder<B: Backend> {
    pub encoder: ConvolutionEncoder<B>,
    pub decoder: DeconvolutionDecoder<B>,
}

impl<B: Backend> TextAutoencoder<B> {
    /// sentence → latent → (predicted vectors, vocabulary log-probabilities)
    ///
    /// x: [batch, seq_len, dim], vocabulary: [vocab, dim]
    pub fn forward(&self, x: Tensor<B, 3>, vocabulary: Tensor<B, 2>) -> DecoderOutput<B> {
        self.decoder.decode(self.encoder.forward(x), vocabulary)
    }

    /// Predicted word vectors only; this is what the loss is computed on.
    pub fn reconstruct(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self.decoder.forward(self.encoder.forward(x))
    }

    pub fn encode(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        self.encoder.forward(x)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::module::AutodiffModule;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;
    type TestAutodiff = burn::backend::Autodiff<NdArray>;

    fn config(sentence_len: usize, filter_shape: usize) -> TextAutoencoderConfig {
        TextAutoencoderConfig::new(4, sentence_len, 6, filter_shape, 8)
    }

    #[test]
    fn test_dims_arithmetic() {
        let dims = ModelDims::new(70, 5).unwrap();
        assert_eq!((dims.t1, dims.t2, dims.t3), (70, 33, 15));
        let dims = ModelDims::new(6, 2).unwrap();
        assert_eq!((dims.t1, dims.t2, dims.t3), (6, 3, 1));
    }

    #[test]
    fn test_invalid_dims_rejected() {
        assert!(ModelDims::new(3, 5).is_err());
        // t2 = 2 < filter_shape 3
        assert!(ModelDims::new(6, 3).is_err());
        assert!(ModelDims::new(6, 0).is_err());
    }

    #[test]
    fn test_decoder_output_matches_encoder_input_shape() {
        let device = Default::default();
        for (seq_len, filter_shape) in [(70, 5), (6, 2), (11, 3), (10, 3), (12, 3), (9, 1)] {
            let model = config(seq_len, filter_shape).init::<TestBackend>(&device).unwrap();
            for batch in [1, 2] {
                let x = Tensor::<TestBackend, 3>::random(
                    [batch, seq_len, 4], Distribution::Uniform(-1.0, 1.0), &device,
                );
                assert_eq!(
                    model.reconstruct(x).dims(),
                    [batch, seq_len, 4],
                    "seq_len={seq_len} filter_shape={filter_shape}"
                );
            }
        }
    }

    #[test]
    fn test_log_prob_sums_to_one() {
        let device = Default::default();
        let vocabulary = Tensor::<TestBackend, 2>::random(
            [5, 4], Distribution::Uniform(-1.0, 1.0), &device,
        );
        for tau in [0.01, 0.5, 2.0] {
            let model = config(6, 2).with_tau(tau).init::<TestBackend>(&device).unwrap();
            let x = Tensor::<TestBackend, 3>::random(
                [2, 6, 4], Distribution::Uniform(-1.0, 1.0), &device,
            );
            let out = model.forward(x, vocabulary.clone());
            assert_eq!(out.log_prob.dims(), [2, 6, 5]);

            let sums = out.log_prob.exp().sum_dim(2).into_data().to_vec::<f32>().unwrap();
            assert_eq!(sums.len(), 12);
            for s in sums {
                assert!((s - 1.0).abs() < 1e-4, "tau={tau} sum={s}");
            }
        }
    }

    #[test]
    fn test_inference_is_deterministic() {
        let device = Default::default();
        let model = config(11, 3).init::<TestAutodiff>(&device).unwrap().valid();
        let vocabulary = Tensor::<TestBackend, 2>::random(
            [5, 4], Distribution::Uniform(-1.0, 1.0), &device,
        );
        let x = Tensor::<TestBackend, 3>::random(
            [3, 11, 4], Distribution::Uniform(-1.0, 1.0), &device,
        );

        let h1 = model.encode(x.clone()).into_data().to_vec::<f32>().unwrap();
        let h2 = model.encode(x.clone()).into_data().to_vec::<f32>().unwrap();
        assert_eq!(h1, h2);

        let p1 = model.forward(x.clone(), vocabulary.clone()).log_prob.into_data().to_vec::<f32>().unwrap();
        let p2 = model.forward(x, vocabulary).log_prob.into_data().to_vec::<f32>().unwrap();
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_non_positive_tau_rejected() {
        let device = Default::default();
        assert!(config(6, 2).with_tau(0.0).init::<TestBackend>(&device).is_err());
    }
}
