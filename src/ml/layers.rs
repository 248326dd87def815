// ============================================================
// Layer 5 — Shared Layer Helpers
// ============================================================
// Small building blocks used by both the encoder and decoder:
//
//   init_conv2d / init_conv_transpose2d
//       Xavier-uniform weights and a small positive bias (0.001).
//       Called once per named layer at construction time.
//
//   selu
//       Scaled exponential linear unit (Klambauer et al. 2017):
//       scale · (max(0, x) + min(0, α · (eˣ − 1)))
//
//   l2_normalize
//       Divide each vector along `dim` by its Euclidean norm.

use burn::{
    module::Param,
    nn::conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
    prelude::*,
    tensor::Distribution,
};

pub const CONV_BIAS_INIT: f64 = 0.001;

const SELU_ALPHA: f64 = 1.673_263_242_354_377_3;
const SELU_SCALE: f64 = 1.050_700_987_355_480_5;
const NORM_EPS: f64 = 1e-24;

/// Xavier-uniform over a 4-D kernel. Both Conv2d ([out, in, kh, kw])
/// and ConvTranspose2d ([in, out, kh, kw]) give the same
/// fan_in + fan_out = (in + out) · kh · kw.
fn xavier_uniform<B: Backend>(weight: Param<Tensor<B, 4>>) -> Param<Tensor<B, 4>> {
    let current = weight.val();
    let [d0, d1, kh, kw] = current.dims();
    let bound = (6.0 / ((d0 + d1) * kh * kw) as f64).sqrt();
    Param::from_tensor(Tensor::random(
        current.shape(),
        Distribution::Uniform(-bound, bound),
        &current.device(),
    ))
}

fn constant_bias<B: Backend>(
    bias:  Option<Param<Tensor<B, 1>>>,
    value: f64,
) -> Option<Param<Tensor<B, 1>>> {
    bias.map(|b| {
        let current = b.val();
        Param::from_tensor(Tensor::full(current.shape(), value, &current.device()))
    })
}

pub fn init_conv2d<B: Backend>(config: Conv2dConfig, device: &B::Device) -> Conv2d<B> {
    let mut conv = config.init(device);
    conv.weight = xavier_uniform(conv.weight);
    conv.bias = constant_bias(conv.bias.take(), CONV_BIAS_INIT);
    conv
}

pub fn init_conv_transpose2d<B: Backend>(
    config: ConvTranspose2dConfig,
    device: &B::Device,
) -> ConvTranspose2d<B> {
    let mut deconv = config.init(device);
    deconv.weight = xavier_uniform(deconv.weight);
    deconv.bias = constant_bias(deconv.bias.take(), CONV_BIAS_INIT);
    deconv
}

pub fn selu<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    let positive = x.clone().clamp_min(0.0);
    let negative = x.clamp_max(0.0).exp().sub_scalar(1.0).mul_scalar(SELU_ALPHA);
    positive.add(negative).mul_scalar(SELU_SCALE)
}

pub fn l2_normalize<B: Backend, const D: usize>(x: Tensor<B, D>, dim: usize) -> Tensor<B, D> {
    let norm = x.clone().powf_scalar(2.0).sum_dim(dim).clamp_min(NORM_EPS).sqrt();
    x.div(norm)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_selu_matches_definition() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 1>::from_floats([-1.0, 0.0, 2.0], &device);
        let y = selu(x).into_data().to_vec::<f32>().unwrap();

        let neg = (SELU_SCALE * SELU_ALPHA * ((-1.0f64).exp() - 1.0)) as f32;
        assert!((y[0] - neg).abs() < 1e-5);
        assert!(y[1].abs() < 1e-7);
        assert!((y[2] - (2.0 * SELU_SCALE) as f32).abs() < 1e-5);
    }

    #[test]
    fn test_l2_normalize_unit_rows() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 2>::from_floats([[3.0, 4.0], [0.5, 0.0]], &device);
        let y = l2_normalize(x, 1).into_data().to_vec::<f32>().unwrap();
        assert!((y[0] - 0.6).abs() < 1e-6);
        assert!((y[1] - 0.8).abs() < 1e-6);
        assert!((y[2] - 1.0).abs() < 1e-6);
        assert!(y[3].abs() < 1e-6);
    }

    #[test]
    fn test_conv_bias_is_constant() {
        let device = Default::default();
        let conv: Conv2d<TestBackend> =
            init_conv2d(Conv2dConfig::new([1, 3], [2, 4]).with_stride([2, 1]), &device);
        let bias = conv.bias.unwrap().val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(bias.len(), 3);
        assert!(bias.iter().all(|b| (*b - CONV_BIAS_INIT as f32).abs() < 1e-9));
    }

    #[test]
    fn test_xavier_bound() {
        let device = Default::default();
        let conv: Conv2d<TestBackend> = init_conv2d(Conv2dConfig::new([2, 4], [3, 1]), &device);
        let bound = (6.0f32 / ((4 + 2) * 3) as f32).sqrt();
        let w = conv.weight.val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(w.len(), 4 * 2 * 3);
        assert!(w.iter().all(|v| v.abs() <= bound));
    }

    #[test]
    fn test_conv_transpose_bias_is_constant() {
        let device = Default::default();
        let deconv: ConvTranspose2d<TestBackend> =
            init_conv_transpose2d(ConvTranspose2dConfig::new([4, 2], [3, 1]), &device);
        let bias = deconv.bias.unwrap().val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(bias, vec![CONV_BIAS_INIT as f32; 2]);
    }
}
