use burn::{
    nn::{
        PaddingConfig2d, Relu,
        conv::{Conv2d, Conv2dConfig},
        norm::{BatchNorm, BatchNormConfig},
    },
    prelude::*,
};

use crate::error::ModelError;

/// Configuration for [`ConvNormAct`].
#[derive(Config, Debug)]
pub struct ConvNormActConfig {
    /// Input and output channel counts.
    pub channels: [usize; 2],

    #[config(default = "1")]
    pub kernel_size: usize,

    #[config(default = "0")]
    pub padding: usize,

    #[config(default = "1")]
    pub dilation: usize,

    #[config(default = "1")]
    pub stride: usize,

    #[config(default = "1")]
    pub groups: usize,

    #[config(default = "true")]
    pub activation: bool,
}

impl ConvNormActConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<ConvNormAct<B>, ModelError> {
        let [in_channels, out_channels] = self.channels;

        if self.groups == 0 {
            return Err(ModelError::InvalidConfiguration(
                "group count must be positive".into(),
            ));
        }
        if in_channels % self.groups != 0 || out_channels % self.groups != 0 {
            return Err(ModelError::InvalidConfiguration(format!(
                "channels {in_channels}->{out_channels} are not divisible by {} groups",
                self.groups
            )));
        }

        let conv = Conv2dConfig::new(self.channels, [self.kernel_size, self.kernel_size])
            .with_padding(PaddingConfig2d::Explicit(self.padding, self.padding))
            .with_dilation([self.dilation, self.dilation])
            .with_stride([self.stride, self.stride])
            .with_groups(self.groups)
            .with_bias(false)
            .init(device);

        Ok(ConvNormAct {
            conv,
            norm: BatchNormConfig::new(out_channels).init(device),
            act: self.activation.then(Relu::new),
        })
    }
}

/// Fused convolution, batch normalization and optional ReLU.
///
/// The convolution carries no additive bias; normalization supplies the
/// per-channel shift instead.
#[derive(Module, Debug)]
pub struct ConvNormAct<B: Backend> {
    conv: Conv2d<B>,
    norm: BatchNorm<B>,
    act: Option<Relu>,
}

impl<B: Backend> ConvNormAct<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.norm.forward(self.conv.forward(x));
        match &self.act {
            Some(act) => act.forward(x),
            None => x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn rejects_indivisible_groups() {
        let device = <TestBackend as Backend>::Device::default();
        let result = ConvNormActConfig::new([6, 9])
            .with_groups(4)
            .init::<TestBackend>(&device);
        assert!(matches!(result, Err(ModelError::InvalidConfiguration(_))));
    }

    #[test]
    fn rejects_zero_groups() {
        let device = <TestBackend as Backend>::Device::default();
        let result = ConvNormActConfig::new([4, 4])
            .with_groups(0)
            .init::<TestBackend>(&device);
        assert!(matches!(result, Err(ModelError::InvalidConfiguration(_))));
    }

    #[test]
    fn maps_channels_and_strides_spatially() {
        let device = <TestBackend as Backend>::Device::default();
        let layer = ConvNormActConfig::new([4, 8])
            .with_stride(2)
            .init::<TestBackend>(&device)
            .unwrap();

        let out = layer.forward(Tensor::<TestBackend, 4>::ones([2, 4, 8, 8], &device));
        let dims: [usize; 4] = out.shape().dims();
        assert_eq!(dims, [2, 8, 4, 4]);
    }

    #[test]
    fn activation_clips_negative_values() {
        let device = <TestBackend as Backend>::Device::default();
        let layer = ConvNormActConfig::new([2, 4])
            .init::<TestBackend>(&device)
            .unwrap();

        let input = Tensor::<TestBackend, 4>::ones([1, 2, 4, 4], &device) - 2.0;
        let out = layer.forward(input);
        let min = out.min().into_scalar();
        assert!(min >= 0.0);
    }

    #[test]
    fn grouped_convolution_preserves_shape() {
        let device = <TestBackend as Backend>::Device::default();
        let layer = ConvNormActConfig::new([8, 8])
            .with_kernel_size(3)
            .with_padding(1)
            .with_groups(4)
            .init::<TestBackend>(&device)
            .unwrap();

        let out = layer.forward(Tensor::<TestBackend, 4>::ones([1, 8, 6, 6], &device));
        let dims: [usize; 4] = out.shape().dims();
        assert_eq!(dims, [1, 8, 6, 6]);
    }
}
