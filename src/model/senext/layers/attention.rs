use burn::{
    nn::{
        Relu,
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
    },
    prelude::*,
    tensor::activation::sigmoid,
};

use crate::error::ModelError;

/// Configuration for [`ChannelAttention`].
#[derive(Config, Debug)]
pub struct ChannelAttentionConfig {
    pub channels: usize,

    #[config(default = "16")]
    pub reduction: usize,
}

impl ChannelAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<ChannelAttention<B>, ModelError> {
        if self.reduction == 0 || self.channels % self.reduction != 0 {
            return Err(ModelError::InvalidConfiguration(format!(
                "channel count {} is not divisible by reduction {}",
                self.channels, self.reduction
            )));
        }
        let squeezed = self.channels / self.reduction;

        Ok(ChannelAttention {
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            squeeze: Conv2dConfig::new([self.channels, squeezed], [1, 1]).init(device),
            relu: Relu::new(),
            excite: Conv2dConfig::new([squeezed, self.channels], [1, 1]).init(device),
        })
    }
}

/// Channel attention (cSE): reweights each channel by a learned scalar in
/// `[0, 1]` derived from its global average.
#[derive(Module, Debug)]
pub struct ChannelAttention<B: Backend> {
    pool: AdaptiveAvgPool2d,
    squeeze: Conv2d<B>,
    relu: Relu,
    excite: Conv2d<B>,
}

impl<B: Backend> ChannelAttention<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let gate = self.pool.forward(x.clone());
        let gate = self.squeeze.forward(gate);
        let gate = self.relu.forward(gate);
        let gate = self.excite.forward(gate);
        x * sigmoid(gate)
    }
}

/// Configuration for [`SpatialAttention`].
#[derive(Config, Debug)]
pub struct SpatialAttentionConfig {
    pub channels: usize,
}

impl SpatialAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SpatialAttention<B> {
        SpatialAttention {
            project: Conv2dConfig::new([self.channels, 1], [1, 1]).init(device),
        }
    }
}

/// Spatial attention (sSE): reweights each spatial position by a learned
/// scalar in `[0, 1]`, broadcast across channels.
#[derive(Module, Debug)]
pub struct SpatialAttention<B: Backend> {
    project: Conv2d<B>,
}

impl<B: Backend> SpatialAttention<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let gate = sigmoid(self.project.forward(x.clone()));
        x * gate
    }
}

/// Configuration for [`CombinedAttention`].
#[derive(Config, Debug)]
pub struct CombinedAttentionConfig {
    pub channels: usize,

    #[config(default = "16")]
    pub reduction: usize,
}

impl CombinedAttentionConfig {
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<CombinedAttention<B>, ModelError> {
        Ok(CombinedAttention {
            channel: ChannelAttentionConfig::new(self.channels)
                .with_reduction(self.reduction)
                .init(device)?,
            spatial: SpatialAttentionConfig::new(self.channels).init(device),
        })
    }
}

/// Concurrent spatial and channel attention (scSE): the sum of both gated
/// views of the input.
#[derive(Module, Debug)]
pub struct CombinedAttention<B: Backend> {
    channel: ChannelAttention<B>,
    spatial: SpatialAttention<B>,
}

impl<B: Backend> CombinedAttention<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.channel.forward(x.clone()) + self.spatial.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn device() -> <TestBackend as Backend>::Device {
        Default::default()
    }

    #[test]
    fn channel_attention_rejects_indivisible_reduction() {
        let result = ChannelAttentionConfig::new(10)
            .with_reduction(16)
            .init::<TestBackend>(&device());
        assert!(matches!(result, Err(ModelError::InvalidConfiguration(_))));
    }

    #[test]
    fn channel_gate_never_amplifies() {
        let device = device();
        let attention = ChannelAttentionConfig::new(16)
            .init::<TestBackend>(&device)
            .unwrap();

        let input = Tensor::<TestBackend, 4>::ones([1, 16, 4, 4], &device);
        let out = attention.forward(input);
        let values = out.into_data().convert::<f32>().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn spatial_gate_never_amplifies() {
        let device = device();
        let attention = SpatialAttentionConfig::new(8).init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 4>::ones([2, 8, 3, 3], &device);
        let out = attention.forward(input);
        let values = out.into_data().convert::<f32>().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn combined_attention_preserves_shape() {
        let device = device();
        let attention = CombinedAttentionConfig::new(16)
            .init::<TestBackend>(&device)
            .unwrap();

        let out = attention.forward(Tensor::<TestBackend, 4>::ones([1, 16, 5, 5], &device));
        let dims: [usize; 4] = out.shape().dims();
        assert_eq!(dims, [1, 16, 5, 5]);
    }
}
