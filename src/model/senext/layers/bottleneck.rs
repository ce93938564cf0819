use burn::{
    module::Ignored,
    nn::pool::{AvgPool2d, AvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
    prelude::*,
    tensor::activation::relu,
};

use crate::error::ModelError;

use super::attention::{ChannelAttention, ChannelAttentionConfig};
use super::conv::{ConvNormAct, ConvNormActConfig};

/// Pooling flavour used to downsample the main path when `stride > 1`.
#[derive(Config, Debug, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Max,
    Avg,
}

/// Spatial downsampler, resolved from [`PoolKind`] once at construction.
#[derive(Debug, Clone)]
pub enum Downsampler {
    Max(MaxPool2d),
    Avg(AvgPool2d),
}

impl Downsampler {
    fn new(kind: PoolKind, stride: usize) -> Self {
        match kind {
            PoolKind::Max => Self::Max(
                MaxPool2dConfig::new([stride, stride])
                    .with_strides([stride, stride])
                    .init(),
            ),
            PoolKind::Avg => Self::Avg(
                AvgPool2dConfig::new([stride, stride])
                    .with_strides([stride, stride])
                    .init(),
            ),
        }
    }

    fn forward<B: Backend>(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        match self {
            Self::Max(pool) => pool.forward(x),
            Self::Avg(pool) => pool.forward(x),
        }
    }
}

/// Configuration for [`SeNextBottleneck`].
#[derive(Config, Debug)]
pub struct SeNextBottleneckConfig {
    /// Input and output channel counts.
    pub channels: [usize; 2],

    #[config(default = "1")]
    pub stride: usize,

    #[config(default = "32")]
    pub groups: usize,

    #[config(default = "16")]
    pub reduction: usize,

    #[config(default = "PoolKind::Max")]
    pub pool: PoolKind,

    #[config(default = "false")]
    pub shortcut: bool,
}

impl SeNextBottleneckConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SeNextBottleneck<B>, ModelError> {
        let [in_channels, out_channels] = self.channels;

        if self.groups == 0 {
            return Err(ModelError::InvalidConfiguration(
                "group count must be positive".into(),
            ));
        }
        if out_channels / 2 < self.groups {
            return Err(ModelError::InvalidConfiguration(format!(
                "half of {out_channels} output channels leaves fewer mid channels than {} groups",
                self.groups
            )));
        }
        if self.stride > 1 && !self.shortcut {
            return Err(ModelError::InvalidConfiguration(format!(
                "stride {} requires a projected shortcut, the identity branch cannot downsample",
                self.stride
            )));
        }

        // Compression target: the largest multiple of `groups` not exceeding
        // half the output width.
        let mid_channels = self.groups * (out_channels / 2 / self.groups);

        let compress = ConvNormActConfig::new([in_channels, mid_channels]).init(device)?;
        let transform = ConvNormActConfig::new([mid_channels, mid_channels])
            .with_kernel_size(3)
            .with_padding(1)
            .with_groups(self.groups)
            .init(device)?;
        let expand = ConvNormActConfig::new([mid_channels, out_channels])
            .with_activation(false)
            .init(device)?;
        let attend = ChannelAttentionConfig::new(out_channels)
            .with_reduction(self.reduction)
            .init(device)?;

        let downsample = (self.stride > 1).then(|| Downsampler::new(self.pool, self.stride));

        let shortcut = self
            .shortcut
            .then(|| {
                ConvNormActConfig::new([in_channels, out_channels])
                    .with_activation(false)
                    .init(device)
            })
            .transpose()?;
        let shortcut_pool = (self.shortcut && self.stride > 1).then(|| {
            AvgPool2dConfig::new([self.stride, self.stride])
                .with_strides([self.stride, self.stride])
                .init()
        });

        Ok(SeNextBottleneck {
            compress,
            transform,
            expand,
            attend,
            downsample: Ignored(downsample),
            shortcut,
            shortcut_pool: Ignored(shortcut_pool),
        })
    }
}

/// Squeeze-and-excitation ResNeXt bottleneck.
///
/// Compresses the channel width, applies a grouped 3x3 transform, expands
/// back out, gates the result with channel attention and merges it with the
/// shortcut branch. Without a projected shortcut the raw input is added
/// directly, which requires matching channel counts and spatial size.
#[derive(Module, Debug)]
pub struct SeNextBottleneck<B: Backend> {
    compress: ConvNormAct<B>,
    transform: ConvNormAct<B>,
    expand: ConvNormAct<B>,
    attend: ChannelAttention<B>,
    downsample: Ignored<Option<Downsampler>>,
    shortcut: Option<ConvNormAct<B>>,
    shortcut_pool: Ignored<Option<AvgPool2d>>,
}

impl<B: Backend> SeNextBottleneck<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut s = self.compress.forward(x.clone());
        s = self.transform.forward(s);
        if let Some(pool) = self.downsample.0.as_ref() {
            s = pool.forward(s);
        }
        s = self.expand.forward(s);
        s = self.attend.forward(s);

        let residual = match &self.shortcut {
            Some(project) => {
                let pooled = match self.shortcut_pool.0.as_ref() {
                    Some(pool) => pool.forward(x),
                    None => x,
                };
                project.forward(pooled)
            }
            None => x,
        };

        let main_dims: [usize; 4] = s.shape().dims();
        let residual_dims: [usize; 4] = residual.shape().dims();
        if residual_dims != main_dims {
            panic!(
                "shape mismatch on residual add: identity branch {residual_dims:?} vs main branch {main_dims:?}"
            );
        }

        relu(residual + s)
    }
}
