pub mod senext;

pub use senext::layers::{
    attention::{
        ChannelAttention, ChannelAttentionConfig, CombinedAttention, CombinedAttentionConfig,
        SpatialAttention, SpatialAttentionConfig,
    },
    bottleneck::{PoolKind, SeNextBottleneck, SeNextBottleneckConfig},
    conv::{ConvNormAct, ConvNormActConfig},
};
pub use senext::{BlockWidths, SeResNeXt, SeResNeXtConfig};
