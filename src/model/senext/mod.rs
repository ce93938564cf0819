pub mod layers;

use burn::prelude::*;
use tracing::debug;

use crate::error::ModelError;
use layers::{
    bottleneck::{SeNextBottleneck, SeNextBottleneckConfig},
    conv::{ConvNormAct, ConvNormActConfig},
};

/// Per-block channel transition in the generated stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWidths {
    pub in_channels: usize,
    pub out_channels: usize,
    pub groups: usize,
}

/// Configuration for [`SeResNeXt`].
#[derive(Config, Debug)]
pub struct SeResNeXtConfig {
    /// Channels of the raw input tensor.
    pub input_channels: usize,
    /// Channel width of the produced feature tensor.
    pub output_channels: usize,
    /// Number of bottleneck blocks.
    pub depth: usize,
    /// Channel width entering the first block.
    pub width: usize,
}

impl SeResNeXtConfig {
    /// Computes the per-block channel schedule.
    ///
    /// Widths are floor-interpolated between `width` and `output_channels`
    /// over `depth` blocks using integer arithmetic only, so consecutive
    /// blocks always agree on their boundary width and the final block lands
    /// on `output_channels` exactly whenever the configuration is valid.
    pub fn schedule(&self) -> Result<Vec<BlockWidths>, ModelError> {
        if self.depth == 0 {
            return Err(ModelError::InvalidConfiguration(
                "backbone depth must be at least 1".into(),
            ));
        }
        let groups = self.width / self.depth;
        if groups == 0 {
            return Err(ModelError::InvalidConfiguration(format!(
                "start width {} below depth {} leaves zero convolution groups",
                self.width, self.depth
            )));
        }

        let diff = self.output_channels.abs_diff(self.width);
        let schedule: Vec<BlockWidths> = (0..self.depth)
            .map(|i| BlockWidths {
                in_channels: self.width + diff * i / self.depth,
                out_channels: self.width + diff * (i + 1) / self.depth,
                groups,
            })
            .collect();

        // The interpolation only ever walks upward, so a target below the
        // start width can never be reached.
        let last = schedule.last().map(|widths| widths.out_channels);
        if last != Some(self.output_channels) {
            return Err(ModelError::InvalidConfiguration(format!(
                "schedule terminates at width {} instead of {}",
                last.unwrap_or(self.width),
                self.output_channels
            )));
        }

        Ok(schedule)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SeResNeXt<B>, ModelError> {
        let schedule = self.schedule()?;

        let in_conv = ConvNormActConfig::new([self.input_channels, self.width])
            .with_activation(false)
            .init(device)?;

        let blocks = schedule
            .iter()
            .map(|widths| {
                SeNextBottleneckConfig::new([widths.in_channels, widths.out_channels])
                    .with_groups(widths.groups)
                    .init(device)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SeResNeXt { in_conv, blocks })
    }
}

/// SE-ResNeXt backbone: an initial channel lift followed by a stack of
/// [`SeNextBottleneck`] blocks walking the channel schedule.
#[derive(Module, Debug)]
pub struct SeResNeXt<B: Backend> {
    in_conv: ConvNormAct<B>,
    blocks: Vec<SeNextBottleneck<B>>,
}

impl<B: Backend> SeResNeXt<B> {
    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        debug!(shape = ?x.shape().dims::<4>(), "backbone input");
        let mut x = self.in_conv.forward(x);
        for (index, block) in self.blocks.iter().enumerate() {
            x = block.forward(x);
            debug!(block = index, shape = ?x.shape().dims::<4>(), "block output");
        }
        x
    }
}
