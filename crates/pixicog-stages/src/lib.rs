//! pixicog Stages: reference image stages for the checkpointing runner.
//!
//! Each stage derives its content hash from a kind tag plus its serialized
//! parameters, so editing a parameter (or bumping the tag when the code
//! changes) invalidates that stage and everything after it, while untouched
//! prefixes stay cached.
//!
//! # Pipeline Flow
//!
//! ```text
//! fill:frames → invert:inverted → grayscale:gray → concat:contact
//!      ↓               ↓                 ↓               ↓
//!   3 flats        negatives          luma only     frames+inverted
//! ```

mod concat;
mod flat_fill;
mod pixel_map;

pub use concat::ConcatStage;
pub use flat_fill::FlatFillStage;
pub use pixel_map::{PixelMapStage, PixelOp};

use pixicog_core::{PipelineRunner, Rgba, RunnerConfig, Stage};
use serde_json::Value;
use tracing::debug;

pub(crate) fn content(kind: &str, params: &Value) -> Vec<u8> {
    format!("{}\n{}", kind, params).into_bytes()
}

/// Ordered stage list builder.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; order is the execution order.
    pub fn add_stage(mut self, stage: Box<dyn Stage>) -> Self {
        debug!(stage = %stage.name(), hash = %stage.descriptor().content_hash, "Adding stage");
        self.stages.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn into_stages(self) -> Vec<Box<dyn Stage>> {
        self.stages
    }

    /// Bind the stages to a checkpoint store.
    pub fn into_runner(self, config: RunnerConfig) -> PipelineRunner {
        PipelineRunner::new(config, self.stages)
    }
}

/// White, black and mid-gray 1×1 frames.
pub fn demo_palette() -> Vec<Rgba> {
    vec![Rgba::WHITE, Rgba::BLACK, Rgba::new(128, 128, 128, 255)]
}

/// The 4-stage demo pipeline: fill → invert → grayscale → concat.
pub fn demo_pipeline() -> Pipeline {
    Pipeline::new()
        .add_stage(Box::new(FlatFillStage::new("frames", 1, 1, demo_palette())))
        .add_stage(Box::new(PixelMapStage::invert("frames", "inverted")))
        .add_stage(Box::new(PixelMapStage::grayscale("inverted", "gray")))
        .add_stage(Box::new(ConcatStage::new(["frames", "inverted"], "contact")))
}
