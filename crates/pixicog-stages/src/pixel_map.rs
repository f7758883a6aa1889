use anyhow::anyhow;
use pixicog_core::{Rgba, Stage, StageDescriptor, WorkingSet};
use serde::Serialize;
use serde_json::json;

const KIND: &str = "pixel_map.v1";

/// Per-pixel color transform. Alpha is always preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PixelOp {
    Invert,
    /// BT.601 luma, integer weights.
    Grayscale,
    /// Blend toward `color`; `strength` 0 keeps the pixel, 255 replaces it.
    Tint { color: Rgba, strength: u8 },
}

impl PixelOp {
    pub fn apply(self, px: Rgba) -> Rgba {
        match self {
            PixelOp::Invert => Rgba::new(255 - px.r, 255 - px.g, 255 - px.b, px.a),
            PixelOp::Grayscale => {
                let luma = (299 * px.r as u32 + 587 * px.g as u32 + 114 * px.b as u32) / 1000;
                let luma = luma as u8;
                Rgba::new(luma, luma, luma, px.a)
            }
            PixelOp::Tint { color, strength } => {
                let s = strength as u32;
                let mix = |from: u8, to: u8| ((from as u32 * (255 - s) + to as u32 * s) / 255) as u8;
                Rgba::new(mix(px.r, color.r), mix(px.g, color.g), mix(px.b, color.b), px.a)
            }
        }
    }

    fn label(self) -> &'static str {
        match self {
            PixelOp::Invert => "invert",
            PixelOp::Grayscale => "grayscale",
            PixelOp::Tint { .. } => "tint",
        }
    }
}

/// Reads the `source` list, applies a [`PixelOp`] to every image and
/// stores the result under `target` (which may equal `source`).
#[derive(Debug, Clone)]
pub struct PixelMapStage {
    source: String,
    target: String,
    op: PixelOp,
    descriptor: StageDescriptor,
}

impl PixelMapStage {
    pub fn new(source: impl Into<String>, target: impl Into<String>, op: PixelOp) -> Self {
        let source = source.into();
        let target = target.into();
        let params = json!({ "source": source, "target": target, "op": op });
        let descriptor = StageDescriptor::from_content(
            format!("{}:{}", op.label(), target),
            &crate::content(KIND, &params),
        );
        Self {
            source,
            target,
            op,
            descriptor,
        }
    }

    pub fn invert(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, PixelOp::Invert)
    }

    pub fn grayscale(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, PixelOp::Grayscale)
    }
}

impl Stage for PixelMapStage {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, working_set: &mut WorkingSet) -> anyhow::Result<()> {
        let mut images = working_set
            .get(&self.source)
            .cloned()
            .ok_or_else(|| anyhow!("no image list named `{}`", self.source))?;
        for image in &mut images {
            image.map_pixels(|px| self.op.apply(px));
        }
        working_set.insert(self.target.clone(), images);
        Ok(())
    }
}
