use pixicog_core::{Image, Rgba, Stage, StageDescriptor, WorkingSet};
use serde_json::json;

const KIND: &str = "flat_fill.v1";

/// Writes one solid-color image per entry of `colors` into `target`,
/// replacing whatever list was there.
#[derive(Debug, Clone)]
pub struct FlatFillStage {
    target: String,
    width: u32,
    height: u32,
    colors: Vec<Rgba>,
    descriptor: StageDescriptor,
}

impl FlatFillStage {
    pub fn new(target: impl Into<String>, width: u32, height: u32, colors: Vec<Rgba>) -> Self {
        let target = target.into();
        let params = json!({
            "target": target,
            "width": width,
            "height": height,
            "colors": colors,
        });
        let descriptor =
            StageDescriptor::from_content(format!("fill:{}", target), &crate::content(KIND, &params));
        Self {
            target,
            width,
            height,
            colors,
            descriptor,
        }
    }
}

impl Stage for FlatFillStage {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, working_set: &mut WorkingSet) -> anyhow::Result<()> {
        let images = self
            .colors
            .iter()
            .map(|color| Image::filled(self.width, self.height, *color))
            .collect();
        working_set.insert(self.target.clone(), images);
        Ok(())
    }
}
