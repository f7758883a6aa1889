use anyhow::anyhow;
use pixicog_core::{ImageList, Stage, StageDescriptor, WorkingSet};
use serde_json::json;

const KIND: &str = "concat.v1";

/// Joins the `sources` lists, in order, into `target`.
#[derive(Debug, Clone)]
pub struct ConcatStage {
    sources: Vec<String>,
    target: String,
    descriptor: StageDescriptor,
}

impl ConcatStage {
    pub fn new<S: Into<String>>(sources: impl IntoIterator<Item = S>, target: impl Into<String>) -> Self {
        let sources: Vec<String> = sources.into_iter().map(Into::into).collect();
        let target = target.into();
        let params = json!({ "sources": sources, "target": target });
        let descriptor =
            StageDescriptor::from_content(format!("concat:{}", target), &crate::content(KIND, &params));
        Self {
            sources,
            target,
            descriptor,
        }
    }
}

impl Stage for ConcatStage {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, working_set: &mut WorkingSet) -> anyhow::Result<()> {
        let mut joined = ImageList::new();
        for source in &self.sources {
            let list = working_set
                .get(source)
                .ok_or_else(|| anyhow!("no image list named `{}`", source))?;
            joined.extend(list.iter().cloned());
        }
        working_set.insert(self.target.clone(), joined);
        Ok(())
    }
}
