//! Stage Trait: one named unit of pipeline logic with a content identity.
use pixicog_codec::WorkingSet;
use serde::{Deserialize, Serialize};

use crate::hash_chain::Digest;

/// Name and content hash of a stage.
///
/// The hash must change exactly when the stage's behavior changes; it is
/// what the runner chains into checkpoint keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub name: String,
    pub content_hash: Digest,
}

impl StageDescriptor {
    pub fn new(name: impl Into<String>, content_hash: Digest) -> Self {
        Self {
            name: name.into(),
            content_hash,
        }
    }

    /// Descriptor whose hash covers the name and `content` (source text,
    /// serialized parameters, a version tag).
    pub fn from_content(name: impl Into<String>, content: &[u8]) -> Self {
        let name = name.into();
        let mut material = Vec::with_capacity(name.len() + 1 + content.len());
        material.extend_from_slice(name.as_bytes());
        material.push(0);
        material.extend_from_slice(content);
        Self {
            content_hash: Digest::of(&material),
            name,
        }
    }
}

/// A pipeline stage.
///
/// `run` gets exclusive access to the session's working set and may add or
/// overwrite entries. Stages can be re-run after an interrupted session, so
/// they must not have side effects outside the working set.
pub trait Stage: Send + Sync {
    fn descriptor(&self) -> &StageDescriptor;

    fn run(&self, working_set: &mut WorkingSet) -> anyhow::Result<()>;

    fn name(&self) -> &str {
        &self.descriptor().name
    }
}

/// Closure-backed stage.
pub struct FnStage<F> {
    descriptor: StageDescriptor,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&mut WorkingSet) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(descriptor: StageDescriptor, func: F) -> Self {
        Self { descriptor, func }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&mut WorkingSet) -> anyhow::Result<()> + Send + Sync,
{
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, working_set: &mut WorkingSet) -> anyhow::Result<()> {
        (self.func)(working_set)
    }
}

/// Box a closure as a stage.
pub fn stage_fn<F>(name: impl Into<String>, content_hash: Digest, func: F) -> Box<dyn Stage>
where
    F: Fn(&mut WorkingSet) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Box::new(FnStage::new(StageDescriptor::new(name, content_hash), func))
}
