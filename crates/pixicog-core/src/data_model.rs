//! Data Model: per-stage outcomes and the run report
use chrono::{DateTime, Utc};
use pixicog_codec::WorkingSet;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::hash_chain::Digest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StageAction {
    /// A checkpoint for this prefix already existed; the stage was not run.
    Skipped,
    /// The stage ran. `hydrated_from` is set on the one stage per session
    /// that loaded its input from a checkpoint.
    Executed { hydrated_from: Option<PathBuf> },
}

#[derive(Debug, Clone, Serialize)]
pub struct StageOutcome {
    /// 1-based position in the pipeline.
    pub index: usize,
    pub name: String,
    /// Chain value after this stage.
    pub chain: Digest,
    pub action: StageAction,
    /// Checkpoint written for this stage (executed stages only).
    pub checkpoint: Option<PathBuf>,
    pub latency_ms: u64,
}

impl StageOutcome {
    pub fn executed(&self) -> bool {
        matches!(self.action, StageAction::Executed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub session_id: Uuid,
    pub pipeline_id: String,
    pub fingerprint: Digest,
    pub final_chain: Digest,
    pub outcomes: Vec<StageOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// True when the result was loaded from the final checkpoint because
    /// every stage was skipped.
    pub materialized: bool,
    #[serde(skip)]
    pub working_set: WorkingSet,
}

impl RunReport {
    pub fn executed(&self) -> impl Iterator<Item = &StageOutcome> {
        self.outcomes.iter().filter(|o| o.executed())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &StageOutcome> {
        self.outcomes.iter().filter(|o| !o.executed())
    }

    pub fn executed_names(&self) -> Vec<&str> {
        self.executed().map(|o| o.name.as_str()).collect()
    }

    pub fn skipped_names(&self) -> Vec<&str> {
        self.skipped().map(|o| o.name.as_str()).collect()
    }

    pub fn checkpoints_written(&self) -> Vec<&PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.checkpoint.as_ref())
            .collect()
    }
}
