//! Pipeline Runner: walks the stage list, skipping every stage whose
//! cumulative history already has a checkpoint and resuming from the last
//! one that does.
use chrono::Utc;
use pixicog_codec::WorkingSet;
use std::time::Instant;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::config::RunnerConfig;
use crate::data_model::{RunReport, StageAction, StageOutcome};
use crate::error::{PixicogError, Result};
use crate::hash_chain::{extend, fingerprint, Digest};
use crate::stage::Stage;
use crate::store::CheckpointStore;

/// State of one invocation: the working set, the chain value after the
/// stages processed so far, and whether state has been loaded yet.
#[derive(Debug)]
pub struct RunnerSession {
    working_set: WorkingSet,
    chain: Digest,
    hydrated: bool,
    announce: bool,
}

impl RunnerSession {
    pub fn new(fingerprint: Digest) -> Self {
        Self {
            working_set: WorkingSet::new(),
            chain: fingerprint,
            hydrated: false,
            announce: false,
        }
    }

    /// Echo checkpoint loads and saves on stdout.
    pub fn with_announce(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    pub fn chain(&self) -> &Digest {
        &self.chain
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn into_working_set(self) -> WorkingSet {
        self.working_set
    }

    /// Process stage `index` (1-based): skip it, or run it and checkpoint
    /// the result.
    ///
    /// Before the session has loaded any state, the stage is skipped if a
    /// checkpoint for its chain value exists. Otherwise the checkpoint of
    /// the previous chain value (if any) becomes the working set, and the
    /// session is marked hydrated.
    ///
    /// Once hydrated, every later stage runs without probing the store. Chain
    /// values past the first miss are assumed absent, which holds as long as
    /// checkpoints are only ever added front to back.
    pub fn advance(
        &mut self,
        store: &CheckpointStore,
        index: usize,
        stage: &dyn Stage,
    ) -> Result<StageOutcome> {
        let start = Instant::now();
        let descriptor = stage.descriptor();
        let next_chain = extend(&self.chain, &descriptor.content_hash);
        let next_key = store.key_of(&next_chain);

        let hydrated_from = if self.hydrated {
            None
        } else if store.exists(&next_key) {
            info!(index, stage = %descriptor.name, key = %next_key, "Skipping stage, checkpoint exists");
            self.chain = next_chain;
            return Ok(StageOutcome {
                index,
                name: descriptor.name.clone(),
                chain: next_chain,
                action: StageAction::Skipped,
                checkpoint: None,
                latency_ms: start.elapsed().as_millis() as u64,
            });
        } else {
            let prev_key = store.key_of(&self.chain);
            let loaded = store
                .read(&prev_key)
                .map_err(|e| at_stage(index, &descriptor.name, self.chain, e))?;
            self.hydrated = true;
            match loaded {
                Some(ws) => {
                    info!(index, stage = %descriptor.name, key = %prev_key, entries = ws.len(), "Resuming from checkpoint");
                    if self.announce {
                        println!("Loading state from file: {}", prev_key);
                    }
                    self.working_set = ws;
                    Some(prev_key.path().to_path_buf())
                }
                None => {
                    debug!(index, stage = %descriptor.name, "No prior checkpoint, keeping current working set");
                    None
                }
            }
        };

        info!(index, stage = %descriptor.name, "Executing stage");
        stage
            .run(&mut self.working_set)
            .map_err(|source| PixicogError::StageExecution {
                index,
                name: descriptor.name.clone(),
                chain: next_chain,
                source,
            })?;

        store
            .write(&next_key, &self.working_set)
            .map_err(|e| at_stage(index, &descriptor.name, next_chain, e))?;
        if self.announce {
            println!("Saving state: {}", next_key);
        }
        info!(index, stage = %descriptor.name, key = %next_key, "Saved state");

        self.chain = next_chain;
        Ok(StageOutcome {
            index,
            name: descriptor.name.clone(),
            chain: next_chain,
            action: StageAction::Executed { hydrated_from },
            checkpoint: Some(next_key.path().to_path_buf()),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Load the checkpoint of the current chain value into the working set.
    /// Returns false if there is none.
    pub fn materialize(&mut self, store: &CheckpointStore) -> Result<bool> {
        let key = store.key_of(&self.chain);
        match store.read(&key)? {
            Some(ws) => {
                info!(key = %key, entries = ws.len(), "Materialized cached result");
                if self.announce {
                    println!("Loading state from file: {}", key);
                }
                self.working_set = ws;
                self.hydrated = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn at_stage(index: usize, name: &str, chain: Digest, source: PixicogError) -> PixicogError {
    PixicogError::AtStage {
        index,
        name: name.to_string(),
        chain,
        source: Box::new(source),
    }
}

/// An ordered, linear list of stages bound to a checkpoint store.
pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
    store: CheckpointStore,
    config: RunnerConfig,
    pipeline_id: String,
}

impl PipelineRunner {
    pub fn new(config: RunnerConfig, stages: Vec<Box<dyn Stage>>) -> Self {
        let pipeline_id = stages
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join("→");
        let store = CheckpointStore::from_config(&config);

        Self {
            stages,
            store,
            config,
            pipeline_id,
        }
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run with the invocation fingerprint derived from `args`.
    pub fn run_with_args<S: AsRef<str>>(&self, args: &[S]) -> Result<RunReport> {
        self.run(fingerprint(args))
    }

    /// Run every stage in order, seeding the chain with `fingerprint`.
    ///
    /// The first error aborts the run. Checkpoints written before it stay
    /// on disk and remain valid for later runs.
    pub fn run(&self, fingerprint: Digest) -> Result<RunReport> {
        let session_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = info_span!("pipeline_run", session = %session_id, pipeline = %self.pipeline_id);
        let _enter = span.enter();

        let mut session = RunnerSession::new(fingerprint).with_announce(self.config.announce);
        let mut outcomes = Vec::with_capacity(self.stages.len());
        for (i, stage) in self.stages.iter().enumerate() {
            outcomes.push(session.advance(&self.store, i + 1, stage.as_ref())?);
        }

        let all_skipped = outcomes.iter().all(|o| !o.executed());
        let materialized = if self.config.materialize_cached && !outcomes.is_empty() && all_skipped {
            session.materialize(&self.store)?
        } else {
            false
        };

        let executed = outcomes.iter().filter(|o| o.executed()).count();
        info!(
            executed,
            skipped = outcomes.len() - executed,
            materialized,
            final_chain = %session.chain(),
            "Pipeline run complete"
        );

        Ok(RunReport {
            session_id,
            pipeline_id: self.pipeline_id.clone(),
            fingerprint,
            final_chain: *session.chain(),
            outcomes,
            started_at,
            finished_at: Utc::now(),
            materialized,
            working_set: session.into_working_set(),
        })
    }
}
