//! pixicog core: incremental pipeline runner with a content-addressed
//! checkpoint cache.
//!
//! Each stage's identity is chained onto the invocation fingerprint:
//!
//! ```text
//! fingerprint(args) ─extend(h1)→ c1 ─extend(h2)→ c2 ─extend(h3)→ c3
//!                                 ↓               ↓               ↓
//!                          cache/<c1>.pgs  cache/<c2>.pgs  cache/<c3>.pgs
//! ```
//!
//! A run skips stages while their chain value already has a checkpoint,
//! loads the last hit, and executes (and checkpoints) everything after it.
//!
//! # Example
//!
//! ```no_run
//! use pixicog_core::{stage_fn, Digest, Image, PipelineRunner, Rgba, RunnerConfig};
//!
//! let stages = vec![stage_fn("load", Digest::of(b"load.v1"), |ws| {
//!     ws.insert("frames", vec![Image::filled(4, 4, Rgba::WHITE)]);
//!     Ok(())
//! })];
//!
//! let runner = PipelineRunner::new(RunnerConfig::new("cache"), stages);
//! let report = runner.run_with_args(&["input.png"])?;
//! println!("executed: {:?}", report.executed_names());
//! # Ok::<(), pixicog_core::PixicogError>(())
//! ```

pub mod config;
pub mod data_model;
pub mod error;
pub mod hash_chain;
pub mod runner;
pub mod stage;
pub mod store;

pub use config::RunnerConfig;
pub use data_model::{RunReport, StageAction, StageOutcome};
pub use error::{PixicogError, Result};
pub use hash_chain::{extend, fingerprint, Digest};
pub use runner::{PipelineRunner, RunnerSession};
pub use stage::{stage_fn, FnStage, Stage, StageDescriptor};
pub use store::{CheckpointStore, StoreKey};

pub use pixicog_codec::{Image, ImageList, Rgba, WorkingSet};
