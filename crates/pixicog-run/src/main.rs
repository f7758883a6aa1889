//! Binary entrypoint: runs the demo pipeline with the process arguments as
//! the invocation fingerprint.
use anyhow::Context;
use pixicog_core::RunnerConfig;
use pixicog_stages::demo_pipeline;
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = RunnerConfig::from_env();
    fs::create_dir_all(&config.cache_dir)
        .with_context(|| format!("creating cache dir {}", config.cache_dir.display()))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let runner = demo_pipeline().into_runner(config);
    tracing::info!(pipeline = %runner.pipeline_id(), args = ?args, "Starting run");

    let report = runner.run_with_args(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
