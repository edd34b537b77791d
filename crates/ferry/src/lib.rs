//! Runs one transfer task: records extracted from a CSV file are pushed
//! through an [`ExecutionBridge`] into the configured loader.

use anyhow::{Context as _, Result};
use ferry_connector::{Extractor, LoaderRegistry};
use ferry_connector_filesystem::CsvTable;
use ferry_execution::{ExecutionBridge, LoadSummary, RecordWriter, TaskContext, TaskSettings};
use std::path::PathBuf;
use tracing::info;

pub mod logging;

/// Loaders available to tasks started from this binary.
pub fn default_registry() -> LoaderRegistry {
    let mut registry = LoaderRegistry::new();
    ferry_connector_filesystem::register(&mut registry);
    registry
}

/// Where the records of a task come from.
#[derive(Debug, Clone)]
pub struct CsvInput {
    pub path: PathBuf,
    pub has_header: bool,
}

/// Drives the host side of the task on the current thread.
pub fn run_transfer(
    settings: TaskSettings,
    registry: &LoaderRegistry,
    input: &CsvInput,
) -> Result<LoadSummary> {
    let task = TaskContext::from_settings(settings, registry)?;
    let path = input.path.to_str().context("input path is not valid UTF-8")?;
    let records = CsvTable::new_with_header(path, input.has_header)
        .extract()
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("failed to open {}", input.path.display()))?;

    let mut writer = ExecutionBridge::new(task)?;
    info!(task_id = %writer.task_id(), input = %input.path.display(), "Starting transfer");
    for record in records {
        let record = record.map_err(|e| anyhow::anyhow!(e)).context("failed to read input row")?;
        writer.write(record)?;
    }
    Ok(writer.close()?)
}

/// Runs [`run_transfer`] on the blocking pool; the bridge parks threads.
pub async fn run_task(settings: TaskSettings, input: CsvInput) -> Result<LoadSummary> {
    tokio::task::spawn_blocking(move || run_transfer(settings, &default_registry(), &input))
        .await
        .context("transfer task panicked")?
}
