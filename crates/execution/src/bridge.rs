//! Push-side entry point used by the host task loop.

use crate::channel::{Delivery, PutError, RecordChannel, StreamSignal};
use crate::context::TaskContext;
use crate::error::ExecutionError;
use crate::runner::{LoaderRunner, RunnerState};
use ferry_common::{BoxError, Record};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Record-writer handle the host task loop drives: any number of
/// `write` calls followed by exactly one `close`.
pub trait RecordWriter {
    fn write(&mut self, record: Record) -> Result<(), ExecutionError>;
    fn close(&mut self) -> Result<LoadSummary, ExecutionError>;
}

/// Counts reported by a successful [`ExecutionBridge::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub records_pushed: u64,
    pub records_loaded: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BridgeState {
    Open,
    Closed,
    Aborted,
}

/// Hands pushed records one at a time to a loader running on its own
/// thread.
///
/// `push` blocks while the previous record is still waiting for the
/// loader, and fails instead of blocking once the loader has failed.
/// `finish` sends the end of the stream, joins the loader thread and
/// surfaces the loader's error, if any.
#[derive(Debug)]
pub struct ExecutionBridge {
    task_id: Uuid,
    loader: String,
    channel: Arc<RecordChannel>,
    runner: LoaderRunner,
    state: BridgeState,
    pushed: u64,
}

impl ExecutionBridge {
    pub fn new(task: TaskContext) -> Result<Self, ExecutionError> {
        let channel = Arc::new(RecordChannel::new());
        let runner = LoaderRunner::spawn(&task, Arc::clone(&channel))?;
        info!(task_id = %task.task_id, loader = %task.loader, job_type = %task.job_type, "Opened execution bridge");
        Ok(Self {
            task_id: task.task_id,
            loader: task.loader,
            channel,
            runner,
            state: BridgeState::Open,
            pushed: 0,
        })
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn push(&mut self, record: Record) -> Result<(), ExecutionError> {
        self.ensure_open("push")?;

        // A dead consumer would never drain the slot.
        if self.runner.state() == RunnerState::Failed {
            return Err(self.abort(ExecutionError::ConsumerFailed));
        }

        match self.channel.put(StreamSignal::Data(record)) {
            Ok(Delivery::Stored) => {}
            Ok(Delivery::Discarded) => {
                warn!(task_id = %self.task_id, loader = %self.loader, "Loader already returned; record discarded");
            }
            Err(PutError::ConsumerFailed) => return Err(self.abort(ExecutionError::ConsumerFailed)),
            Err(PutError::StreamEnded) => {
                return Err(ExecutionError::InvalidState("push after end of stream".to_string()))
            }
        }
        self.pushed += 1;

        if self.runner.state() == RunnerState::Failed {
            return Err(self.abort(ExecutionError::LoaderFailure));
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<LoadSummary, ExecutionError> {
        self.ensure_open("finish")?;
        self.state = BridgeState::Closed;

        if self.runner.state() == RunnerState::Running {
            // A failure racing with this put is picked up by the join below.
            let _ = self.channel.put(StreamSignal::End);
        }

        if let Err(e) = self.runner.join() {
            self.state = BridgeState::Aborted;
            error!(task_id = %self.task_id, loader = %self.loader, records = self.pushed, "Load task failed");
            return Err(ExecutionError::LoaderFailure(e));
        }

        let summary = LoadSummary {
            records_pushed: self.pushed,
            records_loaded: self.channel.delivered(),
        };
        info!(
            task_id = %self.task_id,
            loader = %self.loader,
            records_pushed = summary.records_pushed,
            records_loaded = summary.records_loaded,
            "Load task finished"
        );
        Ok(summary)
    }

    fn ensure_open(&self, op: &str) -> Result<(), ExecutionError> {
        match self.state {
            BridgeState::Open => Ok(()),
            BridgeState::Closed => Err(ExecutionError::InvalidState(format!("{op} after finish"))),
            BridgeState::Aborted => {
                Err(ExecutionError::InvalidState(format!("{op} after the load task failed")))
            }
        }
    }

    /// Moves to the terminal failed state and wraps the loader's fault.
    fn abort(&mut self, wrap: fn(BoxError) -> ExecutionError) -> ExecutionError {
        self.state = BridgeState::Aborted;
        let fault = match self.runner.join() {
            Err(e) => e,
            Ok(()) => "loader stopped without reporting an error".into(),
        };
        error!(task_id = %self.task_id, loader = %self.loader, records = self.pushed, error = %fault, "Loader failure surfaced on push");
        wrap(fault)
    }
}

impl RecordWriter for ExecutionBridge {
    fn write(&mut self, record: Record) -> Result<(), ExecutionError> {
        self.push(record)
    }

    fn close(&mut self) -> Result<LoadSummary, ExecutionError> {
        self.finish()
    }
}

impl Drop for ExecutionBridge {
    fn drop(&mut self) {
        if self.runner.is_joined() {
            return;
        }
        if self.state == BridgeState::Open {
            warn!(task_id = %self.task_id, loader = %self.loader, "Execution bridge dropped without finish");
            self.channel.abandon();
        }
        if let Err(e) = self.runner.join() {
            warn!(task_id = %self.task_id, loader = %self.loader, error = %e, "Loader failure dropped with the bridge");
        }
    }
}
