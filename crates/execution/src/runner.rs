//! Runs a connector loader on its own thread.

use crate::channel::{ConsumerStatus, RecordChannel};
use crate::context::{LoaderConfigs, TaskContext};
use crate::error::ExecutionError;
use crate::source::ChannelSource;
use ferry_common::BoxError;
use ferry_connector::{Loader, LoaderMode, LoaderPanic, LoaderProtocolError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Lifecycle of the loader thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Running,
    Completed,
    Failed,
}

impl From<ConsumerStatus> for RunnerState {
    fn from(status: ConsumerStatus) -> Self {
        match status {
            ConsumerStatus::Running => RunnerState::Running,
            ConsumerStatus::Completed => RunnerState::Completed,
            ConsumerStatus::Failed => RunnerState::Failed,
        }
    }
}

/// Owns the thread that calls [`Loader::load`] exactly once.
///
/// The thread never unwinds past the runner: an error or panic from the
/// loader is deposited into the channel's fault slot and the thread exits.
#[derive(Debug)]
pub struct LoaderRunner {
    channel: Arc<RecordChannel>,
    handle: Option<JoinHandle<()>>,
}

impl LoaderRunner {
    /// Creates the loader and starts its thread right away, so the first
    /// push finds a consumer already waiting.
    pub fn spawn(task: &TaskContext, channel: Arc<RecordChannel>) -> Result<Self, ExecutionError> {
        let loader = task.factory().create().map_err(|source| ExecutionError::LoaderCreation {
            name: task.loader.clone(),
            source,
        })?;
        let configs = task.loader_configs();
        let task_id = task.task_id;
        let name = task.loader.clone();
        let thread_channel = Arc::clone(&channel);

        let handle = thread::Builder::new()
            .name(task.thread_name())
            .spawn(move || run_loader(task_id, &name, loader, configs, thread_channel))?;

        debug!(task_id = %task.task_id, loader = %task.loader, "Loader thread started");
        Ok(Self { channel, handle: Some(handle) })
    }

    pub fn state(&self) -> RunnerState {
        self.channel.consumer_status().into()
    }

    /// Waits for the loader thread to exit. Returns the loader's error if
    /// it failed and the error has not been taken yet. Joining twice is a
    /// no-op.
    pub fn join(&mut self) -> Result<(), BoxError> {
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                // run_loader catches loader panics; this only fires if the
                // runner itself panicked.
                self.channel.fail(Box::new(LoaderPanic::from_payload(payload.as_ref())));
            }
        }
        match self.state() {
            RunnerState::Failed => Err(self
                .channel
                .take_fault()
                .unwrap_or_else(|| "loader failure was already reported".into())),
            RunnerState::Completed | RunnerState::Running => Ok(()),
        }
    }

    pub fn is_joined(&self) -> bool {
        self.handle.is_none()
    }
}

fn run_loader(
    task_id: Uuid,
    name: &str,
    mut loader: Box<dyn Loader>,
    configs: LoaderConfigs,
    channel: Arc<RecordChannel>,
) {
    let mode = loader.mode();
    let mut source = ChannelSource::new(Arc::clone(&channel));
    info!(task_id = %task_id, loader = name, mode = ?mode, "Running loader");

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        loader.load(&configs.context, configs.connection.as_ref(), &configs.job, &mut source)
    }));

    let result: Result<(), BoxError> = match outcome {
        Ok(Ok(())) if mode == LoaderMode::Continuous && !source.is_exhausted() => {
            Err(Box::new(LoaderProtocolError::ReturnedBeforeEnd))
        }
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(payload) => Err(Box::new(LoaderPanic::from_payload(payload.as_ref()))),
    };

    match result {
        Ok(()) => {
            info!(task_id = %task_id, loader = name, records = channel.delivered(), "Loader completed");
            channel.complete();
        }
        Err(e) => {
            error!(task_id = %task_id, loader = name, records = channel.delivered(), error = %e, "Loader failed");
            channel.fail(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::StreamSignal;
    use ferry_common::{Context, JobType, Record};
    use ferry_connector::{FnLoaderFactory, RecordSource};

    struct FirstOnly;

    impl Loader for FirstOnly {
        fn mode(&self) -> LoaderMode {
            LoaderMode::SingleRecord
        }

        fn load(
            &mut self,
            _context: &Context,
            _connection: Option<&Context>,
            _job: &Context,
            source: &mut dyn RecordSource,
        ) -> Result<(), BoxError> {
            source.next()?;
            Ok(())
        }
    }

    struct StopsEarly;

    impl Loader for StopsEarly {
        fn load(
            &mut self,
            _context: &Context,
            _connection: Option<&Context>,
            _job: &Context,
            source: &mut dyn RecordSource,
        ) -> Result<(), BoxError> {
            source.next()?;
            Ok(())
        }
    }

    struct Panics;

    impl Loader for Panics {
        fn load(
            &mut self,
            _context: &Context,
            _connection: Option<&Context>,
            _job: &Context,
            _source: &mut dyn RecordSource,
        ) -> Result<(), BoxError> {
            panic!("loader exploded");
        }
    }

    fn task_for<L, F>(make: F) -> TaskContext
    where
        L: Loader + 'static,
        F: Fn() -> L + Send + Sync + 'static,
    {
        let factory = FnLoaderFactory(move || -> Result<Box<dyn Loader>, BoxError> { Ok(Box::new(make())) });
        TaskContext::new(JobType::Export, "test", Arc::new(factory))
    }

    #[test]
    fn test_single_record_loader_completes() {
        let channel = Arc::new(RecordChannel::new());
        let mut runner = LoaderRunner::spawn(&task_for(|| FirstOnly), Arc::clone(&channel)).unwrap();
        channel.put(StreamSignal::Data(Record::Csv("x".into()))).unwrap();
        runner.join().unwrap();
        assert_eq!(runner.state(), RunnerState::Completed);
        assert!(runner.is_joined());
        assert_eq!(channel.delivered(), 1);
    }

    #[test]
    fn test_continuous_loader_returning_early_fails() {
        let channel = Arc::new(RecordChannel::new());
        let mut runner = LoaderRunner::spawn(&task_for(|| StopsEarly), Arc::clone(&channel)).unwrap();
        channel.put(StreamSignal::Data(Record::Csv("x".into()))).unwrap();
        let err = runner.join().unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoaderProtocolError>(),
            Some(&LoaderProtocolError::ReturnedBeforeEnd)
        );
        assert_eq!(runner.state(), RunnerState::Failed);
    }

    #[test]
    fn test_panic_becomes_failure() {
        let channel = Arc::new(RecordChannel::new());
        let mut runner = LoaderRunner::spawn(&task_for(|| Panics), Arc::clone(&channel)).unwrap();
        let err = runner.join().unwrap_err();
        let panic = err.downcast_ref::<LoaderPanic>().unwrap();
        assert_eq!(panic.message, "loader exploded");
    }

    #[test]
    fn test_factory_error_is_creation_error() {
        let factory = FnLoaderFactory(|| -> Result<Box<dyn Loader>, BoxError> { Err("no driver".into()) });
        let task = TaskContext::new(JobType::Import, "broken", Arc::new(factory));
        let err = LoaderRunner::spawn(&task, Arc::new(RecordChannel::new())).unwrap_err();
        assert!(matches!(err, ExecutionError::LoaderCreation { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_join_twice_is_noop() {
        let channel = Arc::new(RecordChannel::new());
        let mut runner = LoaderRunner::spawn(&task_for(|| FirstOnly), Arc::clone(&channel)).unwrap();
        channel.put(StreamSignal::End).unwrap();
        runner.join().unwrap();
        runner.join().unwrap();
    }
}
