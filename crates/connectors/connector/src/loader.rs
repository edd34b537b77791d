use ferry_common::{BoxError, Context, Record};
use thiserror::Error;

/// How a loader drains its [`RecordSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderMode {
    /// The loader reads at most one record and returns.
    SingleRecord,
    /// The loader reads until the source reports the end of the stream.
    #[default]
    Continuous,
}

/// Pull side of a running transfer, handed to [`Loader::load`].
pub trait RecordSource {
    /// Blocks until the next record is available. `Ok(None)` marks the end
    /// of the stream; calling again after that is a protocol error.
    fn next(&mut self) -> Result<Option<Record>, LoaderProtocolError>;
}

/// Connector-supplied consumer of records. Runs once per task on its own
/// thread.
pub trait Loader: Send {
    fn mode(&self) -> LoaderMode {
        LoaderMode::Continuous
    }

    /// Consume records from `source`. Any error returned here fails the
    /// task and is reported to the host with this error as its source.
    fn load(
        &mut self,
        context: &Context,
        connection: Option<&Context>,
        job: &Context,
        source: &mut dyn RecordSource,
    ) -> Result<(), BoxError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoaderProtocolError {
    #[error("record source read again after the end of the stream")]
    ReadAfterEnd,
    #[error("loader returned before the end of the stream; data have not been completely consumed")]
    ReturnedBeforeEnd,
    #[error("producer abandoned the transfer before the end of the stream")]
    Aborted,
}

/// A loader panicked instead of returning an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("loader panicked: {message}")]
pub struct LoaderPanic {
    pub message: String,
}

impl LoaderPanic {
    pub fn from_payload(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}
