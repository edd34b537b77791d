//! Execution crate
//!
//! Bridges a push-driven task loop (one `write` per record, then `close`)
//! to a connector [`Loader`](ferry_connector::Loader) that pulls records on
//! its own thread.
//!
//! # Example
//! ```rust
//! use ferry_common::{BoxError, Context, JobType, Record};
//! use ferry_connector::{Loader, RecordSource};
//! use ferry_execution::{ExecutionBridge, TaskContext};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Discard;
//!
//! impl Loader for Discard {
//!     fn load(
//!         &mut self,
//!         _context: &Context,
//!         _connection: Option<&Context>,
//!         _job: &Context,
//!         source: &mut dyn RecordSource,
//!     ) -> Result<(), BoxError> {
//!         while source.next()?.is_some() {}
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = ferry_connector::LoaderRegistry::new();
//! registry.register_default::<Discard>("discard");
//! let task = TaskContext::new(JobType::Export, "discard", registry.get("discard").unwrap());
//! let mut bridge = ExecutionBridge::new(task).unwrap();
//! bridge.push(Record::Csv("1,2,3".to_string())).unwrap();
//! let summary = bridge.finish().unwrap();
//! assert_eq!(summary.records_loaded, 1);
//! ```

pub mod bridge;
pub mod channel;
pub mod context;
pub mod error;
pub mod runner;
pub mod settings;
pub mod source;

pub use bridge::{ExecutionBridge, LoadSummary, RecordWriter};
pub use channel::{RecordChannel, StreamSignal};
pub use context::{TaskContext, CONNECTOR_CONTEXT_PREFIX};
pub use error::ExecutionError;
pub use runner::{LoaderRunner, RunnerState};
pub use settings::TaskSettings;
pub use source::ChannelSource;
