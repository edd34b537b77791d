//! Common crate
//!
//! Records, configuration contexts, and error types shared by the
//! Ferry execution engine and its connectors.
//!
//! # Example
//! ```rust
//! use ferry_common::{Context, Record};
//!
//! let context = Context::from_iter([("connector.context.table", "orders")]);
//! assert_eq!(context.with_prefix("connector.context.").get("table"), Some("orders"));
//!
//! let record = Record::Csv("1,foo".to_string());
//! assert_eq!(record.fields(), vec!["1", "foo"]);
//! ```

pub mod context;
pub mod error;
pub mod record;

pub use context::{Context, JobType};
pub use error::{BoxError, Error, Result};
pub use record::Record;
