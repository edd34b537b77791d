//! Contracts between the execution engine and connectors.
//!
//! A connector supplies an [`Extractor`] for the push side of a task and a
//! [`Loader`] through a [`LoaderFactory`] for the pull side; the
//! embedding program collects factories in a [`LoaderRegistry`] and hands
//! the registry to the engine explicitly.

pub mod extractor;
pub mod loader;
pub mod registry;

pub use extractor::{Extractor, RecordIter};
pub use loader::{Loader, LoaderMode, LoaderPanic, LoaderProtocolError, RecordSource};
pub use registry::{FnLoaderFactory, LoaderFactory, LoaderRegistry};

pub use ferry_common::{BoxError, Context, Record};
