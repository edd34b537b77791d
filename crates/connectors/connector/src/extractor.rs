use ferry_common::{BoxError, Record};

/// Lazily produced records; each item may fail independently.
pub type RecordIter = Box<dyn Iterator<Item = Result<Record, BoxError>> + Send>;

/// Connector-supplied producer of records for the push side of a task.
pub trait Extractor {
    fn extract(&self) -> Result<RecordIter, BoxError>;
}
