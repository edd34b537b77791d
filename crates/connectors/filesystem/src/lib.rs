//! CSV file connector: [`CsvTable`] extracts rows from a file and
//! [`CsvLoader`] writes loaded records to one.

use csv::ReaderBuilder;
use ferry_common::{BoxError, Record};
use ferry_connector::{Extractor, LoaderRegistry, RecordIter};
use std::fs::File;

pub mod loader;

pub use loader::CsvLoader;

/// Identifier [`register`] uses for [`CsvLoader`].
pub const LOADER_NAME: &str = "filesystem.csv";

/// Adds this connector's loader to `registry`.
pub fn register(registry: &mut LoaderRegistry) {
    registry.register_default::<CsvLoader>(LOADER_NAME);
}

/// Extracts the rows of a CSV file as [`Record::Fields`].
pub struct CsvTable {
    path: String,
    has_header: bool,
}

impl CsvTable {
    pub fn new(path: &str) -> Self {
        Self { path: path.to_string(), has_header: true }
    }

    pub fn new_with_header(path: &str, has_header: bool) -> Self {
        Self { path: path.to_string(), has_header }
    }
}

impl Extractor for CsvTable {
    fn extract(&self) -> Result<RecordIter, BoxError> {
        let file = File::open(&self.path)?;
        let rdr = ReaderBuilder::new().has_headers(self.has_header).from_reader(file);
        let records = rdr.into_records().map(|result| -> Result<Record, BoxError> {
            let record = result?;
            Ok(Record::Fields(record.iter().map(str::to_string).collect()))
        });
        Ok(Box::new(records))
    }
}
