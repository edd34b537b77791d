use std::borrow::Cow;

/// One unit of data moving from an extractor to a loader.
///
/// The bridge never looks inside a record; connectors agree on the
/// variant they produce and consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A single comma-delimited text row.
    Csv(String),
    /// A row already split into fields.
    Fields(Vec<String>),
}

impl Record {
    /// Renders the record as one comma-delimited row.
    pub fn to_csv(&self) -> Cow<'_, str> {
        match self {
            Record::Csv(row) => Cow::Borrowed(row),
            Record::Fields(fields) => Cow::Owned(fields.join(",")),
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        match self {
            Record::Csv(row) => row.split(',').collect(),
            Record::Fields(fields) => fields.iter().map(String::as_str).collect(),
        }
    }
}

impl From<String> for Record {
    fn from(row: String) -> Self {
        Record::Csv(row)
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        Record::Fields(fields)
    }
}
