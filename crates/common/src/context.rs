use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Immutable key/value configuration handed to connectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Returns `Ok(None)` for a missing key and an error for a value that
    /// is present but not an integer.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.parse(key)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.parse(key)?.unwrap_or(default))
    }

    /// Sub-context holding every key that starts with `prefix`, with the
    /// prefix removed.
    pub fn with_prefix(&self, prefix: &str) -> Context {
        self.values
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(prefix).map(|rest| (rest.to_string(), v.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| Error::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Direction of a transfer job, which decides what configuration a
/// loader sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum JobType {
    Import,
    Export,
}

impl FromStr for JobType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "IMPORT" => Ok(JobType::Import),
            "EXPORT" => Ok(JobType::Export),
            _ => Err(Error::InvalidValue { key: "job_type".to_string(), value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for JobType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobType::Import => f.write_str("IMPORT"),
            JobType::Export => f.write_str("EXPORT"),
        }
    }
}
