use ferry_common::{Context, JobType};
use serde::Deserialize;

/// Per-task configuration, read from a TOML file layered with
/// `FERRY_TASK__*` environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSettings {
    pub job_type: JobType,
    /// Identifier of the loader in the [`LoaderRegistry`](ferry_connector::LoaderRegistry).
    pub loader: String,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub connector_connection: Context,
    #[serde(default)]
    pub connector_job: Context,
    #[serde(default)]
    pub framework_job: Context,
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

fn default_thread_name_prefix() -> String {
    "ferry-loader".to_string()
}

impl TaskSettings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let config_file_path = std::env::var("FERRY_TASK_CONFIG")
            .unwrap_or_else(|_| "crates/ferry/config/task.toml".to_string());
        Self::from_file(&config_file_path)
    }

    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let s = config::Config::builder()
            .add_source(config::File::with_name(path).required(true))
            .add_source(config::Environment::with_prefix("FERRY_TASK").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}
