use crate::settings::TaskSettings;
use crate::error::ExecutionError;
use ferry_common::{Context, JobType};
use ferry_connector::{LoaderFactory, LoaderRegistry};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Prefix of the task-context keys an export loader sees as its context.
pub const CONNECTOR_CONTEXT_PREFIX: &str = "connector.context.";

/// Everything needed to start one load task. The loader factory is
/// resolved when this value is built, not when the task runs.
#[derive(Clone)]
pub struct TaskContext {
    pub task_id: Uuid,
    pub job_type: JobType,
    pub loader: String,
    factory: Arc<dyn LoaderFactory>,
    pub context: Context,
    pub connector_connection: Context,
    pub connector_job: Context,
    pub framework_job: Context,
    pub thread_name_prefix: String,
}

/// The configuration a loader receives for its job type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoaderConfigs {
    pub context: Context,
    pub connection: Option<Context>,
    pub job: Context,
}

impl TaskContext {
    pub fn new(job_type: JobType, loader: impl Into<String>, factory: Arc<dyn LoaderFactory>) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            job_type,
            loader: loader.into(),
            factory,
            context: Context::new(),
            connector_connection: Context::new(),
            connector_job: Context::new(),
            framework_job: Context::new(),
            thread_name_prefix: "ferry-loader".to_string(),
        }
    }

    pub fn from_settings(
        settings: TaskSettings,
        registry: &LoaderRegistry,
    ) -> Result<Self, ExecutionError> {
        let factory = registry
            .get(&settings.loader)
            .ok_or_else(|| ExecutionError::LoaderNotFound(settings.loader.clone()))?;
        Ok(Self {
            context: settings.context,
            connector_connection: settings.connector_connection,
            connector_job: settings.connector_job,
            framework_job: settings.framework_job,
            thread_name_prefix: settings.thread_name_prefix,
            ..Self::new(settings.job_type, settings.loader, factory)
        })
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_connector_connection(mut self, connection: Context) -> Self {
        self.connector_connection = connection;
        self
    }

    pub fn with_connector_job(mut self, job: Context) -> Self {
        self.connector_job = job;
        self
    }

    pub fn with_framework_job(mut self, job: Context) -> Self {
        self.framework_job = job;
        self
    }

    pub fn factory(&self) -> &Arc<dyn LoaderFactory> {
        &self.factory
    }

    pub(crate) fn thread_name(&self) -> String {
        format!("{}-{}", self.thread_name_prefix, self.task_id)
    }

    /// Export loaders see the connector side of the configuration; import
    /// loaders write into the framework side and get no connection.
    pub(crate) fn loader_configs(&self) -> LoaderConfigs {
        match self.job_type {
            JobType::Export => LoaderConfigs {
                context: self.context.with_prefix(CONNECTOR_CONTEXT_PREFIX),
                connection: Some(self.connector_connection.clone()),
                job: self.connector_job.clone(),
            },
            JobType::Import => LoaderConfigs {
                context: self.context.clone(),
                connection: None,
                job: self.framework_job.clone(),
            },
        }
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("task_id", &self.task_id)
            .field("job_type", &self.job_type)
            .field("loader", &self.loader)
            .field("context", &self.context)
            .field("connector_connection", &self.connector_connection)
            .field("connector_job", &self.connector_job)
            .field("framework_job", &self.framework_job)
            .field("thread_name_prefix", &self.thread_name_prefix)
            .finish_non_exhaustive()
    }
}
