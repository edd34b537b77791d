use crate::loader::Loader;
use ferry_common::BoxError;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh [`Loader`] for each task.
pub trait LoaderFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Loader>, BoxError>;
}

/// Adapts a closure into a [`LoaderFactory`].
pub struct FnLoaderFactory<F>(pub F);

impl<F> LoaderFactory for FnLoaderFactory<F>
where
    F: Fn() -> Result<Box<dyn Loader>, BoxError> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn Loader>, BoxError> {
        (self.0)()
    }
}

/// Loader factories keyed by the identifier used in task configuration.
#[derive(Default, Clone)]
pub struct LoaderRegistry {
    factories: HashMap<String, Arc<dyn LoaderFactory>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn LoaderFactory>) {
        self.factories.insert(name.into(), factory);
    }

    /// Registers a loader type constructible with `Default`.
    pub fn register_default<L>(&mut self, name: impl Into<String>)
    where
        L: Loader + Default + 'static,
    {
        self.register(
            name,
            Arc::new(FnLoaderFactory(|| -> Result<Box<dyn Loader>, BoxError> {
                Ok(Box::new(L::default()))
            })),
        );
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn LoaderFactory>> {
        self.factories.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
