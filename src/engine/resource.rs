/*!
Resource registry: shared singletons injected into command constructors.

Each resource type maps to one `Arc` instance. Commands that declare the type
in their constructor receive a clone of the `Arc`; the engine never mutates or
copies the resource itself.
*/

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use super::types::TypeKey;

pub type SharedResource = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ResourceRegistry {
    entries: HashMap<TypeId, (TypeKey, SharedResource)>,
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.values().map(|(k, _)| k))
            .finish()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resource` as the singleton for `R` and return the shared handle.
    pub fn register<R: Any + Send + Sync>(&mut self, resource: R) -> Arc<R> {
        let shared = Arc::new(resource);
        self.register_shared(Arc::clone(&shared));
        shared
    }

    /// Register an already shared instance (last write wins).
    pub fn register_shared<R: Any + Send + Sync>(&mut self, resource: Arc<R>) {
        let key = TypeKey::of::<R>();
        let erased: SharedResource = resource;
        if self.entries.insert(key.id(), (key, erased)).is_some() {
            tracing::debug!(resource = %key, "replaced resource");
        }
    }

    pub fn get<R: Any + Send + Sync>(&self) -> Option<Arc<R>> {
        self.entries
            .get(&TypeId::of::<R>())
            .and_then(|(_, r)| Arc::clone(r).downcast::<R>().ok())
    }

    pub(crate) fn get_raw(&self, key: &TypeKey) -> Option<SharedResource> {
        self.entries.get(&key.id()).map(|(_, r)| Arc::clone(r))
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(&key.id())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
