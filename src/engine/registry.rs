use crate::reflect::{Instance, TypeCatalog, TypeKey};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static INITIALISED: RefCell<HashMap<TypeKey, Instance>> = RefCell::new(HashMap::new());
}

/// Instances created or observed by the listener, keyed by exact type.
///
/// The registry lives for the whole thread and is only emptied by [`reset`](Self::reset),
/// which a runner calls before preparing each test. Every test thread has its own
/// registry, so tests running on parallel threads do not see each other's instances.
pub struct InstanceRegistry;

impl InstanceRegistry {
    /// The instance registered under exactly `key`.
    pub fn get(key: &TypeKey) -> Option<Instance> {
        INITIALISED.with(|registry| registry.borrow().get(key).cloned())
    }

    pub(crate) fn insert(key: TypeKey, instance: Instance) {
        INITIALISED.with(|registry| {
            registry.borrow_mut().insert(key, instance);
        });
    }

    /// A registered type that is `key` or one of its subtypes.
    ///
    /// Assignability is judged by each registered instance's own catalog, so every
    /// instance in the registry is expected to come from the same catalog. Use
    /// [`find_subtype_in`](Self::find_subtype_in) to judge against a given catalog.
    ///
    /// When several registered types qualify, which one is returned is unspecified.
    /// Look up the most specific type to get a stable answer.
    pub fn contains_subtype_of(key: &TypeKey) -> Option<TypeKey> {
        INITIALISED.with(|registry| {
            registry
                .borrow()
                .iter()
                .find(|(registered, instance)| {
                    instance.catalog().is_assignable_from(key, registered)
                })
                .map(|(registered, _)| registered.clone())
        })
    }

    /// Like [`contains_subtype_of`](Self::contains_subtype_of), with the hierarchy
    /// taken from `catalog` instead of from the registered instances.
    pub fn find_subtype_in(catalog: &TypeCatalog, key: &TypeKey) -> Option<TypeKey> {
        INITIALISED.with(|registry| {
            registry
                .borrow()
                .keys()
                .find(|registered| catalog.is_assignable_from(key, registered))
                .cloned()
        })
    }

    pub fn reset() {
        INITIALISED.with(|registry| registry.borrow_mut().clear());
    }

    pub fn len() -> usize {
        INITIALISED.with(|registry| registry.borrow().len())
    }

    pub fn is_empty() -> bool {
        Self::len() == 0
    }

    /// Registered types, sorted by name.
    pub fn registered_types() -> Vec<TypeKey> {
        INITIALISED.with(|registry| {
            let mut keys: Vec<TypeKey> = registry.borrow().keys().cloned().collect();
            keys.sort();
            keys
        })
    }
}
