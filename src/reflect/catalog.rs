use super::{ClassDescriptor, MethodDescriptor, TypeKey};
use crate::error::{MockAllError, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Immutable set of class descriptions shared by every instance created from it.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    classes: HashMap<TypeKey, Arc<ClassDescriptor>>,
}

impl TypeCatalog {
    pub fn builder() -> TypeCatalogBuilder {
        TypeCatalogBuilder::new()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.classes.contains_key(key)
    }

    pub fn get(&self, key: &TypeKey) -> Option<&Arc<ClassDescriptor>> {
        self.classes.get(key)
    }

    /// # Errors
    /// Returns [`MockAllError::UnknownType`] when `key` was never registered.
    pub fn class(&self, key: &TypeKey) -> Result<&Arc<ClassDescriptor>> {
        self.classes
            .get(key)
            .ok_or_else(|| MockAllError::unknown_type(key.name()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The class itself followed by its superclass chain. Interfaces are not part of it.
    pub fn hierarchy<'a>(&'a self, key: &TypeKey) -> Hierarchy<'a> {
        Hierarchy {
            catalog: self,
            next: self.classes.get(key),
        }
    }

    /// Whether a value of type `candidate` can be stored where `target` is expected,
    /// following superclasses and implemented interfaces.
    pub fn is_assignable_from(&self, target: &TypeKey, candidate: &TypeKey) -> bool {
        if target == candidate {
            return true;
        }

        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([candidate]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let Some(class) = self.classes.get(current) else {
                continue;
            };
            for supertype in class.parent().into_iter().chain(class.interfaces()) {
                if supertype == target {
                    return true;
                }
                queue.push_back(supertype);
            }
        }
        false
    }

    /// Virtual method lookup: the most derived declaration along the superclass
    /// chain, then the interfaces of each class in that chain.
    pub fn find_method(&self, key: &TypeKey, name: &str) -> Option<&MethodDescriptor> {
        if let Some(method) = self
            .hierarchy(key)
            .find_map(|class| class.declared_method(name))
        {
            return Some(method);
        }

        let mut seen = HashSet::new();
        let mut queue: VecDeque<&TypeKey> = self
            .hierarchy(key)
            .flat_map(|class| class.interfaces().iter())
            .collect();
        while let Some(interface) = queue.pop_front() {
            if !seen.insert(interface) {
                continue;
            }
            let Some(class) = self.classes.get(interface) else {
                continue;
            };
            if let Some(method) = class.declared_method(name) {
                return Some(method);
            }
            queue.extend(class.parent().into_iter().chain(class.interfaces()));
        }
        None
    }
}

/// Iterator over a class and its ancestors, most derived first.
pub struct Hierarchy<'a> {
    catalog: &'a TypeCatalog,
    next: Option<&'a Arc<ClassDescriptor>>,
}

impl<'a> Iterator for Hierarchy<'a> {
    type Item = &'a Arc<ClassDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current
            .parent()
            .and_then(|parent| self.catalog.classes.get(parent));
        Some(current)
    }
}

/// Builder for a [`TypeCatalog`].
///
/// Registering the same key twice keeps the later description.
#[derive(Debug, Default)]
pub struct TypeCatalogBuilder {
    classes: Vec<ClassDescriptor>,
}

impl TypeCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: ClassDescriptor) -> Self {
        self.classes.push(class);
        self
    }

    /// Validate the declared relationships and freeze the catalog.
    ///
    /// # Errors
    /// [`MockAllError::UnknownType`] when a parent or interface is not registered,
    /// [`MockAllError::InvalidConfiguration`] when a superclass chain loops.
    pub fn build(self) -> Result<Arc<TypeCatalog>> {
        let classes: HashMap<TypeKey, Arc<ClassDescriptor>> = self
            .classes
            .into_iter()
            .map(|class| (class.key().clone(), Arc::new(class)))
            .collect();

        for class in classes.values() {
            for supertype in class.parent().into_iter().chain(class.interfaces()) {
                if !classes.contains_key(supertype) {
                    return Err(MockAllError::unknown_type(supertype.name()));
                }
            }
        }

        let catalog = TypeCatalog { classes };
        for key in catalog.classes.keys() {
            let mut chain = HashSet::new();
            for class in catalog.hierarchy(key) {
                if !chain.insert(class.key()) {
                    return Err(MockAllError::InvalidConfiguration {
                        message: format!("superclass chain of {} loops through {}", key, class.key()),
                    });
                }
            }
        }

        tracing::debug!("Type catalog built with {} classes", catalog.len());
        Ok(Arc::new(catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Value;

    fn catalog() -> Arc<TypeCatalog> {
        TypeCatalog::builder()
            .class(ClassDescriptor::new("Named").abstract_class().abstract_method("name", Value::from("")))
            .class(ClassDescriptor::new("Root").implements("Named").default_constructor())
            .class(
                ClassDescriptor::new("Mid")
                    .extends("Root")
                    .method("name", |_, _| Ok(Value::from("mid"))),
            )
            .class(ClassDescriptor::new("Leaf").extends("Mid").default_constructor())
            .class(ClassDescriptor::new("Other").default_constructor())
            .build()
            .unwrap()
    }

    #[test]
    fn test_hierarchy_walks_superclass_chain() {
        let catalog = catalog();
        let names: Vec<&str> = catalog
            .hierarchy(&"Leaf".into())
            .map(|class| class.key().name())
            .collect();
        assert_eq!(names, vec!["Leaf", "Mid", "Root"]);
        assert_eq!(catalog.hierarchy(&"Missing".into()).count(), 0);
    }

    #[test]
    fn test_assignability() {
        let catalog = catalog();
        assert!(catalog.is_assignable_from(&"Root".into(), &"Leaf".into()));
        assert!(catalog.is_assignable_from(&"Named".into(), &"Leaf".into()));
        assert!(catalog.is_assignable_from(&"Leaf".into(), &"Leaf".into()));
        assert!(!catalog.is_assignable_from(&"Leaf".into(), &"Root".into()));
        assert!(!catalog.is_assignable_from(&"Root".into(), &"Other".into()));
    }

    #[test]
    fn test_find_method_prefers_most_derived() {
        let catalog = catalog();
        let method = catalog.find_method(&"Leaf".into(), "name").unwrap();
        assert!(method.body().is_some());

        let inherited = catalog.find_method(&"Root".into(), "name").unwrap();
        assert!(inherited.body().is_none());
        assert!(catalog.find_method(&"Other".into(), "name").is_none());
    }

    #[test]
    fn test_build_rejects_unknown_parent() {
        let result = TypeCatalog::builder()
            .class(ClassDescriptor::new("Orphan").extends("Missing"))
            .build();
        assert!(matches!(result, Err(MockAllError::UnknownType { type_name }) if type_name == "Missing"));
    }

    #[test]
    fn test_build_rejects_inheritance_loop() {
        let result = TypeCatalog::builder()
            .class(ClassDescriptor::new("A").extends("B"))
            .class(ClassDescriptor::new("B").extends("A"))
            .build();
        assert!(matches!(result, Err(MockAllError::InvalidConfiguration { .. })));
    }
}
