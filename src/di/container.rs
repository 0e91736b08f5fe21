use crate::error::{MockAllError, Result};
use crate::reflect::{Instance, TypeKey};
use dashmap::DashMap;

/// Read access to the beans of a dependency injection container.
///
/// Both lookups are fallible; callers in this crate treat every error as "no bean".
pub trait BeanContainer: Send + Sync {
    /// The single bean assignable to `key`.
    fn lookup_by_type(&self, key: &TypeKey) -> Result<Instance>;

    /// The bean registered as `name`, which must be assignable to `key`.
    fn lookup_by_name(&self, name: &str, key: &TypeKey) -> Result<Instance>;
}

/// Thread-safe bean container keyed by bean name.
pub struct ApplicationContext {
    beans: DashMap<String, BeanEntry>,
}

impl Clone for ApplicationContext {
    fn clone(&self) -> Self {
        Self {
            beans: self.beans.clone(),
        }
    }
}

#[derive(Clone)]
struct BeanEntry {
    instance: Instance,
    primary: bool,
}

impl BeanEntry {
    fn is_assignable_to(&self, key: &TypeKey) -> bool {
        self.instance
            .catalog()
            .is_assignable_from(key, self.instance.type_key())
    }
}

impl ApplicationContext {
    pub fn new() -> Self {
        Self {
            beans: DashMap::new(),
        }
    }

    /// Register a bean. A later registration under the same name replaces the earlier one.
    pub fn register(&mut self, name: impl Into<String>, instance: Instance) -> &mut Self {
        self.insert(name.into(), instance, false)
    }

    /// Register a bean that wins type lookups when several beans match.
    pub fn register_primary(&mut self, name: impl Into<String>, instance: Instance) -> &mut Self {
        self.insert(name.into(), instance, true)
    }

    fn insert(&mut self, name: String, instance: Instance, primary: bool) -> &mut Self {
        tracing::debug!("Registering bean '{}' of type {}", name, instance.type_key());
        self.beans.insert(name, BeanEntry { instance, primary });
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.beans.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanContainer for ApplicationContext {
    fn lookup_by_type(&self, key: &TypeKey) -> Result<Instance> {
        let mut candidates: Vec<(String, BeanEntry)> = self
            .beans
            .iter()
            .filter(|bean| bean.value().is_assignable_to(key))
            .map(|bean| (bean.key().clone(), bean.value().clone()))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        match candidates.len() {
            0 => Err(MockAllError::BeanNotFound {
                description: format!("type {}", key),
            }),
            1 => Ok(candidates.remove(0).1.instance),
            count => {
                let mut primaries = candidates.iter().filter(|(_, bean)| bean.primary);
                match (primaries.next(), primaries.next()) {
                    (Some((_, bean)), None) => Ok(bean.instance.clone()),
                    _ => Err(MockAllError::NoUniqueBean {
                        type_name: key.to_string(),
                        count,
                        candidates: candidates
                            .iter()
                            .map(|(name, _)| name.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }
    }

    fn lookup_by_name(&self, name: &str, key: &TypeKey) -> Result<Instance> {
        let bean = self
            .beans
            .get(name)
            .ok_or_else(|| MockAllError::BeanNotFound {
                description: format!("name '{}'", name),
            })?;

        if !bean.is_assignable_to(key) {
            return Err(MockAllError::BeanTypeMismatch {
                name: name.to_string(),
                expected: key.to_string(),
                actual: bean.instance.type_key().to_string(),
            });
        }
        Ok(bean.instance.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{ClassDescriptor, TypeCatalog};
    use std::sync::Arc;

    fn catalog() -> Arc<TypeCatalog> {
        TypeCatalog::builder()
            .class(ClassDescriptor::new("Map").default_constructor())
            .class(ClassDescriptor::new("HashMap").extends("Map").default_constructor())
            .class(ClassDescriptor::new("Properties").default_constructor())
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup_by_type() {
        let catalog = catalog();
        let map = Instance::construct(&catalog, &"HashMap".into()).unwrap();

        let mut context = ApplicationContext::new();
        context.register("getMap", map.clone());

        assert_eq!(context.lookup_by_type(&"HashMap".into()).unwrap(), map);
        assert_eq!(context.lookup_by_type(&"Map".into()).unwrap(), map);
        assert!(matches!(
            context.lookup_by_type(&"Properties".into()),
            Err(MockAllError::BeanNotFound { .. })
        ));
    }

    #[test]
    fn test_primary_bean_wins_type_lookup() {
        let catalog = catalog();
        let primary = Instance::construct(&catalog, &"HashMap".into()).unwrap();
        let other = Instance::construct(&catalog, &"HashMap".into()).unwrap();

        let mut context = ApplicationContext::new();
        context.register("anotherMap", other.clone());
        assert_eq!(context.lookup_by_type(&"HashMap".into()).unwrap(), other);

        context.register_primary("getMap", primary.clone());
        assert_eq!(context.lookup_by_type(&"HashMap".into()).unwrap(), primary);
    }

    #[test]
    fn test_ambiguous_type_lookup_fails() {
        let catalog = catalog();
        let mut context = ApplicationContext::new();
        context
            .register("b", Instance::construct(&catalog, &"HashMap".into()).unwrap())
            .register("a", Instance::construct(&catalog, &"HashMap".into()).unwrap());

        match context.lookup_by_type(&"Map".into()) {
            Err(MockAllError::NoUniqueBean { count, candidates, .. }) => {
                assert_eq!(count, 2);
                assert_eq!(candidates, "a, b");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_lookup_by_name_checks_type() {
        let catalog = catalog();
        let properties = Instance::construct(&catalog, &"Properties".into()).unwrap();

        let mut context = ApplicationContext::new();
        context.register("myProperties", properties.clone());

        assert_eq!(
            context.lookup_by_name("myProperties", &"Properties".into()).unwrap(),
            properties
        );
        assert!(matches!(
            context.lookup_by_name("myProperties", &"Map".into()),
            Err(MockAllError::BeanTypeMismatch { .. })
        ));
        assert!(matches!(
            context.lookup_by_name("missing", &"Properties".into()),
            Err(MockAllError::BeanNotFound { .. })
        ));
    }
}
