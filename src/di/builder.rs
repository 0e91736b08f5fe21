use crate::di::ApplicationContext;
use crate::reflect::Instance;

/// Builder for an [`ApplicationContext`]
///
/// # Example
/// ```
/// use mock_all::di::{ApplicationContextBuilder, BeanContainer};
/// use mock_all::reflect::{ClassDescriptor, Instance, TypeCatalog};
///
/// let catalog = TypeCatalog::builder()
///     .class(ClassDescriptor::new("Properties").default_constructor())
///     .build()
///     .unwrap();
/// let properties = Instance::construct(&catalog, &"Properties".into()).unwrap();
///
/// let context = ApplicationContextBuilder::new()
///     .bean("myProperties", properties.clone())
///     .build();
///
/// assert_eq!(context.lookup_by_name("myProperties", &"Properties".into()).unwrap(), properties);
/// ```
pub struct ApplicationContextBuilder {
    context: ApplicationContext,
}

impl ApplicationContextBuilder {
    pub fn new() -> Self {
        Self {
            context: ApplicationContext::new(),
        }
    }

    /// Register a bean under `name`
    pub fn bean(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.context.register(name, instance);
        self
    }

    /// Register a bean that is preferred when a type lookup matches several beans
    pub fn primary_bean(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.context.register_primary(name, instance);
        self
    }

    /// Build the context
    pub fn build(self) -> ApplicationContext {
        self.context
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
