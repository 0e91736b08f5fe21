use crate::di::BeanContainer;
use crate::reflect::{Instance, TypeKey};
use std::fmt;
use std::sync::Arc;

/// What the runner knows about the test being prepared.
#[derive(Clone)]
pub struct TestContext {
    test_instance: Instance,
    application_context: Option<Arc<dyn BeanContainer>>,
}

impl TestContext {
    pub fn new(test_instance: Instance) -> Self {
        Self {
            test_instance,
            application_context: None,
        }
    }

    pub fn with_application_context(mut self, context: Arc<dyn BeanContainer>) -> Self {
        self.application_context = Some(context);
        self
    }

    pub fn test_instance(&self) -> &Instance {
        &self.test_instance
    }

    /// The exact runtime type of the test instance.
    pub fn test_class(&self) -> &TypeKey {
        self.test_instance.type_key()
    }

    pub fn application_context(&self) -> Option<&Arc<dyn BeanContainer>> {
        self.application_context.as_ref()
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("test_instance", &self.test_instance)
            .field("application_context", &self.application_context.is_some())
            .finish()
    }
}
