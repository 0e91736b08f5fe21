use super::InstanceRegistry;
use crate::config::{ConfigService, ListenerConfig};
use crate::double::{DoubleFactory, RecordingDoubles};
use crate::error::Result;
use crate::listener::{TestContext, TestExecutionListener};
use crate::reflect::{ClassDescriptor, FieldDescriptor, Instance, MarkerKind, TypeCatalog, TypeKey, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// How a single field is filled.
enum Injection<'a> {
    /// `NotMocked`: a real object, or a tracking wrapper for listed types.
    Actual { qualifier: Option<&'a str> },
    /// Any injectable marker: a shared double, or a shared tracking wrapper.
    Double { as_tracking_wrapper: bool },
}

/// A [`TestExecutionListener`] that doubles ALL injected dependencies of a test instance.
///
/// Fields marked `NotMocked` are filled with real objects. The types listed on a
/// `NotMocked` marker are created as tracking wrappers instead of doubles for as long
/// as this listener lives.
///
/// # Example
///
/// ```rust
/// use mock_all::listener::{TestContext, TestExecutionListener};
/// use mock_all::reflect::{ClassDescriptor, FieldDescriptor, Instance, Marker, TypeCatalog};
/// use mock_all::MockAllListener;
///
/// let catalog = TypeCatalog::builder()
///     .class(ClassDescriptor::new("Properties").default_constructor())
///     .class(
///         ClassDescriptor::new("ServiceTest")
///             .default_constructor()
///             .field(FieldDescriptor::new("properties", "Properties").marker(Marker::Autowired)),
///     )
///     .build()
///     .unwrap();
///
/// MockAllListener::reset_registry();
/// let test = Instance::construct(&catalog, &"ServiceTest".into()).unwrap();
/// MockAllListener::new(catalog)
///     .prepare_test_instance(&TestContext::new(test.clone()))
///     .unwrap();
///
/// let properties = test.get("properties").unwrap();
/// assert!(properties.as_object().unwrap().is_double());
/// ```
pub struct MockAllListener {
    config: ListenerConfig,
    catalog: Arc<TypeCatalog>,
    doubles: Arc<dyn DoubleFactory>,
    tracking_types: HashSet<TypeKey>,
    test_context: Option<TestContext>,
}

impl MockAllListener {
    pub const ORDER: i32 = ListenerConfig::DEFAULT_ORDER;

    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self::with_config(catalog, ListenerConfig::default())
    }

    pub fn with_config(catalog: Arc<TypeCatalog>, config: ListenerConfig) -> Self {
        let doubles = Arc::new(RecordingDoubles::new(Arc::clone(&catalog)));
        Self {
            config,
            catalog,
            doubles,
            tracking_types: HashSet::new(),
            test_context: None,
        }
    }

    /// Order and injectable markers read from `config`, see
    /// [`ListenerConfig::from_config`].
    pub fn from_config(catalog: Arc<TypeCatalog>, config: &ConfigService) -> Result<Self> {
        Ok(Self::with_config(catalog, ListenerConfig::from_config(config)?))
    }

    /// Order and injectable markers read from `MOCK_ALL_ORDER` and
    /// `MOCK_ALL_INJECTABLE_MARKERS`.
    pub fn from_env(catalog: Arc<TypeCatalog>) -> Result<Self> {
        Self::from_config(catalog, &ConfigService::new())
    }

    /// Replace the double library.
    pub fn with_double_factory(mut self, doubles: Arc<dyn DoubleFactory>) -> Self {
        self.doubles = doubles;
        self
    }

    /// The instance registered under exactly `key`.
    pub fn get_instance(key: &TypeKey) -> Option<Instance> {
        InstanceRegistry::get(key)
    }

    /// A registered type that is `key` or a subtype of it. When several qualify the
    /// choice is unspecified, see [`InstanceRegistry::contains_subtype_of`].
    pub fn contains_subtype_of(key: &TypeKey) -> Option<TypeKey> {
        InstanceRegistry::contains_subtype_of(key)
    }

    /// Forget every registered instance. Call before preparing each test.
    pub fn reset_registry() {
        InstanceRegistry::reset();
    }

    /// Marker kinds that make a field injectable.
    pub fn injectable_markers(&self) -> &[MarkerKind] {
        &self.config.injectable_markers
    }

    pub fn double_factory(&self) -> &Arc<dyn DoubleFactory> {
        &self.doubles
    }

    pub fn test_context(&self) -> Option<&TestContext> {
        self.test_context.as_ref()
    }

    pub fn add_tracking_type(&mut self, key: impl Into<TypeKey>) {
        self.tracking_types.insert(key.into());
    }

    pub fn is_tracking_type(&self, key: &TypeKey) -> bool {
        self.tracking_types.contains(key)
    }

    /// The registered instance of `key` or of any subtype of it; otherwise a new double
    /// (or tracking wrapper), registered under exactly `key`.
    ///
    /// Reusing subtype instances keeps one object per dependency when a more specific
    /// instance, such as the test instance itself, was registered first.
    pub fn create_or_get_instance(&self, key: &TypeKey, as_tracking_wrapper: bool) -> Result<Instance> {
        if let Some(existing) = InstanceRegistry::find_subtype_in(&self.catalog, key)
            .and_then(|registered| InstanceRegistry::get(&registered))
        {
            tracing::debug!("Reusing {:?} for {}", existing, key);
            return Ok(existing);
        }

        let created = self.create_double_or_tracking_wrapper(key, as_tracking_wrapper)?;
        tracing::debug!("Created {:?}", created);
        InstanceRegistry::insert(key.clone(), created.clone());
        Ok(created)
    }

    pub fn create_double_or_tracking_wrapper(
        &self,
        key: &TypeKey,
        as_tracking_wrapper: bool,
    ) -> Result<Instance> {
        if as_tracking_wrapper {
            self.doubles.create_tracking_wrapper(key)
        } else {
            self.doubles.create_double(key)
        }
    }

    /// The value for a `NotMocked` field.
    ///
    /// Tracking types go through [`create_or_get_instance`](Self::create_or_get_instance).
    /// Anything else is looked up in the application context, by `qualifier` when given,
    /// and constructed with its zero argument constructor when the context has no such
    /// bean. Real objects are not registered.
    ///
    /// # Errors
    /// [`MockAllError::MissingZeroArgConstructor`](crate::MockAllError::MissingZeroArgConstructor)
    /// when the object has to be constructed and cannot be.
    pub fn create_actual_or_tracking_wrapper(
        &self,
        key: &TypeKey,
        qualifier: Option<&str>,
    ) -> Result<Instance> {
        if self.is_tracking_type(key) {
            return self.create_or_get_instance(key, true);
        }

        let existing = match qualifier {
            Some(name) => self.bean_by_name(name, key),
            None => self.existing_bean(key),
        };
        match existing {
            Some(bean) => {
                tracing::debug!("Using bean {:?} for {}", bean, key);
                Ok(bean)
            }
            None => {
                tracing::debug!("No bean for {}, constructing one", key);
                Instance::construct(&self.catalog, key)
            }
        }
    }

    fn existing_bean(&self, key: &TypeKey) -> Option<Instance> {
        let context = self.test_context.as_ref()?.application_context()?;
        match context.lookup_by_type(key) {
            Ok(bean) => Some(bean),
            Err(e) => {
                tracing::debug!("Bean lookup by type {} failed: {}", key, e);
                None
            }
        }
    }

    fn bean_by_name(&self, name: &str, key: &TypeKey) -> Option<Instance> {
        let context = self.test_context.as_ref()?.application_context()?;
        match context.lookup_by_name(name, key) {
            Ok(bean) => Some(bean),
            Err(e) => {
                tracing::debug!("Bean lookup by name '{}' failed: {}", name, e);
                None
            }
        }
    }

    fn injection_for<'a>(&mut self, field: &'a FieldDescriptor) -> Option<Injection<'a>> {
        if let Some(tracking_types) = field.not_mocked() {
            self.tracking_types.extend(tracking_types.iter().cloned());
            return Some(Injection::Actual {
                qualifier: field.qualifier(),
            });
        }

        if field.has_any_marker(&self.config.injectable_markers) {
            return Some(Injection::Double {
                as_tracking_wrapper: self.is_tracking_type(field.declared_type()),
            });
        }
        None
    }

    /// Fill the fields of `key` and of every ancestor, then recurse into the types of
    /// the filled fields. Each type is walked at most once per pass.
    fn inject_fields(&mut self, key: &TypeKey, visited: &mut HashSet<TypeKey>) -> Result<()> {
        if !visited.insert(key.clone()) {
            return Ok(());
        }

        self.catalog.class(key)?;
        let hierarchy: Vec<Arc<ClassDescriptor>> = self.catalog.hierarchy(key).cloned().collect();

        for class in hierarchy {
            // The owner is resolved on first use, classes without injected fields are
            // never registered.
            let mut owner: Option<Instance> = None;

            for field in class.fields() {
                let Some(injection) = self.injection_for(field) else {
                    continue;
                };
                tracing::trace!("Injecting {}.{}", class.key(), field.name());

                let target = match &owner {
                    Some(target) => target.clone(),
                    None => {
                        let target = self.create_or_get_instance(class.key(), false)?;
                        owner = Some(target.clone());
                        target
                    }
                };

                let value = match injection {
                    Injection::Actual { qualifier } => {
                        self.create_actual_or_tracking_wrapper(field.declared_type(), qualifier)?
                    }
                    Injection::Double { as_tracking_wrapper } => {
                        self.create_or_get_instance(field.declared_type(), as_tracking_wrapper)?
                    }
                };

                target.write_field(class.key(), field.name(), Value::Object(value));
                self.inject_fields(field.declared_type(), visited)?;
            }
        }
        Ok(())
    }
}

impl TestExecutionListener for MockAllListener {
    fn order(&self) -> i32 {
        self.config.order
    }

    fn name(&self) -> &'static str {
        "MockAllListener"
    }

    /// Register the test instance under its exact type and inject every field of its
    /// class hierarchy.
    fn prepare_test_instance(&mut self, context: &TestContext) -> Result<()> {
        self.test_context = Some(context.clone());
        let test_class = context.test_class().clone();
        tracing::info!("Mocking injected fields of {}", test_class);

        InstanceRegistry::insert(test_class.clone(), context.test_instance().clone());
        let mut visited = HashSet::new();
        self.inject_fields(&test_class, &mut visited)?;

        tracing::info!(
            "Mocked fields of {} ({} types walked, {} instances registered)",
            test_class,
            visited.len(),
            InstanceRegistry::len()
        );
        Ok(())
    }
}
