use super::{Instance, Marker, MarkerKind, TypeKey, Value};
use crate::error::{MockAllError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Initializer run on a freshly allocated real instance.
pub type Constructor = Arc<dyn Fn(&Instance) -> Result<()> + Send + Sync>;

/// Method body. The first argument is the receiver.
pub type MethodFn = Arc<dyn Fn(&Instance, &[Value]) -> Result<Value> + Send + Sync>;

/// A field declared directly on one class.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    declared_type: TypeKey,
    markers: Vec<Marker>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<TypeKey>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            markers: Vec::new(),
        }
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &TypeKey {
        &self.declared_type
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.iter().any(|marker| marker.kind() == kind)
    }

    pub fn has_any_marker(&self, kinds: &[MarkerKind]) -> bool {
        kinds.iter().any(|kind| self.has_marker(*kind))
    }

    /// The tracking-wrapper types of the field's `NotMocked` marker, if it carries one.
    pub fn not_mocked(&self) -> Option<&[TypeKey]> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::NotMocked { tracking_types } => Some(tracking_types.as_slice()),
            _ => None,
        })
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::Qualifier(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// A method declared on a class.
///
/// Doubles never run `body`; they answer `default_return` unless stubbed.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    body: Option<MethodFn>,
    default_return: Value,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> Option<&MethodFn> {
        self.body.as_ref()
    }

    pub fn default_return(&self) -> &Value {
        &self.default_return
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("abstract", &self.body.is_none())
            .field("default_return", &self.default_return)
            .finish()
    }
}

/// Everything the listener needs to know about one class.
#[derive(Clone)]
pub struct ClassDescriptor {
    key: TypeKey,
    parent: Option<TypeKey>,
    interfaces: Vec<TypeKey>,
    is_abstract: bool,
    fields: Vec<FieldDescriptor>,
    constructor: Option<Constructor>,
    methods: HashMap<String, MethodDescriptor>,
}

impl ClassDescriptor {
    pub fn new(key: impl Into<TypeKey>) -> Self {
        Self {
            key: key.into(),
            parent: None,
            interfaces: Vec::new(),
            is_abstract: false,
            fields: Vec::new(),
            constructor: None,
            methods: HashMap::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<TypeKey>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<TypeKey>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Abstract classes can be doubled but never constructed.
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// A zero argument constructor that leaves every field null.
    pub fn default_constructor(self) -> Self {
        self.constructor(|_| Ok(()))
    }

    pub fn constructor<F>(mut self, init: F) -> Self
    where
        F: Fn(&Instance) -> Result<()> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(init));
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.method_returning(name, Value::Null, body)
    }

    pub fn method_returning<F>(mut self, name: impl Into<String>, default_return: Value, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        self.methods.insert(
            name.clone(),
            MethodDescriptor {
                name,
                body: Some(Arc::new(body)),
                default_return,
            },
        );
        self
    }

    pub fn abstract_method(mut self, name: impl Into<String>, default_return: Value) -> Self {
        let name = name.into();
        self.methods.insert(
            name.clone(),
            MethodDescriptor {
                name,
                body: None,
                default_return,
            },
        );
        self
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn parent(&self) -> Option<&TypeKey> {
        self.parent.as_ref()
    }

    pub fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Fields declared on this class only, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn declared_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// The raw initializer, also present on abstract classes so subclasses can chain to it.
    pub(crate) fn initializer(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    pub fn has_zero_arg_constructor(&self) -> bool {
        !self.is_abstract && self.constructor.is_some()
    }

    /// # Errors
    /// Returns [`MockAllError::MissingZeroArgConstructor`] for abstract classes and
    /// classes declared without a zero argument constructor.
    pub fn zero_arg_constructor(&self) -> Result<&Constructor> {
        match &self.constructor {
            Some(constructor) if !self.is_abstract => Ok(constructor),
            _ => Err(MockAllError::MissingZeroArgConstructor {
                type_name: self.key.to_string(),
                marker: MarkerKind::NotMocked,
            }),
        }
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("ClassDescriptor")
            .field("key", &self.key)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .field("abstract", &self.is_abstract)
            .field("fields", &self.fields)
            .field("zero_arg_constructor", &self.constructor.is_some())
            .field("methods", &methods)
            .finish()
    }
}
