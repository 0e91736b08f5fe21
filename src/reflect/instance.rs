use super::{ClassDescriptor, TypeCatalog, TypeKey, Value};
use crate::error::{MockAllError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use uuid::Uuid;

/// One recorded call on a double or tracking wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct Invocation {
    pub method: String,
    pub args: Vec<Value>,
    pub recorded_at: DateTime<Utc>,
}

/// How an instance answers method calls.
#[derive(Debug, Clone)]
pub enum InstanceKind {
    /// Runs the class's method bodies.
    Real,
    /// Records calls and answers stubs or the method's default return value.
    Double,
    /// Records calls and runs the real method bodies. Field storage is the delegate's.
    TrackingWrapper(Instance),
}

struct ObjectCell {
    id: Uuid,
    class: Arc<ClassDescriptor>,
    catalog: Arc<TypeCatalog>,
    kind: InstanceKind,
    // Keyed by (declaring class, field name) so shadowed fields stay apart.
    fields: RwLock<HashMap<(TypeKey, String), Value>>,
    stubs: RwLock<HashMap<String, Value>>,
    interactions: Mutex<Vec<Invocation>>,
}

/// Shared handle to an object created from a [`TypeCatalog`].
///
/// Equality is identity: two handles are equal when they point at the same object.
#[derive(Clone)]
pub struct Instance(Arc<ObjectCell>);

impl Instance {
    fn allocate(catalog: &Arc<TypeCatalog>, key: &TypeKey, kind: InstanceKind) -> Result<Self> {
        let class = catalog.class(key)?.clone();
        Ok(Self(Arc::new(ObjectCell {
            id: Uuid::new_v4(),
            class,
            catalog: Arc::clone(catalog),
            kind,
            fields: RwLock::new(HashMap::new()),
            stubs: RwLock::new(HashMap::new()),
            interactions: Mutex::new(Vec::new()),
        })))
    }

    /// Build a real instance through the class's zero argument constructor.
    ///
    /// Ancestor initializers run first, root to leaf.
    ///
    /// # Errors
    /// [`MockAllError::MissingZeroArgConstructor`] when the class is abstract or has no
    /// zero argument constructor, or any error raised by an initializer.
    pub fn construct(catalog: &Arc<TypeCatalog>, key: &TypeKey) -> Result<Self> {
        catalog.class(key)?.zero_arg_constructor()?;
        let instance = Self::allocate(catalog, key, InstanceKind::Real)?;

        let chain: Vec<_> = catalog.hierarchy(key).collect();
        for class in chain.into_iter().rev() {
            if let Some(init) = class.initializer() {
                init(&instance)?;
            }
        }
        Ok(instance)
    }

    /// A stand-in with no backing object. Works for abstract classes and interfaces.
    pub fn double(catalog: &Arc<TypeCatalog>, key: &TypeKey) -> Result<Self> {
        Self::allocate(catalog, key, InstanceKind::Double)
    }

    /// A recording wrapper around a freshly constructed real instance.
    pub fn tracking_wrapper(catalog: &Arc<TypeCatalog>, key: &TypeKey) -> Result<Self> {
        let delegate = Self::construct(catalog, key)?;
        Self::allocate(catalog, key, InstanceKind::TrackingWrapper(delegate))
    }

    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn type_key(&self) -> &TypeKey {
        self.0.class.key()
    }

    pub fn class(&self) -> &Arc<ClassDescriptor> {
        &self.0.class
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.0.catalog
    }

    pub fn kind(&self) -> &InstanceKind {
        &self.0.kind
    }

    pub fn kind_name(&self) -> &'static str {
        match self.0.kind {
            InstanceKind::Real => "real",
            InstanceKind::Double => "double",
            InstanceKind::TrackingWrapper(_) => "tracking-wrapper",
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self.0.kind, InstanceKind::Real)
    }

    pub fn is_double(&self) -> bool {
        matches!(self.0.kind, InstanceKind::Double)
    }

    pub fn is_tracking_wrapper(&self) -> bool {
        matches!(self.0.kind, InstanceKind::TrackingWrapper(_))
    }

    pub fn delegate(&self) -> Option<&Instance> {
        match &self.0.kind {
            InstanceKind::TrackingWrapper(delegate) => Some(delegate),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn storage(&self) -> &ObjectCell {
        match &self.0.kind {
            InstanceKind::TrackingWrapper(delegate) => delegate.storage(),
            _ => &self.0,
        }
    }

    /// Write a field declared on `owner`, regardless of visibility.
    pub fn write_field(&self, owner: &TypeKey, name: &str, value: Value) {
        self.storage()
            .fields
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((owner.clone(), name.to_string()), value);
    }

    /// Read a field declared on `owner`. Unset fields read as [`Value::Null`].
    pub fn read_field(&self, owner: &TypeKey, name: &str) -> Value {
        self.storage()
            .fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(owner.clone(), name.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn field_owner(&self, name: &str) -> Result<TypeKey> {
        self.0
            .catalog
            .hierarchy(self.type_key())
            .find(|class| class.fields().iter().any(|field| field.name() == name))
            .map(|class| class.key().clone())
            .ok_or_else(|| MockAllError::UnknownField {
                type_name: self.type_key().to_string(),
                field: name.to_string(),
            })
    }

    /// Read the most derived field called `name`.
    pub fn get(&self, name: &str) -> Result<Value> {
        let owner = self.field_owner(name)?;
        Ok(self.read_field(&owner, name))
    }

    /// Write the most derived field called `name`.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let owner = self.field_owner(name)?;
        self.write_field(&owner, name, value.into());
        Ok(())
    }

    /// Make `method` answer `value` on this double or tracking wrapper.
    pub fn stub(&self, method: &str, value: impl Into<Value>) -> Result<()> {
        if self.is_real() {
            return Err(MockAllError::NotADouble {
                type_name: self.type_key().to_string(),
            });
        }
        self.0
            .stubs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method.to_string(), value.into());
        Ok(())
    }

    /// Call `method` with virtual dispatch.
    ///
    /// # Errors
    /// [`MockAllError::UnknownMethod`] when no class in the hierarchy declares it,
    /// [`MockAllError::AbstractMethod`] when a real call reaches a declaration without a body.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        let descriptor = self
            .0
            .catalog
            .find_method(self.type_key(), method)
            .ok_or_else(|| MockAllError::UnknownMethod {
                type_name: self.type_key().to_string(),
                method: method.to_string(),
            })?;

        if !self.is_real() {
            self.record(method, args);
            let stubbed = self
                .0
                .stubs
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(method)
                .cloned();
            if let Some(value) = stubbed {
                return Ok(value);
            }
            if self.is_double() {
                return Ok(descriptor.default_return().clone());
            }
        }

        let body = descriptor.body().ok_or_else(|| MockAllError::AbstractMethod {
            type_name: self.type_key().to_string(),
            method: method.to_string(),
        })?;
        body(self, args)
    }

    fn record(&self, method: &str, args: &[Value]) {
        tracing::trace!("{} {} <- {}", self.kind_name(), self.type_key(), method);
        self.0
            .interactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Invocation {
                method: method.to_string(),
                args: args.to_vec(),
                recorded_at: Utc::now(),
            });
    }

    /// Calls recorded so far, oldest first. Real instances record nothing.
    pub fn interactions(&self) -> Vec<Invocation> {
        self.0
            .interactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn invocation_count(&self, method: &str) -> usize {
        self.0
            .interactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|invocation| invocation.method == method)
            .count()
    }

    pub fn clear_interactions(&self) {
        self.0
            .interactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn interactions_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.interactions())?)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.type_key(), self.0.id, self.kind_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::FieldDescriptor;

    fn catalog() -> Arc<TypeCatalog> {
        TypeCatalog::builder()
            .class(
                ClassDescriptor::new("Counter")
                    .field(FieldDescriptor::new("count", "Int"))
                    .constructor(|this| {
                        this.write_field(&"Counter".into(), "count", Value::Int(0));
                        Ok(())
                    })
                    .method_returning("increment", Value::Int(0), |this, _| {
                        let next = this.get("count")?.as_int().unwrap_or_default() + 1;
                        this.set("count", next)?;
                        Ok(Value::Int(next))
                    })
                    .method_returning("incrementTwice", Value::Int(0), |this, _| {
                        this.invoke("increment", &[])?;
                        this.invoke("increment", &[])
                    }),
            )
            .class(
                ClassDescriptor::new("SlowCounter")
                    .extends("Counter")
                    .field(FieldDescriptor::new("count", "Int"))
                    .default_constructor(),
            )
            .class(ClassDescriptor::new("Int"))
            .class(ClassDescriptor::new("Shape").abstract_class().abstract_method("area", Value::Int(0)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_real_instance_runs_constructor_and_methods() {
        let catalog = catalog();
        let counter = Instance::construct(&catalog, &"Counter".into()).unwrap();
        assert!(counter.is_real());
        assert_eq!(counter.get("count").unwrap(), Value::Int(0));
        assert_eq!(counter.invoke("increment", &[]).unwrap(), Value::Int(1));
        assert!(counter.interactions().is_empty());
    }

    #[test]
    fn test_ancestor_initializers_run_before_own() {
        let catalog = catalog();
        let slow = Instance::construct(&catalog, &"SlowCounter".into()).unwrap();
        assert_eq!(slow.read_field(&"Counter".into(), "count"), Value::Int(0));
        // The shadowing field is untouched by the ancestor's initializer.
        assert!(slow.get("count").unwrap().is_null());
    }

    #[test]
    fn test_double_records_and_returns_defaults() {
        let catalog = catalog();
        let double = Instance::double(&catalog, &"Counter".into()).unwrap();
        assert!(double.is_double());
        assert_eq!(double.invoke("increment", &[Value::from("x")]).unwrap(), Value::Int(0));
        assert!(double.get("count").unwrap().is_null());

        double.stub("increment", 41i64).unwrap();
        assert_eq!(double.invoke("increment", &[]).unwrap(), Value::Int(41));
        assert_eq!(double.invocation_count("increment"), 2);
        assert_eq!(double.interactions()[0].args, vec![Value::from("x")]);
    }

    #[test]
    fn test_tracking_wrapper_delegates_and_records_internal_calls() {
        let catalog = catalog();
        let wrapper = Instance::tracking_wrapper(&catalog, &"Counter".into()).unwrap();
        assert!(wrapper.is_tracking_wrapper());
        assert_eq!(wrapper.invoke("incrementTwice", &[]).unwrap(), Value::Int(2));
        assert_eq!(wrapper.invocation_count("increment"), 2);
        assert_eq!(wrapper.invocation_count("incrementTwice"), 1);
        assert_eq!(wrapper.delegate().unwrap().get("count").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_abstract_classes_can_only_be_doubled() {
        let catalog = catalog();
        assert!(Instance::double(&catalog, &"Shape".into()).is_ok());
        assert!(matches!(
            Instance::construct(&catalog, &"Shape".into()),
            Err(MockAllError::MissingZeroArgConstructor { .. })
        ));
        assert!(matches!(
            Instance::tracking_wrapper(&catalog, &"Shape".into()),
            Err(MockAllError::MissingZeroArgConstructor { .. })
        ));
    }

    #[test]
    fn test_unknown_members_are_errors() {
        let catalog = catalog();
        let counter = Instance::construct(&catalog, &"Counter".into()).unwrap();
        assert!(matches!(counter.invoke("reset", &[]), Err(MockAllError::UnknownMethod { .. })));
        assert!(matches!(counter.get("missing"), Err(MockAllError::UnknownField { .. })));
        assert!(matches!(counter.stub("increment", 1i64), Err(MockAllError::NotADouble { .. })));
    }

    #[test]
    fn test_identity_equality_and_json_dump() {
        let catalog = catalog();
        let a = Instance::double(&catalog, &"Counter".into()).unwrap();
        let b = Instance::double(&catalog, &"Counter".into()).unwrap();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);

        a.invoke("increment", &[Value::Object(b.clone())]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&a.interactions_json().unwrap()).unwrap();
        assert_eq!(json[0]["method"], "increment");
        assert_eq!(json[0]["args"][0]["type"], "Counter");
        assert_eq!(json[0]["args"][0]["kind"], "double");
    }
}
