//! Fixture classes shared by the integration tests.
#![allow(dead_code)]

use mock_all::prelude::*;
use std::sync::{Arc, Once};

pub const PROPERTY_NAME: &str = "Property_name";
pub const PROPERTY_VALUE: &str = "myV4Lu3";

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .try_init();
    });
}

fn entry(pair: &Value) -> Option<(&str, &Value)> {
    let items = pair.as_list()?;
    Some((items.first()?.as_str()?, items.get(1)?))
}

/// A string to string map with `getProperty` / `setProperty`, stored as a list of pairs.
fn key_value_class(name: &str, getter: &str, setter: &str) -> ClassDescriptor {
    let owner = TypeKey::from(name);
    let read_owner = owner.clone();
    let write_owner = owner.clone();
    ClassDescriptor::new(name)
        .field(FieldDescriptor::new("entries", "List"))
        .constructor(move |this| {
            this.write_field(&owner, "entries", Value::List(Vec::new()));
            Ok(())
        })
        .method(getter, move |this, args| {
            let key = args.first().and_then(Value::as_str).unwrap_or_default();
            let entries = this.read_field(&read_owner, "entries");
            Ok(entries
                .as_list()
                .unwrap_or_default()
                .iter()
                .filter_map(entry)
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default())
        })
        .method(setter, move |this, args| {
            let mut entries: Vec<Value> = this
                .read_field(&write_owner, "entries")
                .as_list()
                .map(<[Value]>::to_vec)
                .unwrap_or_default();
            entries.push(Value::List(args.to_vec()));
            this.write_field(&write_owner, "entries", Value::List(entries));
            Ok(Value::Null)
        })
}

/// The classic fixture hierarchy:
///
/// ```text
/// BaseClass          @Autowired properties: Properties
///   └ ChildClass     @JakartaResource moduleResource: Module, @Resource packageResource: Package
///       └ ChildChildClass   @NotMocked([Properties]) thread: Thread
/// ```
pub fn model_classes() -> TypeCatalogBuilder {
    TypeCatalog::builder()
        .class(ClassDescriptor::new("List"))
        .class(key_value_class("Properties", "getProperty", "setProperty"))
        .class(key_value_class("HashMap", "get", "put"))
        // Neither has a zero argument constructor.
        .class(ClassDescriptor::new("Module").method_returning("getName", Value::Null, |_, _| {
            Ok(Value::from("unnamed module"))
        }))
        .class(ClassDescriptor::new("Package"))
        .class(
            ClassDescriptor::new("Thread")
                .default_constructor()
                .method_returning("isAlive", Value::Bool(false), |_, _| Ok(Value::Bool(false))),
        )
        .class(
            ClassDescriptor::new("BaseClass")
                .default_constructor()
                .field(FieldDescriptor::new("properties", "Properties").marker(Marker::Autowired)),
        )
        .class(
            ClassDescriptor::new("ChildClass")
                .extends("BaseClass")
                .default_constructor()
                .field(FieldDescriptor::new("moduleResource", "Module").marker(Marker::JakartaResource))
                .field(FieldDescriptor::new("packageResource", "Package").marker(Marker::Resource)),
        )
        .class(
            ClassDescriptor::new("ChildChildClass")
                .extends("ChildClass")
                .default_constructor()
                .field(
                    FieldDescriptor::new("thread", "Thread")
                        .marker(Marker::not_mocked_tracking(["Properties"])),
                ),
        )
        .class(
            ClassDescriptor::new("NotMockedSpy").default_constructor().field(
                FieldDescriptor::new("properties", "Properties")
                    .marker(Marker::not_mocked_tracking(["Properties"])),
            ),
        )
        .class(
            ClassDescriptor::new("AbstractBaseClass")
                .abstract_class()
                .default_constructor()
                .field(FieldDescriptor::new("properties", "Properties").marker(Marker::Autowired)),
        )
        .class(
            ClassDescriptor::new("AbstractChildClass")
                .extends("AbstractBaseClass")
                .default_constructor()
                .field(FieldDescriptor::new("packageResource", "Package").marker(Marker::Resource)),
        )
}

/// Test classes that hold one model class each.
pub fn test_classes(builder: TypeCatalogBuilder) -> TypeCatalogBuilder {
    [
        ("BaseTest", "baseClass", "BaseClass"),
        ("ChildTest", "childClass", "ChildClass"),
        ("ChildChildTest", "childChild", "ChildChildClass"),
        ("AbstractTest", "childClass", "AbstractChildClass"),
    ]
    .into_iter()
    .fold(builder, |builder, (test, field, declared)| {
        builder.class(
            ClassDescriptor::new(test)
                .default_constructor()
                .field(FieldDescriptor::new(field, declared).marker(Marker::Autowired)),
        )
    })
}

pub fn catalog() -> Arc<TypeCatalog> {
    test_classes(model_classes()).build().unwrap()
}

pub fn new_instance(catalog: &Arc<TypeCatalog>, key: &str) -> Instance {
    Instance::construct(catalog, &key.into()).unwrap()
}

pub fn context_with_instance(instance: &Instance) -> TestContext {
    TestContext::new(instance.clone())
}

/// Object stored in `field` of `instance`, panicking when the field is not an object.
pub fn object_field(instance: &Instance, field: &str) -> Instance {
    match instance.get(field).unwrap() {
        Value::Object(object) => object,
        other => panic!("{:?}.{} is not an object: {:?}", instance, field, other),
    }
}
