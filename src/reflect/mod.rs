//! Runtime type model
//!
//! Rust erases the information a field walker needs (ancestors, declared fields,
//! field markers, constructors), so fixtures describe their classes up front in a
//! [`TypeCatalog`]. Objects created from that catalog are [`Instance`] handles whose
//! field storage can be written from the outside, which is what injection needs.
//!
//! ```rust
//! use mock_all::reflect::{ClassDescriptor, FieldDescriptor, Marker, TypeCatalog};
//!
//! let catalog = TypeCatalog::builder()
//!     .class(ClassDescriptor::new("Properties").default_constructor())
//!     .class(
//!         ClassDescriptor::new("BaseClass")
//!             .default_constructor()
//!             .field(FieldDescriptor::new("properties", "Properties").marker(Marker::Autowired)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert!(catalog.contains(&"BaseClass".into()));
//! ```

mod catalog;
mod class;
mod instance;
mod marker;
mod type_key;
mod value;

pub use catalog::{TypeCatalog, TypeCatalogBuilder};
pub use class::{ClassDescriptor, Constructor, FieldDescriptor, MethodDescriptor, MethodFn};
pub use instance::{Instance, InstanceKind, Invocation};
pub use marker::{Marker, MarkerKind};
pub use type_key::TypeKey;
pub use value::Value;
