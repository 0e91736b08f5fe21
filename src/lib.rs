//! # mock-all
//!
//! A test execution listener that doubles every injected dependency of a test fixture.
//!
//! Instead of listing each dependency of the class under test, a test marks only the
//! exceptions. Every field carrying an injectable marker (`Autowired`, `Resource`,
//! `JakartaResource` by default) receives a recording double, the doubles' own
//! injectable fields are filled the same way, and instances are shared so one type
//! maps to one double across the whole object graph.
//!
//! ## Features
//!
//! - **Recursive injection**: fields of the test class, its ancestors and every injected type
//! - **Hierarchy-aware reuse**: an already registered subtype instance is reused for its supertypes
//! - **Real objects on demand**: `NotMocked` fields get container beans or constructed instances
//! - **Tracking wrappers**: types listed by `NotMocked` become recording wrappers around real objects
//! - **Pluggable seams**: [`DoubleFactory`] for the double library, [`BeanContainer`] for the container
//!
//! ## Quick Start
//!
//! ```rust
//! use mock_all::prelude::*;
//!
//! let catalog = TypeCatalog::builder()
//!     .class(ClassDescriptor::new("Repository").abstract_class().abstract_method("count", Value::Int(0)))
//!     .class(
//!         ClassDescriptor::new("UserService")
//!             .default_constructor()
//!             .field(FieldDescriptor::new("repository", "Repository").marker(Marker::Autowired)),
//!     )
//!     .class(
//!         ClassDescriptor::new("UserServiceTest")
//!             .default_constructor()
//!             .field(
//!                 FieldDescriptor::new("service", "UserService")
//!                     .marker(Marker::not_mocked_tracking(["UserService"])),
//!             ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! MockAllListener::reset_registry();
//! let test = Instance::construct(&catalog, &"UserServiceTest".into()).unwrap();
//!
//! let mut listener = MockAllListener::new(catalog);
//! listener.prepare_test_instance(&TestContext::new(test.clone())).unwrap();
//!
//! // The class under test is real but records its calls...
//! let service = test.get("service").unwrap().as_object().unwrap().clone();
//! assert!(service.is_tracking_wrapper());
//!
//! // ...and everything it depends on is a double.
//! let repository = MockAllListener::get_instance(&"Repository".into()).unwrap();
//! assert!(repository.is_double());
//! assert_eq!(service.get("repository").unwrap(), Value::Object(repository));
//! ```

pub mod config;
pub mod di;
pub mod double;
pub mod engine;
pub mod error;
pub mod listener;
pub mod reflect;

// Re-export core types
pub use config::{ConfigService, ListenerConfig};
pub use di::{ApplicationContext, ApplicationContextBuilder, BeanContainer};
pub use double::{DoubleFactory, RecordingDoubles};
pub use engine::{InstanceRegistry, MockAllListener};
pub use error::{MockAllError, Result};
pub use listener::{ListenerChain, TestContext, TestExecutionListener};

/// Prelude module for convenient imports
///
/// ```
/// use mock_all::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigService, ListenerConfig};
    pub use crate::di::{ApplicationContext, ApplicationContextBuilder, BeanContainer};
    pub use crate::double::{DoubleFactory, RecordingDoubles};
    pub use crate::engine::{InstanceRegistry, MockAllListener};
    pub use crate::error::{MockAllError, Result};
    pub use crate::listener::{ListenerChain, TestContext, TestExecutionListener};
    pub use crate::reflect::{
        ClassDescriptor, FieldDescriptor, Instance, InstanceKind, Invocation, Marker, MarkerKind,
        TypeCatalog, TypeCatalogBuilder, TypeKey, Value,
    };
}
