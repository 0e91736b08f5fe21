//! The mock-all listener
//!
//! [`MockAllListener`] replaces every injectable field of a test instance, and of
//! everything it injects, with a recording double. Fields marked `NotMocked` get a real
//! object instead: a container bean when one exists, otherwise a freshly constructed
//! instance, or a tracking wrapper when the type was listed by a `NotMocked` marker.
//!
//! Created instances are shared through the [`InstanceRegistry`], so a dependency
//! injected into several objects is the same double everywhere.

mod listener;
mod registry;

pub use listener::MockAllListener;
pub use registry::InstanceRegistry;
