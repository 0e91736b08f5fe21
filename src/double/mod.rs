//! Test double primitives
//!
//! The listener only ever talks to [`DoubleFactory`], so a different double library
//! can be plugged in without touching the field walker.

use crate::error::Result;
use crate::reflect::{Instance, TypeCatalog, TypeKey};
use std::sync::Arc;

/// Creates and recognizes doubles and tracking wrappers.
pub trait DoubleFactory: Send + Sync {
    /// A stand-in that records calls and answers defaults.
    fn create_double(&self, key: &TypeKey) -> Result<Instance>;

    /// A recording wrapper around a real instance built with the zero argument constructor.
    ///
    /// # Errors
    /// Fails with [`MockAllError::MissingZeroArgConstructor`](crate::MockAllError::MissingZeroArgConstructor)
    /// when the type cannot be constructed.
    fn create_tracking_wrapper(&self, key: &TypeKey) -> Result<Instance>;

    fn is_double(&self, instance: &Instance) -> bool;

    fn is_tracking_wrapper(&self, instance: &Instance) -> bool;
}

/// Default factory backed by the recording [`Instance`] kinds.
#[derive(Debug, Clone)]
pub struct RecordingDoubles {
    catalog: Arc<TypeCatalog>,
}

impl RecordingDoubles {
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self { catalog }
    }
}

impl DoubleFactory for RecordingDoubles {
    fn create_double(&self, key: &TypeKey) -> Result<Instance> {
        Instance::double(&self.catalog, key)
    }

    fn create_tracking_wrapper(&self, key: &TypeKey) -> Result<Instance> {
        Instance::tracking_wrapper(&self.catalog, key)
    }

    fn is_double(&self, instance: &Instance) -> bool {
        instance.is_double()
    }

    fn is_tracking_wrapper(&self, instance: &Instance) -> bool {
        instance.is_tracking_wrapper()
    }
}
