use super::TypeKey;
use strum_macros::{Display, EnumIter, EnumString};

/// The kinds of field marker the walker understands.
///
/// `EnumString` accepts the variant name, so configuration can list kinds as
/// `"Autowired,Resource"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum MarkerKind {
    /// Container field injection.
    Autowired,
    /// `javax`-style resource injection.
    Resource,
    /// `jakarta`-style resource injection.
    JakartaResource,
    /// The field receives a real object (or a tracking wrapper) instead of a double.
    NotMocked,
    /// Names the bean a field should be looked up by.
    Qualifier,
}

/// A marker attached to a [`FieldDescriptor`](super::FieldDescriptor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Autowired,
    Resource,
    JakartaResource,
    /// Excludes the field from doubling. Every type in `tracking_types` is realized
    /// as a tracking wrapper wherever the listener meets it afterwards.
    NotMocked { tracking_types: Vec<TypeKey> },
    Qualifier(String),
}

impl Marker {
    pub fn not_mocked() -> Self {
        Marker::NotMocked {
            tracking_types: Vec::new(),
        }
    }

    pub fn not_mocked_tracking<I, K>(types: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<TypeKey>,
    {
        Marker::NotMocked {
            tracking_types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn qualifier(name: impl Into<String>) -> Self {
        Marker::Qualifier(name.into())
    }

    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::Autowired => MarkerKind::Autowired,
            Marker::Resource => MarkerKind::Resource,
            Marker::JakartaResource => MarkerKind::JakartaResource,
            Marker::NotMocked { .. } => MarkerKind::NotMocked,
            Marker::Qualifier(_) => MarkerKind::Qualifier,
        }
    }
}
