use crate::reflect::MarkerKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MockAllError>;

#[derive(Debug, Error)]
pub enum MockAllError {
    #[error(
        "Unable to find default zero argument constructor for class [{type_name}] for usage with [{marker}]"
    )]
    MissingZeroArgConstructor {
        type_name: String,
        marker: MarkerKind,
    },

    #[error("Type is not registered in the type catalog: {type_name}")]
    UnknownType { type_name: String },

    #[error("Field '{field}' is not declared on {type_name} or any of its ancestors")]
    UnknownField { type_name: String, field: String },

    #[error("Method '{method}' is not declared on {type_name} or any of its ancestors")]
    UnknownMethod { type_name: String, method: String },

    #[error("Method '{method}' has no implementation on {type_name}")]
    AbstractMethod { type_name: String, method: String },

    #[error("Only doubles and tracking wrappers can be stubbed, {type_name} is a real instance")]
    NotADouble { type_name: String },

    #[error("No bean found: {description}")]
    BeanNotFound { description: String },

    #[error("Expected a single bean of type {type_name} but found {count}: {candidates}")]
    NoUniqueBean {
        type_name: String,
        count: usize,
        candidates: String,
    },

    #[error("Bean '{name}' is of type {actual} which is not assignable to {expected}")]
    BeanTypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MockAllError {
    pub(crate) fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }

    /// Whether the error is a setup mistake the caller has to fix, as opposed to a
    /// lookup miss that resolution recovers from.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MockAllError::BeanNotFound { .. }
                | MockAllError::NoUniqueBean { .. }
                | MockAllError::BeanTypeMismatch { .. }
        )
    }
}
