//! Error types for the rthandle crate.

use thiserror::Error;

/// Result type alias for handle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by a domain constructor or factory.
///
/// Carried through [`Error::Construction`] without translation.
pub type ConstructError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for handle operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Token does not refer to the requested concrete handle type.
    #[error("invalid {0} handle")]
    InvalidHandle(String),

    /// Handle has no live instance yet.
    #[error("invalid {0} value")]
    InvalidValue(String),

    /// Mutation attempted on a constant handle.
    #[error("cannot modify constant handle")]
    ConstantHandle,

    /// The domain constructor or factory rejected the buffered parameters.
    #[error(transparent)]
    Construction(ConstructError),

    /// Token is null, zero, or already released.
    #[error("unknown handle")]
    UnknownHandle,

    /// No handle kind is registered under this name.
    #[error("unknown handle kind: {0}")]
    UnknownKind(String),

    /// Function argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The device refused to allocate past its configured limit.
    #[error("handle limit of {0} reached")]
    HandleLimit(usize),

    /// Handle code panicked behind the C ABI.
    #[error("panic: {0}")]
    Panic(String),
}

impl Error {
    /// Wrap a domain construction failure.
    pub fn construction(err: impl Into<ConstructError>) -> Self {
        Error::Construction(err.into())
    }

    /// Check if this is a type-mismatch error from typed recovery.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, Error::InvalidHandle(_))
    }

    /// Check if this is a missing-instance error from typed recovery.
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Error::InvalidValue(_))
    }

    /// Check if this is a rejected mutation of a constant handle.
    pub fn is_constant_handle(&self) -> bool {
        matches!(self, Error::ConstantHandle)
    }

    /// Check if this is a domain construction failure.
    pub fn is_construction(&self) -> bool {
        matches!(self, Error::Construction(_))
    }

    /// Check if the token was null or already released.
    pub fn is_unknown_handle(&self) -> bool {
        matches!(self, Error::UnknownHandle)
    }

    /// Check if this is a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, Error::Panic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_messages_name_the_kind() {
        assert_eq!(
            Error::InvalidHandle("sphere".into()).to_string(),
            "invalid sphere handle"
        );
        assert_eq!(
            Error::InvalidValue("light".into()).to_string(),
            "invalid light value"
        );
    }

    #[test]
    fn test_construction_is_transparent() {
        let err = Error::construction("unknown shape type: torus");
        assert!(err.is_construction());
        assert_eq!(err.to_string(), "unknown shape type: torus");
    }
}
