//! Error types for scoped dependency injection

use crate::ScopeId;
use std::any::TypeId;
use thiserror::Error;

/// Errors that can occur while building scopes or resolving services
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// No binding for the interface in the resolving scope
    #[error("Service interface is not bound: {type_name}")]
    NotFound {
        type_name: &'static str,
        type_id: TypeId,
    },

    /// The `(tag, interface)` slot is already under construction on this thread
    #[error("Circular dependency detected while resolving: {type_name} (tag {tag})")]
    CircularDependency {
        type_name: &'static str,
        tag: &'static str,
    },

    /// Implicit resolution was attempted with no scope entered on this thread
    #[error("No active dependency scope")]
    NoActiveScope,

    /// A scope was destroyed while another scope sat above it on the stack
    #[error("Mismatched dependency scope stack: destroying {found} but {expected} is on top")]
    MismatchedScope { expected: ScopeId, found: ScopeId },

    /// Factory failed to create service
    #[error("Failed to create service {type_name}: {reason}")]
    CreationFailed {
        type_name: &'static str,
        reason: String,
    },

    /// The erased instance does not hold the requested interface
    #[error("Cached instance of {found} cannot be viewed as {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Resolution through a handle whose scope has been destroyed
    #[error("Dependency scope {scope} has been destroyed")]
    ScopeClosed { scope: ScopeId },

    /// A scope was constructed from an empty list of binding tables
    #[error("A scope requires at least one binding table")]
    NoBindings,

    /// Internal error
    #[error("Internal DI error: {0}")]
    Internal(String),
}

impl DiError {
    /// Create a NotFound error for an interface
    #[inline]
    pub fn not_found<I: ?Sized + 'static>() -> Self {
        Self::NotFound {
            type_name: std::any::type_name::<I>(),
            type_id: TypeId::of::<I>(),
        }
    }

    /// Create a CircularDependency error for a tagged interface
    #[inline]
    pub fn circular<T: 'static, I: ?Sized + 'static>() -> Self {
        Self::CircularDependency {
            type_name: std::any::type_name::<I>(),
            tag: std::any::type_name::<T>(),
        }
    }

    /// Create a CreationFailed error
    ///
    /// Factories use this to report their own failures through the same
    /// channel as resolution errors.
    #[inline]
    pub fn creation_failed<T: ?Sized + 'static>(reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Create a MismatchedScope error
    #[inline]
    pub fn mismatched(expected: ScopeId, found: ScopeId) -> Self {
        Self::MismatchedScope { expected, found }
    }

    /// Create a TypeMismatch error for a requested interface
    #[inline]
    pub fn type_mismatch<I: ?Sized + 'static>(found: &'static str) -> Self {
        Self::TypeMismatch {
            expected: std::any::type_name::<I>(),
            found,
        }
    }

    /// Whether this error reports an unbound interface
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error reports a construction cycle
    #[inline]
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    trait Printer {}

    #[test]
    fn test_not_found_names_interface() {
        let err = DiError::not_found::<dyn Printer>();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Printer"));
    }

    #[test]
    fn test_circular_names_tag_and_interface() {
        let err = DiError::circular::<crate::Shared, dyn Printer>();
        assert!(err.is_circular());

        let msg = err.to_string();
        assert!(msg.contains("Printer"));
        assert!(msg.contains("Shared"));
    }

    #[test]
    fn test_mismatched_display() {
        let err = DiError::mismatched(ScopeId::from_raw(2), ScopeId::from_raw(1));
        assert_eq!(
            err.to_string(),
            "Mismatched dependency scope stack: destroying scope-1 but scope-2 is on top"
        );
    }
}
