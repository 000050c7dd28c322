//! Error classification shared by every subsystem.
//!
//! Each subsystem owns its own `thiserror` enum. The HTTP layer only needs to
//! know which class a failure belongs to, so every error type implements
//! [`Classify`] and the mapping to a status code lives in one place
//! (`http::error`).

/// Outcome class of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed input, out-of-range fields, mutually exclusive fields.
    Validation,
    /// Unknown key name.
    NotFound,
    /// Wrong password on a password-gated mutation.
    Auth,
    /// The node rejected a query or could not be reached.
    Upstream,
    /// Store, codec or runtime failure.
    Internal,
}

/// Maps an error onto its [`ErrorClass`].
pub trait Classify {
    fn class(&self) -> ErrorClass;
}
