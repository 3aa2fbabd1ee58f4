//! Error type for locator-based queue operations
//!
//! All variants signal caller mistakes. Operations that merely find nothing
//! to do (find/delete on an empty queue) return `None` instead of an error.

use std::fmt;

/// Error raised by operations that take a [`Locator`](crate::Locator)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepqError {
    /// The locator is attached to a different queue, or its recorded slot
    /// no longer refers back to it
    WrongLocator,
    /// `insert_locator` was called with a locator that is already attached
    /// to a queue
    AlreadyAttached,
    /// A queue operation that requires an attached locator was called with
    /// a detached one
    NotAttached,
}

impl fmt::Display for DepqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepqError::WrongLocator => {
                write!(f, "locator does not belong to this queue")
            }
            DepqError::AlreadyAttached => {
                write!(f, "locator is already attached to a queue")
            }
            DepqError::NotAttached => {
                write!(f, "locator is not attached to a queue")
            }
        }
    }
}

impl std::error::Error for DepqError {}
