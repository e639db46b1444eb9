use std::error;
use std::fmt;
use std::result;

/// Errors reported by the detached traversal cursors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The tree was structurally modified after the cursor was created or after the cursor's last
    /// successful removal. Obtain a fresh cursor to continue.
    ConcurrentModification,
    /// `remove` was called before any element was produced, or twice for the same element.
    IllegalState,
    /// `next` was called on an exhausted cursor.
    NoSuchElement,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConcurrentModification => {
                write!(f, "tree was modified outside of the cursor")
            },
            Error::IllegalState => write!(f, "no element is available for removal"),
            Error::NoSuchElement => write!(f, "cursor is exhausted"),
        }
    }
}

/// Convenience `Result` type for cursor operations.
pub type Result<T> = result::Result<T, Error>;
