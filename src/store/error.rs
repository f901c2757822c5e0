use thiserror::Error;

/// Everything that can go wrong between the shelf and its store.
///
/// The variants separate "the user gave us nothing to save" from the three
/// storage failures (read, decode, write) so the UI can report each one
/// accurately instead of collapsing them into an empty list.
#[derive(Debug, Error)]
pub enum ShelfError {
    /// A required form field was empty after trimming. No state changed and
    /// nothing was written.
    #[error("{field} is required.")]
    EmptyField { field: &'static str },

    /// The underlying store failed while reading the book list key.
    #[error("failed to read the book list from the store")]
    Read(#[source] rusqlite::Error),

    /// The stored value exists but does not decode as a list of books. The
    /// payload is left untouched; there is no partial parse.
    #[error("the stored book list is corrupt")]
    Corrupt(#[source] serde_json::Error),

    /// The in-memory list could not be serialized before writing.
    #[error("failed to serialize the book list")]
    Encode(#[source] serde_json::Error),

    /// The underlying store failed while writing the book list key. The
    /// in-memory list is unchanged when this is returned.
    #[error("failed to write the book list to the store")]
    Write(#[source] rusqlite::Error),
}
