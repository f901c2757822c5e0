//! Core library surface for the Bookshelf Manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as the integration tests can reuse the same pieces.
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

/// Convenience re-exports for the persistence layer. These are typically
/// used by `main.rs` to open the store and preload the book list.
pub use store::{data_dir, KvStore, Shelf, ShelfError};

/// The domain type that the other layers manipulate.
pub use models::Book;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
