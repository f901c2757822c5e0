//! Persistence module split across logical submodules.

mod error;
mod kv;
mod shelf;

pub use error::ShelfError;
pub use kv::{data_dir, KvStore};
pub use shelf::Shelf;
