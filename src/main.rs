//! Binary entry point that glues the key-value store to the TUI. The
//! bootstrapping pipeline: point the logger at a file (the alternate screen
//! owns the terminal), open the store, hydrate the shelf, and drive the
//! Ratatui event loop until the user exits.
use bookshelf_manager::{data_dir, logging, run_app, App, KvStore, Shelf};

/// Log file name stored inside the application data directory.
const LOG_FILE_NAME: &str = "bookshelf.log";

/// Initialize persistence, load the saved book list, and launch the Ratatui
/// event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (a missing
/// home directory, an unreadable database, a corrupt book list) to the
/// terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let dir = data_dir()?;
    logging::init(&dir.join(LOG_FILE_NAME))?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "bookshelf manager starting");

    let store = KvStore::open()?;
    let shelf = Shelf::load(store)?;

    let mut app = App::new(shelf);
    run_app(&mut app)
}
