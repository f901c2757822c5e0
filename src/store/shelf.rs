use chrono::Utc;
use tracing::debug;

use crate::models::Book;

use super::error::ShelfError;
use super::kv::KvStore;

/// Store key holding the serialized book list. Every reader and writer of
/// the list goes through this one key.
const BOOKS_KEY: &str = "book";

/// The book list manager: owns the store handle and the current in-memory
/// snapshot of the list.
///
/// The whole list is the unit of persistence. Each mutation serializes the
/// full sequence and writes it back under [`BOOKS_KEY`]; the snapshot is
/// only updated after the write succeeds, so it never reflects data that
/// failed to persist.
#[derive(Debug)]
pub struct Shelf {
    store: KvStore,
    books: Vec<Book>,
    /// Highest numeric id issued or observed so far. Ids are millisecond
    /// timestamps; this lets two adds inside the same millisecond still get
    /// distinct ids.
    last_id: i64,
}

impl Shelf {
    /// Read the current list from the store and build a shelf around it.
    ///
    /// An absent key is the valid initial state and yields an empty list.
    /// A value that fails to decode, or a failing read, is surfaced as an
    /// error rather than silently treated as empty.
    pub fn load(store: KvStore) -> Result<Self, ShelfError> {
        let books = read_books(&store)?;
        let last_id = highest_numeric_id(&books);
        Ok(Self {
            store,
            books,
            last_id,
        })
    }

    /// Re-read the list from the store, replacing the snapshot. Backs the
    /// refresh gesture so edits made by another process become visible.
    pub fn reload(&mut self) -> Result<(), ShelfError> {
        self.books = read_books(&self.store)?;
        self.last_id = self.last_id.max(highest_numeric_id(&self.books));
        Ok(())
    }

    /// Validate the inputs, append a new book, and persist the grown list.
    ///
    /// Rejects without touching anything when either field trims to empty.
    /// On a write failure the snapshot is left unchanged, so the caller can
    /// retry the same submission. Returns the created book so the UI can
    /// report it and reset its form.
    pub fn add(&mut self, name: &str, price: &str) -> Result<Book, ShelfError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ShelfError::EmptyField { field: "Book name" });
        }
        let price = price.trim();
        if price.is_empty() {
            return Err(ShelfError::EmptyField { field: "Price" });
        }

        let book = Book {
            id: self.next_id(),
            name: name.to_string(),
            price: price.to_string(),
        };

        let mut updated = self.books.clone();
        updated.push(book.clone());
        self.persist(&updated)?;
        self.books = updated;
        Ok(book)
    }

    /// Drop every book whose id matches and persist the result.
    ///
    /// Filter semantics: an unknown id leaves the list unchanged, but the
    /// (identical) serialized list is still written so the store always
    /// matches the snapshot after the call.
    pub fn remove(&mut self, id: &str) -> Result<(), ShelfError> {
        let updated: Vec<Book> = self
            .books
            .iter()
            .filter(|book| book.id != id)
            .cloned()
            .collect();
        self.persist(&updated)?;
        self.books = updated;
        Ok(())
    }

    /// The current snapshot, in insertion order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Serialize `books` and write it under the list key. The snapshot is
    /// not touched here; callers commit only after this returns `Ok`.
    fn persist(&self, books: &[Book]) -> Result<(), ShelfError> {
        let raw = serde_json::to_string(books).map_err(ShelfError::Encode)?;
        self.store
            .set(BOOKS_KEY, &raw)
            .map_err(ShelfError::Write)?;
        debug!(count = books.len(), "persisted book list");
        Ok(())
    }

    /// Issue a fresh id: the current Unix time in milliseconds, bumped past
    /// the last issued id when two calls land in the same millisecond.
    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        let id = if now > self.last_id {
            now
        } else {
            self.last_id + 1
        };
        self.last_id = id;
        id.to_string()
    }
}

/// Fetch and decode the persisted list. Shared by the initial load and by
/// reloads.
fn read_books(store: &KvStore) -> Result<Vec<Book>, ShelfError> {
    match store.get(BOOKS_KEY).map_err(ShelfError::Read)? {
        Some(raw) => {
            let books: Vec<Book> = serde_json::from_str(&raw).map_err(ShelfError::Corrupt)?;
            debug!(count = books.len(), "loaded book list");
            Ok(books)
        }
        None => {
            debug!("no stored book list; starting empty");
            Ok(Vec::new())
        }
    }
}

/// Largest id that parses as a number, or zero for an empty or non-numeric
/// list. Seeds the same-millisecond guard in [`Shelf::next_id`].
fn highest_numeric_id(books: &[Book]) -> i64 {
    books
        .iter()
        .filter_map(|book| book.id.parse::<i64>().ok())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_shelf() -> Shelf {
        Shelf::load(KvStore::open_in_memory().unwrap()).unwrap()
    }

    fn persisted(shelf: &Shelf) -> Option<String> {
        shelf.store.get(BOOKS_KEY).unwrap()
    }

    #[test]
    fn load_on_absent_store_yields_empty_list() {
        let shelf = empty_shelf();
        assert!(shelf.books().is_empty());
    }

    #[test]
    fn load_reads_an_existing_list() {
        let store = KvStore::open_in_memory().unwrap();
        store
            .set(BOOKS_KEY, r#"[{"id":"1","name":"A","price":"10"}]"#)
            .unwrap();

        let shelf = Shelf::load(store).unwrap();
        assert_eq!(shelf.books().len(), 1);
        assert_eq!(shelf.books()[0].id, "1");
        assert_eq!(shelf.books()[0].name, "A");
        assert_eq!(shelf.books()[0].price, "10");
    }

    #[test]
    fn load_surfaces_corrupt_data_instead_of_an_empty_list() {
        let store = KvStore::open_in_memory().unwrap();
        store.set(BOOKS_KEY, "not json").unwrap();

        let err = Shelf::load(store).unwrap_err();
        assert!(matches!(err, ShelfError::Corrupt(_)));
    }

    #[test]
    fn add_appends_and_persists_the_full_list() {
        let mut shelf = empty_shelf();
        let book = shelf.add("Dune", "350").unwrap();

        assert_eq!(shelf.books().len(), 1);
        assert_eq!(shelf.books()[0], book);

        let raw = persisted(&shelf).expect("list should be written");
        assert_eq!(raw, serde_json::to_string(shelf.books()).unwrap());
    }

    #[test]
    fn add_trims_name_and_price() {
        let mut shelf = empty_shelf();
        let book = shelf.add("  Dune  ", " 350 ").unwrap();
        assert_eq!(book.name, "Dune");
        assert_eq!(book.price, "350");
    }

    #[test]
    fn add_rejects_blank_fields_without_writing() {
        let mut shelf = empty_shelf();

        for (name, price) in [("", "10"), ("   ", "10"), ("Dune", ""), ("Dune", "  ")] {
            let err = shelf.add(name, price).unwrap_err();
            assert!(matches!(err, ShelfError::EmptyField { .. }));
        }

        assert!(shelf.books().is_empty());
        assert_eq!(persisted(&shelf), None);
    }

    #[test]
    fn every_mutation_keeps_store_equal_to_snapshot() {
        let mut shelf = empty_shelf();

        let dune = shelf.add("Dune", "350").unwrap();
        assert_eq!(
            persisted(&shelf).unwrap(),
            serde_json::to_string(shelf.books()).unwrap()
        );

        shelf.add("Foundation", "420").unwrap();
        assert_eq!(
            persisted(&shelf).unwrap(),
            serde_json::to_string(shelf.books()).unwrap()
        );

        shelf.remove(&dune.id).unwrap();
        assert_eq!(
            persisted(&shelf).unwrap(),
            serde_json::to_string(shelf.books()).unwrap()
        );
    }

    #[test]
    fn remove_filters_by_id() {
        let mut shelf = empty_shelf();
        let dune = shelf.add("Dune", "350").unwrap();
        shelf.add("Foundation", "420").unwrap();

        shelf.remove(&dune.id).unwrap();

        assert_eq!(shelf.books().len(), 1);
        assert_eq!(shelf.books()[0].name, "Foundation");
        assert_eq!(shelf.books()[0].price, "420");
    }

    #[test]
    fn remove_of_unknown_id_still_writes_the_unchanged_list() {
        let mut shelf = empty_shelf();
        shelf.add("Dune", "350").unwrap();
        let before = shelf.books().to_vec();

        shelf.remove("no-such-id").unwrap();

        assert_eq!(shelf.books(), before.as_slice());
        assert_eq!(
            persisted(&shelf).unwrap(),
            serde_json::to_string(&before).unwrap()
        );
    }

    #[test]
    fn rapid_adds_get_distinct_increasing_ids() {
        let mut shelf = empty_shelf();
        let a = shelf.add("A", "1").unwrap();
        let b = shelf.add("B", "2").unwrap();
        let c = shelf.add("C", "3").unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert!(b.id.parse::<i64>().unwrap() > a.id.parse::<i64>().unwrap());
        assert!(c.id.parse::<i64>().unwrap() > b.id.parse::<i64>().unwrap());
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let mut shelf = empty_shelf();
        shelf.add("Dune", "350").unwrap();

        shelf
            .store
            .set(BOOKS_KEY, r#"[{"id":"9","name":"Hyperion","price":"299"}]"#)
            .unwrap();
        shelf.reload().unwrap();

        assert_eq!(shelf.books().len(), 1);
        assert_eq!(shelf.books()[0].name, "Hyperion");
    }

    #[test]
    fn reload_surfaces_corrupt_data() {
        let mut shelf = empty_shelf();
        shelf.add("Dune", "350").unwrap();
        shelf.store.set(BOOKS_KEY, "{broken").unwrap();

        let err = shelf.reload().unwrap_err();
        assert!(matches!(err, ShelfError::Corrupt(_)));
    }
}
