//! Cross-session behavior of the shelf: whatever one session persists, the
//! next session's load must see.

use bookshelf_manager::{KvStore, Shelf};
use tempfile::TempDir;

#[test]
fn books_survive_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("books.sqlite");

    let mut shelf = Shelf::load(KvStore::open_at(&db_path).unwrap()).unwrap();
    let dune = shelf.add("Dune", "350").unwrap();
    shelf.add("Foundation", "420").unwrap();
    drop(shelf);

    let mut shelf = Shelf::load(KvStore::open_at(&db_path).unwrap()).unwrap();
    assert_eq!(shelf.books().len(), 2);
    assert_eq!(shelf.books()[0].name, "Dune");
    assert_eq!(shelf.books()[1].name, "Foundation");

    shelf.remove(&dune.id).unwrap();
    drop(shelf);

    let shelf = Shelf::load(KvStore::open_at(&db_path).unwrap()).unwrap();
    assert_eq!(shelf.books().len(), 1);
    assert_eq!(shelf.books()[0].name, "Foundation");
    assert_eq!(shelf.books()[0].price, "420");
}

#[test]
fn a_fresh_database_loads_as_an_empty_shelf() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("books.sqlite");

    let shelf = Shelf::load(KvStore::open_at(&db_path).unwrap()).unwrap();
    assert!(shelf.books().is_empty());
}
