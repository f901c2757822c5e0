//! Domain model for the bookshelf. The single `Book` type mirrors the
//! persisted JSON shape exactly and stays a light-weight data holder so the
//! store and UI layers can focus on persistence and presentation logic.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One book on the shelf. Serialized as `{"id": ..., "name": ..., "price": ...}`,
/// which is also the unit stored inside the persisted list.
pub struct Book {
    /// Opaque identifier assigned at creation time. Kept as a string because
    /// the persisted format stores it that way; the UI only ever displays it
    /// and hands it back for deletion.
    pub id: String,
    /// User-supplied title shown in the list view.
    pub name: String,
    /// User-supplied price. Stored as raw text, never parsed into a number;
    /// the shelf only requires it to be non-empty.
    pub price: String,
}

impl fmt::Display for Book {
    /// Write the book name to any formatter so the type plays nicely with
    /// Ratatui widgets that consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Book {
    /// Price line used by the list cards. Falls back to a placeholder when
    /// the stored text is blank, which can happen for lists written by other
    /// tools against the same key.
    pub fn display_price(&self) -> String {
        let trimmed = self.price.trim();
        if trimmed.is_empty() {
            "(no price)".to_string()
        } else {
            format!("{trimmed} THB")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_fields_and_order() {
        let books = vec![
            Book {
                id: "1700000000000".to_string(),
                name: "Dune".to_string(),
                price: "350".to_string(),
            },
            Book {
                id: "1700000000001".to_string(),
                name: "Foundation".to_string(),
                price: "420".to_string(),
            },
        ];

        let raw = serde_json::to_string(&books).unwrap();
        let parsed: Vec<Book> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, books);
    }

    #[test]
    fn deserializes_the_persisted_shape() {
        let raw = r#"[{"id":"1","name":"A","price":"10"}]"#;
        let parsed: Vec<Book> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "1");
        assert_eq!(parsed[0].name, "A");
        assert_eq!(parsed[0].price, "10");
    }

    #[test]
    fn display_price_handles_blank_text() {
        let book = Book {
            id: "1".to_string(),
            name: "A".to_string(),
            price: "  ".to_string(),
        };
        assert_eq!(book.display_price(), "(no price)");
    }
}
