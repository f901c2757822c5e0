use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Internal representation of the "Add Book" form fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) name: String,
    pub(crate) price: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields available within the book form.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum BookField {
    Name,
    Price,
}

impl Default for BookField {
    fn default() -> Self {
        BookField::Name
    }
}

impl BookForm {
    /// Swap focus between the name and price fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Name => BookField::Price,
            BookField::Price => BookField::Name,
        };
    }

    /// Append a character to the active field, validating allowed input.
    /// The price field only takes digits and a single decimal point, the
    /// terminal analogue of the numeric keyboard on the add screen.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            BookField::Name => {
                if !ch.is_control() {
                    self.name.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Price => {
                if ch.is_ascii_digit() || (ch == '.' && !self.price.contains('.')) {
                    self.price.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Name => {
                self.name.pop();
            }
            BookField::Price => {
                self.price.pop();
            }
        }
    }

    /// Clear the form back to its initial state. Called after a successful
    /// save so the next book starts from a blank slate.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let (value, is_active) = match field {
            BookField::Name => (&self.name, self.active == BookField::Name),
            BookField::Price => (&self.price, self.active == BookField::Price),
        };

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Name => self.name.chars().count(),
            BookField::Price => self.price.chars().count(),
        }
    }
}

/// State for confirming the deletion of a book from the shelf.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) book: Book,
}

impl ConfirmBookDelete {
    /// Build the confirmation state from the book being considered.
    pub(crate) fn from(book: Book) -> Self {
        Self { book }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_field_only_accepts_numeric_input() {
        let mut form = BookForm::default();
        form.toggle_field();

        assert!(form.push_char('3'));
        assert!(form.push_char('5'));
        assert!(!form.push_char('x'));
        assert!(form.push_char('.'));
        assert!(!form.push_char('.'));
        assert!(form.push_char('0'));
        assert_eq!(form.price, "35.0");
    }

    #[test]
    fn reset_clears_every_field_and_focus() {
        let mut form = BookForm::default();
        form.push_char('D');
        form.toggle_field();
        form.push_char('9');
        form.error = Some("boom".to_string());

        form.reset();

        assert!(form.name.is_empty());
        assert!(form.price.is_empty());
        assert!(form.error.is_none());
        assert!(form.active == BookField::Name);
    }
}
