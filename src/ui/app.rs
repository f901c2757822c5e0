use std::cmp::min;
use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::models::Book;
use crate::store::Shelf;

use super::forms::{BookField, BookForm, ConfirmBookDelete};
use super::helpers::{centered_rect, surface_error};

/// Height of the tab bar at the top of every screen.
const TAB_BAR_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height allocation per book card in the home list.
const BOOK_CARD_HEIGHT: u16 = 5;
/// Titles shown in the tab bar, in screen order.
const TAB_TITLES: [&str; 2] = ["Home", "Add Book"];

/// High-level navigation states, one per tab. Keeping this explicit makes it
/// easy to reason about which rendering path runs and what keyboard
/// shortcuts should do.
enum Screen {
    Home,
    Add,
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    ConfirmDelete(ConfirmBookDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Owns the shelf (and
/// through it the store handle), so every screen works against the same
/// snapshot of the book list.
pub struct App {
    shelf: Shelf,
    screen: Screen,
    mode: Mode,
    add_form: BookForm,
    selected: usize,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(shelf: Shelf) -> Self {
        Self {
            shelf,
            screen: Screen::Home,
            mode: Mode::Normal,
            add_form: BookForm::default(),
            selected: 0,
            status: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Home => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Up => self.move_selection(-1),
                    KeyCode::Down => self.move_selection(1),
                    KeyCode::PageUp => self.move_selection(-5),
                    KeyCode::PageDown => self.move_selection(5),
                    KeyCode::Home => self.select_first(),
                    KeyCode::End => self.select_last(),
                    KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => {
                        self.clear_status();
                        self.screen = Screen::Add;
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.refresh_books();
                    }
                    KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Char('D')
                    | KeyCode::Delete => {
                        if let Some(book) = self.current_book().cloned() {
                            self.clear_status();
                            return Ok(Mode::ConfirmDelete(ConfirmBookDelete::from(book)));
                        } else {
                            self.set_status("No book selected to remove.", StatusKind::Error);
                        }
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Add => {
                match code {
                    KeyCode::Esc => {
                        self.clear_status();
                        self.screen = Screen::Home;
                    }
                    KeyCode::Tab | KeyCode::BackTab => self.add_form.toggle_field(),
                    KeyCode::Backspace => self.add_form.backspace(),
                    KeyCode::Enter => self.submit_book(),
                    KeyCode::Char(ch) => {
                        if self.add_form.push_char(ch) {
                            self.add_form.error = None;
                        }
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmBookDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.shelf.remove(&confirm.book.id) {
                    Ok(()) => {
                        self.ensure_selected_in_bounds();
                        self.set_status(
                            format!("Removed {}.", confirm.book.name),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        warn!(error = %err, "removing book failed");
                        let err = anyhow::Error::new(err);
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Run the form contents through the shelf. On success the form resets so
    /// the next book starts blank; on failure the input is preserved so the
    /// user can fix it and retry.
    fn submit_book(&mut self) {
        match self.shelf.add(&self.add_form.name, &self.add_form.price) {
            Ok(book) => {
                self.add_form.reset();
                self.select_last();
                self.set_status(format!("Saved {}.", book.name), StatusKind::Info);
            }
            Err(err) => {
                warn!(error = %err, "saving book failed");
                let err = anyhow::Error::new(err);
                let message = surface_error(&err);
                self.add_form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    /// Re-read the list from the store, the terminal stand-in for the pull
    /// gesture. Storage problems land in the footer instead of aborting the
    /// application.
    fn refresh_books(&mut self) {
        match self.shelf.reload() {
            Ok(()) => {
                self.ensure_selected_in_bounds();
                let count = self.shelf.books().len();
                self.set_status(
                    format!("Book list refreshed ({count} saved)."),
                    StatusKind::Info,
                );
            }
            Err(err) => {
                warn!(error = %err, "refreshing book list failed");
                let err = anyhow::Error::new(err);
                self.set_status(surface_error(&err), StatusKind::Error);
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tab_bar(frame, chunks[0]);

        match self.screen {
            Screen::Home => self.draw_home(frame, chunks[1]),
            Screen::Add => self.draw_add_form(frame, chunks[1]),
        }

        self.draw_footer(frame, chunks[2]);

        if let Mode::ConfirmDelete(confirm) = &self.mode {
            self.draw_confirm_delete(frame, area, confirm);
        }
    }

    fn draw_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let selected = match self.screen {
            Screen::Home => 0,
            Screen::Add => 1,
        };
        let tabs = Tabs::new(TAB_TITLES.to_vec())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Bookshelf Manager"),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .select(selected);
        frame.render_widget(tabs, area);
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let count = self.shelf.books().len();
        let summary = if count == 1 {
            "1 book saved".to_string()
        } else {
            format!("{count} books saved")
        };
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                "My Bookshelf",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::raw(summary)),
        ])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        if self.shelf.books().is_empty() {
            let message = Paragraph::new(vec![
                Line::from("No books on the shelf yet."),
                Line::from("Press [a] to add one or [r] to refresh."),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        self.render_book_cards(frame, chunks[1], self.shelf.books(), self.selected);
    }

    fn render_book_cards(&self, frame: &mut Frame, area: Rect, books: &[Book], selected: usize) {
        if books.is_empty() || area.height == 0 {
            return;
        }

        let card_height = BOOK_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = books.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(BOOK_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            if chunk.height == 0 {
                continue;
            }

            let book_index = start + idx;
            if book_index >= len {
                break;
            }

            let book = &books[book_index];
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if book_index == selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let name = if book_index == selected {
                format!("▶ {}", book.name)
            } else {
                book.name.clone()
            };
            let lines = vec![
                Line::from(Span::styled(
                    name,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("ID: {}", book.id),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    book.display_price(),
                    Style::default().fg(Color::Green),
                )),
            ];

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left)
                .style(paragraph_style);

            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_add_form(&self, frame: &mut Frame, area: Rect) {
        let form = &self.add_form;
        let popup_area = centered_rect(60, 50, area);

        let block = Block::default().title("Add a Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let name_line = form.build_line("Name", BookField::Name);
        let price_line = form.build_line("Price", BookField::Price);

        let mut lines = vec![name_line, price_line, Line::from("")];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc for Home",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (cursor_x, cursor_y) = match form.active {
            BookField::Name => {
                let prefix = "Name: ".len() as u16;
                (
                    inner.x + prefix + form.value_len(BookField::Name) as u16,
                    inner.y,
                )
            }
            BookField::Price => {
                let prefix = "Price: ".len() as u16;
                (
                    inner.x + prefix + form.value_len(BookField::Price) as u16,
                    inner.y + 1,
                )
            }
        };
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove '{}'?", confirm.book.name)),
            Line::from("The book will be deleted from the shelf."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::ConfirmDelete(_)) => Line::from(vec![
                Span::styled("[y]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[n/Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (Screen::Home, _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[a]", key_style),
                Span::raw(" Add Book   "),
                Span::styled("[r]", key_style),
                Span::raw(" Refresh   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Add, _) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Switch Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Home"),
            ]),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn current_book(&self) -> Option<&Book> {
        self.shelf.books().get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.shelf.books().len();
        if len == 0 {
            return;
        }
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len as isize {
            new = len as isize - 1;
        }
        self.selected = new as usize;
    }

    fn select_first(&mut self) {
        self.selected = 0;
    }

    fn select_last(&mut self) {
        self.selected = self.shelf.books().len().saturating_sub(1);
    }

    fn ensure_selected_in_bounds(&mut self) {
        let len = self.shelf.books().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}
