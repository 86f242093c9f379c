use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::Book;
use crate::core::domain::Identifiable;

// Member abstracts a library member. Borrowed books are tracked by book_id; the book itself
// records the member_id of its borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: String,
    pub version: i64,
    pub name: String,
    borrowed_books: Vec<String>,
}

impl Member {
    pub fn new(member_id: &str, name: &str) -> Self {
        Self {
            member_id: member_id.to_string(),
            version: 0,
            name: name.to_string(),
            borrowed_books: vec![],
        }
    }

    pub fn get_borrowed_books(&self) -> Vec<String> {
        self.borrowed_books.clone()
    }

    pub fn has_borrowed(&self, book_id: &str) -> bool {
        self.borrowed_books.iter().any(|id| id == book_id)
    }

    pub fn borrow_book(&mut self, book: &mut Book, due_date: NaiveDate) -> bool {
        if book.borrow(self.member_id.as_str(), due_date) {
            self.borrowed_books.push(book.book_id.to_string());
            return true;
        }
        false
    }

    pub fn return_book(&mut self, book: &mut Book) -> bool {
        if !self.has_borrowed(book.book_id.as_str()) || book.borrower() != Some(self.member_id.as_str()) {
            return false;
        }
        if book.return_book() {
            self.borrowed_books.retain(|id| *id != book.book_id);
            return true;
        }
        false
    }
}

impl Identifiable for Member {
    fn id(&self) -> String {
        self.member_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}
