use std::fmt;
use std::fmt::{Display, Formatter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::BookStatus;
use crate::utils::date::today;

// BookKind carries the variant specific attribute of a book and decides its daily late fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BookKind {
    General,
    EBook { file_format: String },
    PrintedBook { page_count: i32 },
}

impl BookKind {
    pub fn late_fee_per_day(&self) -> f64 {
        match self {
            BookKind::General => 0.50,
            BookKind::EBook { .. } => 0.25,
            BookKind::PrintedBook { .. } => 0.75,
        }
    }
}

// Loan is the borrow state of a book; borrower and due date are only ever set together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub borrower: String,
    pub due_date: NaiveDate,
}

// Book abstracts a single copy in the catalog. The same isbn can exist many times with
// different book_id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: String,
    pub version: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub kind: BookKind,
    loan: Option<Loan>,
}

impl Book {
    pub fn new(title: &str, author: &str, isbn: &str, publication_year: i32) -> Self {
        Self::with_kind(title, author, isbn, publication_year, BookKind::General)
    }

    pub fn ebook(title: &str, author: &str, isbn: &str, publication_year: i32, file_format: &str) -> Self {
        Self::with_kind(title, author, isbn, publication_year,
                        BookKind::EBook { file_format: file_format.to_string() })
    }

    pub fn printed(title: &str, author: &str, isbn: &str, publication_year: i32, page_count: i32) -> Self {
        Self::with_kind(title, author, isbn, publication_year, BookKind::PrintedBook { page_count })
    }

    pub fn with_kind(title: &str, author: &str, isbn: &str, publication_year: i32, kind: BookKind) -> Self {
        Self {
            book_id: Uuid::new_v4().to_string(),
            version: 0,
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            publication_year,
            kind,
            loan: None,
        }
    }

    pub fn is_borrowed(&self) -> bool {
        self.loan.is_some()
    }

    pub fn borrower(&self) -> Option<&str> {
        self.loan.as_ref().map(|l| l.borrower.as_str())
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.loan.as_ref().map(|l| l.due_date)
    }

    pub fn status(&self) -> BookStatus {
        if self.is_borrowed() { BookStatus::Borrowed } else { BookStatus::Available }
    }

    pub fn borrow(&mut self, borrower: &str, due_date: NaiveDate) -> bool {
        if self.loan.is_some() {
            return false;
        }
        self.loan = Some(Loan { borrower: borrower.to_string(), due_date });
        true
    }

    pub fn return_book(&mut self) -> bool {
        self.loan.take().is_some()
    }

    /// Late fee owed as of the local date. Calls on different days can return different amounts.
    pub fn calculate_late_fee(&self) -> f64 {
        self.calculate_late_fee_at(today())
    }

    /// Late fee owed as of `today`: nothing until the day after the due date, then the
    /// variant's daily rate for every day past it.
    pub fn calculate_late_fee_at(&self, today: NaiveDate) -> f64 {
        match &self.loan {
            Some(loan) if today > loan.due_date => {
                let days_late = (today - loan.due_date).num_days();
                days_late as f64 * self.kind.late_fee_per_day()
            }
            _ => 0.0,
        }
    }
}

impl Identifiable for Book {
    fn id(&self) -> String {
        self.book_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' by {} (ISBN: {}, Year: {}) - Status: {}",
               self.title, self.author, self.isbn, self.publication_year, self.status())?;
        if let Some(loan) = &self.loan {
            write!(f, ", Due: {}", loan.due_date)?;
        }
        match &self.kind {
            BookKind::General => Ok(()),
            BookKind::EBook { file_format } => write!(f, ", Format: {}", file_format),
            BookKind::PrintedBook { page_count } => write!(f, ", Pages: {}", page_count),
        }
    }
}
