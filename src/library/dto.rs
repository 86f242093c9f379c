use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::books::domain::model::Book;
use crate::utils::date::serializer;

// LoanDto describes a book that was handed out to a member.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LoanDto {
    pub branch_id: String,
    pub book_id: String,
    pub member_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    #[serde(with = "serializer")]
    pub borrowed_at: NaiveDateTime,
}

impl LoanDto {
    pub fn new(branch_id: &str, member_id: &str, book: &Book, due_date: NaiveDate) -> Self {
        Self {
            branch_id: branch_id.to_string(),
            book_id: book.book_id.to_string(),
            member_id: member_id.to_string(),
            title: book.title.to_string(),
            due_date,
            borrowed_at: Utc::now().naive_utc(),
        }
    }
}

// ReturnDto describes a closed loan and the late fee settled for it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ReturnDto {
    pub branch_id: String,
    pub book_id: String,
    pub member_id: String,
    pub late_fee: f64,
    pub paid_with: Option<String>,
    #[serde(with = "serializer")]
    pub returned_at: NaiveDateTime,
}

impl ReturnDto {
    pub fn new(branch_id: &str, member_id: &str, book_id: &str, late_fee: f64, paid_with: Option<String>) -> Self {
        Self {
            branch_id: branch_id.to_string(),
            book_id: book_id.to_string(),
            member_id: member_id.to_string(),
            late_fee,
            paid_with,
            returned_at: Utc::now().naive_utc(),
        }
    }
}
