pub mod service;

use async_trait::async_trait;
use crate::books::domain::model::Book;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::library::dto::{LoanDto, ReturnDto};
use crate::members::domain::model::Member;
use crate::payments::PaymentProcessor;

#[async_trait]
pub trait LibraryService: Sync + Send {
    async fn add_book(&self, book: &Book) -> LibraryResult<Book>;
    async fn add_member(&self, member: &Member) -> LibraryResult<Member>;
    async fn find_book_by_id(&self, id: &str) -> LibraryResult<Book>;
    async fn find_member_by_id(&self, id: &str) -> LibraryResult<Member>;
    async fn list_books(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Book>>;
    async fn borrow_book(&self, member_id: &str, book_id: &str) -> LibraryResult<LoanDto>;
    // settles any late fee through `payment` before the book is released
    async fn return_book(&self, member_id: &str, book_id: &str,
                         payment: &dyn PaymentProcessor) -> LibraryResult<ReturnDto>;
}
