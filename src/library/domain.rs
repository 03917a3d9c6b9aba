use async_trait::async_trait;
use crate::books::dto::BookDto;
use crate::core::library::LibraryResult;
use crate::library::dto::LoanOutcome;
use crate::patrons::dto::PatronDto;

pub mod service;

/// LibraryService is the entry point for books, patrons and the loans between them.
///
/// Checkout and return report domain rejections through `LoanOutcome` rather than an error;
/// errors are kept for unknown patrons or books and for storage failures, including
/// `LibraryError::Conflict` when a concurrent loan won the race.
#[async_trait]
pub(crate) trait LibraryService: Sync + Send {
    async fn add_book(&self, title: &str, author: &str, isbn: &str) -> LibraryResult<BookDto>;
    async fn list_all_books(&self) -> LibraryResult<Vec<BookDto>>;
    async fn list_available_books(&self) -> LibraryResult<Vec<BookDto>>;
    async fn add_patron(&self, name: &str, patron_id: &str) -> LibraryResult<PatronDto>;
    async fn list_all_patrons(&self) -> LibraryResult<Vec<PatronDto>>;
    async fn check_out_book(&self, patron_id: &str, isbn: &str) -> LibraryResult<LoanOutcome>;
    async fn return_book(&self, patron_id: &str, isbn: &str) -> LibraryResult<LoanOutcome>;
}
