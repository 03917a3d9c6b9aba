pub mod ddb_book_repository;
pub mod memory_book_repository;

use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;


#[async_trait]
pub(crate) trait BookRepository: Repository<BookEntity> {
    // insert-or-update by identity, returns the stored record
    async fn save(&self, entity: &BookEntity) -> LibraryResult<BookEntity>;

    async fn find_by_isbn(&self, isbn: &str) -> LibraryResult<Option<BookEntity>>;

    async fn find_all(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>>;

    // books whose borrowed_by points at the given patron key
    async fn find_borrowed_by(&self, patron_key: &str) -> LibraryResult<Vec<BookEntity>>;
}
