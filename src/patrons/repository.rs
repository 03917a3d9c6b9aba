pub mod ddb_patron_repository;
pub mod memory_patron_repository;

use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;


#[async_trait]
pub(crate) trait PatronRepository: Repository<PatronEntity> {
    // insert-or-update by identity, returns the stored record
    async fn save(&self, entity: &PatronEntity) -> LibraryResult<PatronEntity>;

    async fn find_by_patron_id(&self, patron_id: &str) -> LibraryResult<Option<PatronEntity>>;

    async fn find_all(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>>;
}
