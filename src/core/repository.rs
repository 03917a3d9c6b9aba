use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use crate::books::domain::model::BookEntity;
use crate::core::library::{LibraryResult, PaginatedResult};

#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // create an entity
    async fn create(&self, entity: &Entity) -> LibraryResult<usize>;

    // updates an entity
    async fn update(&self, entity: &Entity) -> LibraryResult<usize>;

    // get an entity
    async fn get(&self, id: &str) -> LibraryResult<Entity>;

    // delete an entity
    async fn delete(&self, id: &str) -> LibraryResult<usize>;

    // find by predicate over the secondary index
    async fn query(&self, predicate: &HashMap::<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Entity>>;
}

/// UnitOfWork collects the writes of one logical operation and applies them together.
///
/// Each staged record is written conditionally on the `version` it was read with, so a
/// commit either applies every staged write or none of them; a stale version fails the
/// whole unit with `LibraryError::Conflict`. A loan only changes the book's `borrowed_by`,
/// so books are the only staged records.
#[async_trait]
pub(crate) trait UnitOfWork: Sync + Send {
    fn stage_book(&mut self, book: &BookEntity);

    // number of staged writes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn commit(self: Box<Self>) -> LibraryResult<usize>;

    fn rollback(self: Box<Self>);
}

pub(crate) trait TransactionManager: Sync + Send {
    fn begin(&self) -> Box<dyn UnitOfWork>;
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) enum RepositoryStore {
    DynamoDB,
    LocalDynamoDB,
    Memory,
}

impl From<String> for RepositoryStore {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "dynamodb" => RepositoryStore::DynamoDB,
            "local" | "localdynamodb" => RepositoryStore::LocalDynamoDB,
            _ => RepositoryStore::Memory,
        }
    }
}

impl Display for RepositoryStore {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RepositoryStore::DynamoDB => write!(f, "DynamoDB"),
            RepositoryStore::LocalDynamoDB => write!(f, "LocalDynamoDB"),
            RepositoryStore::Memory => write!(f, "Memory"),
        }
    }
}
