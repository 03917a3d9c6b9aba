use std::collections::HashMap;
use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::gateway::memory::database::{delete_row, find_row, insert_row, matches_predicate, MemoryDatabase, page_rows, single_row, update_row};

const KIND: &str = "book";

#[derive(Debug, Clone)]
pub struct MemoryBookRepository {
    database: MemoryDatabase,
}

impl MemoryBookRepository {
    pub(crate) fn new(database: MemoryDatabase) -> Self {
        Self {
            database,
        }
    }

    fn filter(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<BookEntity>> {
        self.database.read(|tables| {
            tables.books.iter()
                .filter(|b| matches_predicate(*b, predicate))
                .cloned()
                .collect()
        })
    }
}

#[async_trait]
impl Repository<BookEntity> for MemoryBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        self.database.write(|tables| insert_row(&mut tables.books, entity, KIND))
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        self.database.write(|tables| update_row(&mut tables.books, entity, KIND).map(|_| 1))
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        self.database.read(|tables| find_row(&tables.books, id))?
            .ok_or_else(|| LibraryError::not_found(format!("book not found for {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.database.write(|tables| Ok(delete_row(&mut tables.books, id)))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let records = self.filter(predicate)?;
        Ok(page_rows(records, page, page_size))
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn save(&self, entity: &BookEntity) -> LibraryResult<BookEntity> {
        self.database.write(|tables| {
            if find_row(&tables.books, entity.id.as_str()).is_some() {
                update_row(&mut tables.books, entity, KIND)
            } else {
                insert_row(&mut tables.books, entity, KIND)?;
                Ok(entity.clone())
            }
        })
    }

    async fn find_by_isbn(&self, isbn: &str) -> LibraryResult<Option<BookEntity>> {
        let predicate = HashMap::from([
            ("isbn".to_string(), isbn.to_string()),
        ]);
        single_row(self.filter(&predicate)?, "books", isbn)
    }

    async fn find_all(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        self.query(&HashMap::new(), page, page_size).await
    }

    async fn find_borrowed_by(&self, patron_key: &str) -> LibraryResult<Vec<BookEntity>> {
        let predicate = HashMap::from([
            ("borrowed_by".to_string(), patron_key.to_string()),
        ]);
        self.filter(&predicate)
    }
}
