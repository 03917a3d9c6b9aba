use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::gateway::memory::database::{delete_row, find_row, insert_row, matches_predicate, MemoryDatabase, page_rows, single_row, update_row};
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::PatronRepository;

const KIND: &str = "patron";

#[derive(Debug, Clone)]
pub struct MemoryPatronRepository {
    database: MemoryDatabase,
}

impl MemoryPatronRepository {
    pub(crate) fn new(database: MemoryDatabase) -> Self {
        Self {
            database,
        }
    }
}

#[async_trait]
impl Repository<PatronEntity> for MemoryPatronRepository {
    async fn create(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        self.database.write(|tables| insert_row(&mut tables.patrons, entity, KIND))
    }

    async fn update(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        self.database.write(|tables| update_row(&mut tables.patrons, entity, KIND).map(|_| 1))
    }

    async fn get(&self, id: &str) -> LibraryResult<PatronEntity> {
        self.database.read(|tables| find_row(&tables.patrons, id))?
            .ok_or_else(|| LibraryError::not_found(format!("patron not found for {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.database.write(|tables| Ok(delete_row(&mut tables.patrons, id)))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        let records = self.database.read(|tables| {
            tables.patrons.iter()
                .filter(|p| matches_predicate(*p, predicate))
                .cloned()
                .collect::<Vec<PatronEntity>>()
        })?;
        Ok(page_rows(records, page, page_size))
    }
}

#[async_trait]
impl PatronRepository for MemoryPatronRepository {
    async fn save(&self, entity: &PatronEntity) -> LibraryResult<PatronEntity> {
        self.database.write(|tables| {
            if find_row(&tables.patrons, entity.id.as_str()).is_some() {
                update_row(&mut tables.patrons, entity, KIND)
            } else {
                insert_row(&mut tables.patrons, entity, KIND)?;
                Ok(entity.clone())
            }
        })
    }

    async fn find_by_patron_id(&self, patron_id: &str) -> LibraryResult<Option<PatronEntity>> {
        let predicate = HashMap::from([
            ("patron_id".to_string(), patron_id.to_string()),
        ]);
        let res = self.query(&predicate, None, usize::MAX).await?;
        single_row(res.records, "patrons", patron_id)
    }

    async fn find_all(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        self.query(&HashMap::new(), page, page_size).await
    }
}
