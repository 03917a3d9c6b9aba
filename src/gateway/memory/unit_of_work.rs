use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::core::library::LibraryResult;
use crate::core::repository::{TransactionManager, UnitOfWork};
use crate::gateway::memory::database::{check_version, MemoryDatabase, Row};

#[derive(Debug, Clone)]
pub(crate) struct MemoryTransactionManager {
    database: MemoryDatabase,
}

impl MemoryTransactionManager {
    pub(crate) fn new(database: MemoryDatabase) -> Self {
        Self {
            database,
        }
    }
}

impl TransactionManager for MemoryTransactionManager {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(MemoryUnitOfWork::new(self.database.clone()))
    }
}

#[derive(Debug)]
pub(crate) struct MemoryUnitOfWork {
    database: MemoryDatabase,
    books: Vec<BookEntity>,
}

impl MemoryUnitOfWork {
    fn new(database: MemoryDatabase) -> Self {
        Self {
            database,
            books: vec![],
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    // restaging a book replaces its earlier staged copy
    fn stage_book(&mut self, book: &BookEntity) {
        self.books.retain(|b| b.id != book.id);
        self.books.push(book.clone());
    }

    fn len(&self) -> usize {
        self.books.len()
    }

    async fn commit(self: Box<Self>) -> LibraryResult<usize> {
        let size = self.len();
        let MemoryUnitOfWork { database, books } = *self;
        database.write(|tables| {
            // validate everything before the first write
            let positions = books.iter()
                .map(|b| check_version(&tables.books, b, "book"))
                .collect::<LibraryResult<Vec<usize>>>()?;
            for (pos, book) in positions.into_iter().zip(books.iter()) {
                tables.books[pos] = book.bumped();
            }
            Ok(size)
        })
    }

    fn rollback(self: Box<Self>) {
        tracing::debug!(staged = self.len(), "discarding memory unit of work");
    }
}
