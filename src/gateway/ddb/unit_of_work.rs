use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::TransactWriteItem;
use crate::books::domain::model::BookEntity;
use crate::books::repository::ddb_book_repository::book_update;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::{TransactionManager, UnitOfWork};

// DynamoDB caps a single write transaction at 100 items.
const MAX_TRANSACT_ITEMS: usize = 100;

#[derive(Debug, Clone)]
pub(crate) struct DDBTransactionManager {
    client: Client,
    books_table: String,
}

impl DDBTransactionManager {
    pub(crate) fn new(client: Client, config: &Configuration) -> Self {
        Self {
            client,
            books_table: config.books_table.to_string(),
        }
    }
}

impl TransactionManager for DDBTransactionManager {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(DDBUnitOfWork {
            client: self.client.clone(),
            books_table: self.books_table.to_string(),
            books: vec![],
        })
    }
}

// DDBUnitOfWork commits through TransactWriteItems; DynamoDB cancels the whole transaction
// when any version condition fails.
#[derive(Debug)]
pub(crate) struct DDBUnitOfWork {
    client: Client,
    books_table: String,
    books: Vec<BookEntity>,
}

impl DDBUnitOfWork {
    fn transact_items(&self) -> Vec<TransactWriteItem> {
        self.books.iter()
            .map(|b| TransactWriteItem::builder().update(book_update(self.books_table.as_str(), b)).build())
            .collect()
    }
}

#[async_trait]
impl UnitOfWork for DDBUnitOfWork {
    fn stage_book(&mut self, book: &BookEntity) {
        self.books.retain(|b| b.id != book.id);
        self.books.push(book.clone());
    }

    fn len(&self) -> usize {
        self.books.len()
    }

    async fn commit(self: Box<Self>) -> LibraryResult<usize> {
        let size = self.len();
        if size == 0 {
            return Ok(0);
        }
        if size > MAX_TRANSACT_ITEMS {
            return Err(LibraryError::validation(
                format!("too many staged writes {} for one transaction", size).as_str(), None));
        }
        self.client
            .transact_write_items()
            .set_transact_items(Some(self.transact_items()))
            .send()
            .await.map(|_| size).map_err(LibraryError::from)
    }

    fn rollback(self: Box<Self>) {
        tracing::debug!(staged = self.len(), "discarding ddb unit of work");
    }
}
