use aws_sdk_dynamodb::Client;
use crate::core::domain::Configuration;
use crate::core::repository::{RepositoryStore, TransactionManager};
use crate::gateway::ddb::unit_of_work::DDBTransactionManager;
use crate::gateway::memory::database::MemoryDatabase;
use crate::gateway::memory::unit_of_work::MemoryTransactionManager;
use crate::utils::ddb::{build_db_client, create_table};

// StoreConnection is the handle every repository and the transaction manager of one
// service share, so that they all see the same tables.
#[derive(Debug, Clone)]
pub(crate) enum StoreConnection {
    DynamoDB(Client),
    Memory(MemoryDatabase),
}

pub(crate) async fn connect(config: &Configuration, store: RepositoryStore) -> StoreConnection {
    match store {
        RepositoryStore::DynamoDB => {
            StoreConnection::DynamoDB(build_db_client(store).await)
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            if let Err(err) = create_table(&client, config.books_table.as_str(), "id", "isbn", "title").await {
                tracing::debug!(table = config.books_table.as_str(), "skipped table creation {}", err);
            }
            if let Err(err) = create_table(&client, config.patrons_table.as_str(), "id", "patron_id", "created_at").await {
                tracing::debug!(table = config.patrons_table.as_str(), "skipped table creation {}", err);
            }
            StoreConnection::DynamoDB(client)
        }
        RepositoryStore::Memory => {
            StoreConnection::Memory(MemoryDatabase::new())
        }
    }
}

pub(crate) fn create_transaction_manager(config: &Configuration, conn: &StoreConnection) -> Box<dyn TransactionManager> {
    match conn {
        StoreConnection::DynamoDB(client) => {
            Box::new(DDBTransactionManager::new(client.clone(), config))
        }
        StoreConnection::Memory(database) => {
            Box::new(MemoryTransactionManager::new(database.clone()))
        }
    }
}
