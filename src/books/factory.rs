use crate::books::repository::BookRepository;
use crate::books::repository::ddb_book_repository::DDBBookRepository;
use crate::books::repository::memory_book_repository::MemoryBookRepository;
use crate::core::domain::Configuration;
use crate::gateway::factory::StoreConnection;

pub(crate) fn create_book_repository(config: &Configuration, conn: &StoreConnection) -> Box<dyn BookRepository> {
    match conn {
        StoreConnection::DynamoDB(client) => {
            Box::new(DDBBookRepository::new(client.clone(), config.books_table.as_str(), config.books_index().as_str()))
        }
        StoreConnection::Memory(database) => {
            Box::new(MemoryBookRepository::new(database.clone()))
        }
    }
}
