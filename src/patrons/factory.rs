use crate::core::domain::Configuration;
use crate::gateway::factory::StoreConnection;
use crate::patrons::repository::PatronRepository;
use crate::patrons::repository::ddb_patron_repository::DDBPatronRepository;
use crate::patrons::repository::memory_patron_repository::MemoryPatronRepository;

pub(crate) fn create_patron_repository(config: &Configuration, conn: &StoreConnection) -> Box<dyn PatronRepository> {
    match conn {
        StoreConnection::DynamoDB(client) => {
            Box::new(DDBPatronRepository::new(client.clone(), config.patrons_table.as_str(), config.patrons_index().as_str()))
        }
        StoreConnection::Memory(database) => {
            Box::new(MemoryPatronRepository::new(database.clone()))
        }
    }
}
