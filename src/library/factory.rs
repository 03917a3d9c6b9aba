use crate::books::factory::create_book_repository;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::{connect, create_transaction_manager};
use crate::library::domain::LibraryService;
use crate::library::domain::service::LibraryServiceImpl;
use crate::patrons::factory::create_patron_repository;

// repositories and the transaction manager of one service share a single store connection
pub(crate) async fn create_library_service(config: &Configuration, store: RepositoryStore) -> Box<dyn LibraryService> {
    let conn = connect(config, store).await;
    let book_repo = create_book_repository(config, &conn);
    let patron_repo = create_patron_repository(config, &conn);
    let tx_manager = create_transaction_manager(config, &conn);
    Box::new(LibraryServiceImpl::new(config, book_repo, patron_repo, tx_manager))
}
