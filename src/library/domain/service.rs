use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::{TransactionManager, UnitOfWork};
use crate::library::domain::LibraryService;
use crate::library::dto::LoanOutcome;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::dto::PatronDto;
use crate::patrons::repository::PatronRepository;

pub(crate) struct LibraryServiceImpl {
    branch_id: String,
    page_size: usize,
    book_repository: Box<dyn BookRepository>,
    patron_repository: Box<dyn PatronRepository>,
    tx_manager: Box<dyn TransactionManager>,
}

impl LibraryServiceImpl {
    pub(crate) fn new(config: &Configuration, book_repository: Box<dyn BookRepository>,
                      patron_repository: Box<dyn PatronRepository>,
                      tx_manager: Box<dyn TransactionManager>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            page_size: config.page_size,
            book_repository,
            patron_repository,
            tx_manager,
        }
    }

    async fn all_books(&self) -> LibraryResult<Vec<BookEntity>> {
        let mut books = vec![];
        let mut page: Option<String> = None;
        loop {
            let res = self.book_repository.find_all(page.as_deref(), self.page_size).await?;
            books.extend(res.records);
            match res.next_page {
                Some(next) => page = Some(next),
                None => break,
            }
        }
        Ok(books)
    }

    async fn all_patrons(&self) -> LibraryResult<Vec<PatronEntity>> {
        let mut patrons = vec![];
        let mut page: Option<String> = None;
        loop {
            let res = self.patron_repository.find_all(page.as_deref(), self.page_size).await?;
            patrons.extend(res.records);
            match res.next_page {
                Some(next) => page = Some(next),
                None => break,
            }
        }
        Ok(patrons)
    }

    async fn load_patron(&self, patron_id: &str) -> LibraryResult<PatronDto> {
        let patron = self.patron_repository.find_by_patron_id(patron_id).await?
            .ok_or_else(|| LibraryError::patron_not_found(patron_id))?;
        let borrowed = self.book_repository.find_borrowed_by(patron.id.as_str()).await?;
        Ok(PatronDto::from_entity(&patron, &borrowed))
    }

    async fn load_book(&self, isbn: &str) -> LibraryResult<BookDto> {
        self.book_repository.find_by_isbn(isbn).await?
            .map(|b| BookDto::from(&b))
            .ok_or_else(|| LibraryError::book_not_found(isbn))
    }

    async fn check_out_within(&self, uow: &mut dyn UnitOfWork,
                              patron_id: &str, isbn: &str) -> LibraryResult<LoanOutcome> {
        let mut patron = self.load_patron(patron_id).await?;
        let mut book = self.load_book(isbn).await?;
        if !book.available {
            return Ok(LoanOutcome::AlreadyCheckedOut);
        }
        patron.borrow(&mut book);
        uow.stage_book(&BookEntity::from(&book));
        Ok(LoanOutcome::CheckedOut {
            patron_id: patron.patron_id,
            patron_name: patron.name,
            isbn: book.isbn,
            title: book.title,
        })
    }

    async fn return_within(&self, uow: &mut dyn UnitOfWork,
                           patron_id: &str, isbn: &str) -> LibraryResult<LoanOutcome> {
        let mut patron = self.load_patron(patron_id).await?;
        let mut book = self.load_book(isbn).await?;
        if !patron.has_borrowed(&book) {
            return Ok(LoanOutcome::NotBorrowedByThisPatron);
        }
        patron.unborrow(&mut book);
        uow.stage_book(&BookEntity::from(&book));
        Ok(LoanOutcome::Returned {
            patron_id: patron.patron_id,
            patron_name: patron.name,
            isbn: book.isbn,
            title: book.title,
        })
    }

    // commits the staged writes of a successful outcome and discards them otherwise
    async fn finish(&self, uow: Box<dyn UnitOfWork>,
                    res: LibraryResult<LoanOutcome>) -> LibraryResult<LoanOutcome> {
        match res {
            Ok(outcome) if outcome.is_success() => {
                uow.commit().await?;
                tracing::info!(branch_id = self.branch_id.as_str(), "{}", outcome.message());
                Ok(outcome)
            }
            Ok(outcome) => {
                uow.rollback();
                tracing::info!(branch_id = self.branch_id.as_str(), "{}", outcome.message());
                Ok(outcome)
            }
            Err(err) => {
                uow.rollback();
                tracing::warn!(branch_id = self.branch_id.as_str(), "loan failed {}", err);
                Err(err)
            }
        }
    }
}

fn require(field: &str, value: &str) -> LibraryResult<()> {
    if value.trim().is_empty() {
        return Err(LibraryError::validation(
            format!("{} must not be blank", field).as_str(), Some("400".to_string())));
    }
    Ok(())
}

#[async_trait]
impl LibraryService for LibraryServiceImpl {
    async fn add_book(&self, title: &str, author: &str, isbn: &str) -> LibraryResult<BookDto> {
        require("title", title)?;
        require("author", author)?;
        require("isbn", isbn)?;
        let saved = self.book_repository.save(&BookEntity::new(title, author, isbn)).await?;
        tracing::info!(branch_id = self.branch_id.as_str(), isbn, "added book {}", saved.id);
        Ok(BookDto::from(&saved))
    }

    async fn list_all_books(&self) -> LibraryResult<Vec<BookDto>> {
        let books = self.all_books().await?;
        Ok(books.iter().map(BookDto::from).collect())
    }

    async fn list_available_books(&self) -> LibraryResult<Vec<BookDto>> {
        let books = self.list_all_books().await?;
        Ok(books.into_iter().filter(|b| b.available).collect())
    }

    async fn add_patron(&self, name: &str, patron_id: &str) -> LibraryResult<PatronDto> {
        require("name", name)?;
        require("patron_id", patron_id)?;
        let saved = self.patron_repository.save(&PatronEntity::new(name, patron_id)).await?;
        tracing::info!(branch_id = self.branch_id.as_str(), patron_id, "added patron {}", saved.id);
        Ok(PatronDto::from_entity(&saved, &[]))
    }

    async fn list_all_patrons(&self) -> LibraryResult<Vec<PatronDto>> {
        let patrons = self.all_patrons().await?;
        let borrowed: Vec<BookEntity> = self.all_books().await?
            .into_iter().filter(|b| b.borrowed_by.is_some()).collect();
        Ok(patrons.iter().map(|p| PatronDto::from_entity(p, &borrowed)).collect())
    }

    async fn check_out_book(&self, patron_id: &str, isbn: &str) -> LibraryResult<LoanOutcome> {
        let mut uow = self.tx_manager.begin();
        let res = self.check_out_within(uow.as_mut(), patron_id, isbn).await;
        self.finish(uow, res).await
    }

    async fn return_book(&self, patron_id: &str, isbn: &str) -> LibraryResult<LoanOutcome> {
        let mut uow = self.tx_manager.begin();
        let res = self.return_within(uow.as_mut(), patron_id, isbn).await;
        self.finish(uow, res).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::books::dto::BookDto;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::core::repository::RepositoryStore;
    use crate::library::domain::LibraryService;
    use crate::library::dto::LoanOutcome;
    use crate::library::factory::create_library_service;
    use uuid::Uuid;

    async fn new_service() -> Box<dyn LibraryService> {
        create_library_service(&Configuration::new("test"), RepositoryStore::Memory).await
    }

    async fn find_book(svc: &dyn LibraryService, isbn: &str) -> BookDto {
        svc.list_all_books().await.expect("should list books")
            .into_iter().find(|b| b.isbn == isbn).expect("should find book")
    }

    // Dune by Herbert (111) and patron Alice (P1)
    async fn new_library() -> Box<dyn LibraryService> {
        let svc = new_service().await;
        svc.add_book("Dune", "Herbert", "111").await.expect("should add book");
        svc.add_patron("Alice", "P1").await.expect("should add patron");
        svc
    }

    #[tokio::test]
    async fn test_should_check_out_available_book() {
        let svc = new_library().await;
        let outcome = svc.check_out_book("P1", "111").await.expect("should check out");
        assert_eq!("Success: Alice checked out \"Dune\".", outcome.message());

        let book = find_book(svc.as_ref(), "111").await;
        assert!(!book.available);
        let patrons = svc.list_all_patrons().await.expect("should list patrons");
        assert_eq!(1, patrons[0].borrowed_books.len());
        assert_eq!(book.borrowed_by, Some(patrons[0].id.clone()));
        assert!(svc.list_available_books().await.expect("should list available").is_empty());
    }

    #[tokio::test]
    async fn test_should_not_check_out_borrowed_book() {
        let svc = new_library().await;
        svc.add_patron("Bob", "P2").await.expect("should add patron");
        svc.check_out_book("P1", "111").await.expect("should check out");

        let outcome = svc.check_out_book("P2", "111").await.expect("should reject");
        assert_eq!(LoanOutcome::AlreadyCheckedOut, outcome);
        assert_eq!("Error: Book is already checked out.", outcome.message());

        let patrons = svc.list_all_patrons().await.expect("should list patrons");
        let alice = patrons.iter().find(|p| p.patron_id == "P1").expect("should find alice");
        let bob = patrons.iter().find(|p| p.patron_id == "P2").expect("should find bob");
        assert_eq!(1, alice.borrowed_books.len());
        assert!(bob.borrowed_books.is_empty());
        assert_eq!(Some(alice.id.clone()), find_book(svc.as_ref(), "111").await.borrowed_by);
    }

    #[tokio::test]
    async fn test_should_return_borrowed_book() {
        let svc = new_library().await;
        svc.check_out_book("P1", "111").await.expect("should check out");
        let outcome = svc.return_book("P1", "111").await.expect("should return");
        assert_eq!("Success: Alice returned \"Dune\".", outcome.message());

        let book = find_book(svc.as_ref(), "111").await;
        assert!(book.available);
        assert_eq!(None, book.borrowed_by);
        let patrons = svc.list_all_patrons().await.expect("should list patrons");
        assert!(patrons[0].borrowed_books.is_empty());
    }

    #[tokio::test]
    async fn test_should_fail_for_unknown_patron() {
        let svc = new_library().await;
        let err = svc.check_out_book("UNKNOWN", "111").await.expect_err("should fail");
        assert!(matches!(err, LibraryError::PatronNotFound { .. }));
        assert_eq!("Patron not found with ID: UNKNOWN", err.to_string());
        assert!(find_book(svc.as_ref(), "111").await.available);
    }

    #[tokio::test]
    async fn test_should_fail_for_unknown_book() {
        let svc = new_library().await;
        let err = svc.return_book("P1", "999").await.expect_err("should fail");
        assert_eq!("Book not found with ISBN: 999", err.to_string());
        let err = svc.check_out_book("P1", "999").await.expect_err("should fail");
        assert!(matches!(err, LibraryError::BookNotFound { .. }));
    }

    #[tokio::test]
    async fn test_should_not_return_book_never_checked_out() {
        let svc = new_library().await;
        svc.add_book("Emma", "Austen", "999").await.expect("should add book");
        let outcome = svc.return_book("P1", "999").await.expect("should reject");
        assert_eq!(LoanOutcome::NotBorrowedByThisPatron, outcome);
        assert_eq!("Error: Patron does not have this book checked out.", outcome.message());
        assert!(find_book(svc.as_ref(), "999").await.available);
    }

    #[tokio::test]
    async fn test_should_not_return_book_held_by_another_patron() {
        let svc = new_library().await;
        svc.add_patron("Bob", "P2").await.expect("should add patron");
        svc.check_out_book("P1", "111").await.expect("should check out");
        let outcome = svc.return_book("P2", "111").await.expect("should reject");
        assert_eq!(LoanOutcome::NotBorrowedByThisPatron, outcome);
        assert!(!find_book(svc.as_ref(), "111").await.available);
    }

    #[tokio::test]
    async fn test_should_restore_state_after_round_trip() {
        let svc = new_library().await;
        let before = find_book(svc.as_ref(), "111").await;
        svc.check_out_book("P1", "111").await.expect("should check out");
        svc.return_book("P1", "111").await.expect("should return");
        let after = find_book(svc.as_ref(), "111").await;
        assert_eq!(before.available, after.available);
        assert_eq!(before.borrowed_by, after.borrowed_by);
        assert_eq!(before.version + 2, after.version);

        // the book can be lent again
        let outcome = svc.check_out_book("P1", "111").await.expect("should check out again");
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_should_keep_availability_and_relationship_consistent() {
        let svc = new_library().await;
        svc.add_book("Emma", "Austen", "222").await.expect("should add book");
        svc.add_patron("Bob", "P2").await.expect("should add patron");
        svc.check_out_book("P1", "111").await.expect("should check out");
        svc.check_out_book("P2", "222").await.expect("should check out");
        svc.return_book("P1", "111").await.expect("should return");

        let books = svc.list_all_books().await.expect("should list books");
        let patrons = svc.list_all_patrons().await.expect("should list patrons");
        for book in &books {
            assert_eq!(book.available, book.borrowed_by.is_none());
            let holders: Vec<_> = patrons.iter()
                .filter(|p| p.borrowed_books.iter().any(|b| b.id == book.id)).collect();
            match &book.borrowed_by {
                Some(holder) => {
                    assert_eq!(1, holders.len());
                    assert_eq!(holder, &holders[0].id);
                }
                None => assert!(holders.is_empty()),
            }
        }
        assert_eq!(1, svc.list_available_books().await.expect("should list available").len());
    }

    #[tokio::test]
    async fn test_should_reject_blank_fields() {
        let svc = new_service().await;
        assert!(matches!(svc.add_book(" ", "Herbert", "111").await, Err(LibraryError::Validation { .. })));
        assert!(matches!(svc.add_book("Dune", "Herbert", "").await, Err(LibraryError::Validation { .. })));
        assert!(matches!(svc.add_patron("Alice", "").await, Err(LibraryError::Validation { .. })));
        assert!(svc.list_all_books().await.expect("should list books").is_empty());
    }

    #[tokio::test]
    async fn test_should_list_beyond_one_page() {
        let mut config = Configuration::new("test");
        config.page_size = 2;
        let svc = create_library_service(&config, RepositoryStore::Memory).await;
        for i in 0..5 {
            svc.add_book(format!("title {}", i).as_str(), "author", format!("isbn {}", i).as_str()).await
                .expect("should add book");
        }
        assert_eq!(5, svc.list_all_books().await.expect("should list books").len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_lend_book_once_under_concurrent_checkouts() {
        let svc: Arc<dyn LibraryService> = Arc::from(new_service().await);
        svc.add_book("Dune", "Herbert", "111").await.expect("should add book");
        for i in 0..8 {
            svc.add_patron(format!("patron {}", i).as_str(), format!("P{}", i).as_str()).await
                .expect("should add patron");
        }

        let mut handles = vec![];
        for i in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.check_out_book(format!("P{}", i).as_str(), "111").await
            }));
        }
        let mut successes = 0;
        for handle in handles {
            match handle.await.expect("should join") {
                Ok(outcome) if outcome.is_success() => successes += 1,
                Ok(outcome) => assert_eq!(LoanOutcome::AlreadyCheckedOut, outcome),
                Err(err) => assert!(matches!(err, LibraryError::Conflict { .. })),
            }
        }
        assert_eq!(1, successes);

        let patrons = svc.list_all_patrons().await.expect("should list patrons");
        assert_eq!(1, patrons.iter().filter(|p| !p.borrowed_books.is_empty()).count());
        assert!(!find_book(svc.as_ref(), "111").await.available);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_lend_different_books_to_one_patron_concurrently() {
        let svc: Arc<dyn LibraryService> = Arc::from(new_service().await);
        svc.add_patron("Alice", "P1").await.expect("should add patron");
        for i in 0..8 {
            svc.add_book(format!("title {}", i).as_str(), "author", format!("isbn {}", i).as_str()).await
                .expect("should add book");
        }

        let mut handles = vec![];
        for i in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.check_out_book("P1", format!("isbn {}", i).as_str()).await
            }));
        }
        for handle in handles {
            let outcome = handle.await.expect("should join").expect("should check out");
            assert!(outcome.is_success());
        }

        let patrons = svc.list_all_patrons().await.expect("should list patrons");
        assert_eq!(8, patrons[0].borrowed_books.len());
        assert!(svc.list_available_books().await.expect("should list available").is_empty());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_lend_again_right_after_return_on_dynamodb() {
        let svc = create_library_service(&Configuration::new("test"), RepositoryStore::LocalDynamoDB).await;
        let isbn = Uuid::new_v4().to_string();
        let patron_id = Uuid::new_v4().to_string();
        svc.add_book("Dune", "Herbert", isbn.as_str()).await.expect("should add book");
        svc.add_patron("Alice", patron_id.as_str()).await.expect("should add patron");

        // each step reads what the previous one just wrote
        let outcome = svc.check_out_book(patron_id.as_str(), isbn.as_str()).await.expect("should check out");
        assert!(outcome.is_success());
        let outcome = svc.return_book(patron_id.as_str(), isbn.as_str()).await.expect("should return");
        assert!(outcome.is_success());
        let outcome = svc.check_out_book(patron_id.as_str(), isbn.as_str()).await.expect("should check out again");
        assert!(outcome.is_success());
        let outcome = svc.return_book(patron_id.as_str(), isbn.as_str()).await.expect("should return again");
        assert!(outcome.is_success());
    }
}
