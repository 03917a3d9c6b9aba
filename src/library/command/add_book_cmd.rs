use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::core::command::{Command, CommandError};
use crate::library::domain::LibraryService;

pub(crate) struct AddBookCommand {
    library_service: Arc<dyn LibraryService>,
}

impl AddBookCommand {
    pub(crate) fn new(library_service: Arc<dyn LibraryService>) -> Self {
        Self {
            library_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddBookCommandRequest {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) isbn: String,
}

impl AddBookCommandRequest {
    pub fn new(title: &str, author: &str, isbn: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
        }
    }
}


#[derive(Debug, Serialize)]
pub(crate) struct AddBookCommandResponse {
    pub book: BookDto,
}

impl AddBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        self.library_service.add_book(req.title.as_str(), req.author.as_str(), req.isbn.as_str())
            .await.map_err(CommandError::from).map(AddBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use uuid::Uuid;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::library::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::library::factory;

    lazy_static! {
        static ref SUT_CMD : AsyncOnce<AddBookCommand> = AsyncOnce::new(async {
                let svc = factory::create_library_service(&Configuration::new("test"), RepositoryStore::Memory).await;
                AddBookCommand::new(Arc::from(svc))
            });
    }

    #[tokio::test]
    async fn test_should_run_add_book() {
        let cmd = SUT_CMD.get().await;
        let isbn = Uuid::new_v4().to_string();
        let res = cmd.execute(AddBookCommandRequest::new("Dune", "Herbert", isbn.as_str()))
            .await.expect("should add book");
        assert_eq!(isbn, res.book.isbn);
        assert!(res.book.available);
    }

    #[tokio::test]
    async fn test_should_reject_blank_title() {
        let cmd = SUT_CMD.get().await;
        let res = cmd.execute(AddBookCommandRequest::new("", "Herbert", "111")).await;
        assert!(matches!(res, Err(CommandError::Validation { .. })));
    }
}
