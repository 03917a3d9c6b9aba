use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::dto::BookDto;
use crate::core::command::{Command, CommandError};
use crate::library::domain::LibraryService;

pub(crate) struct ListBooksCommand {
    library_service: Arc<dyn LibraryService>,
}

impl ListBooksCommand {
    pub(crate) fn new(library_service: Arc<dyn LibraryService>) -> Self {
        Self {
            library_service,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ListBooksCommandRequest {
    available_only: bool,
}

impl ListBooksCommandRequest {
    pub fn all() -> Self {
        Self {
            available_only: false,
        }
    }

    pub fn available() -> Self {
        Self {
            available_only: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListBooksCommandResponse {
    pub books: Vec<BookDto>,
}

impl ListBooksCommandResponse {
    pub fn new(books: Vec<BookDto>) -> Self {
        Self {
            books,
        }
    }
}

#[async_trait]
impl Command<ListBooksCommandRequest, ListBooksCommandResponse> for ListBooksCommand {
    async fn execute(&self, req: ListBooksCommandRequest) -> Result<ListBooksCommandResponse, CommandError> {
        let res = if req.available_only {
            self.library_service.list_available_books().await
        } else {
            self.library_service.list_all_books().await
        };
        res.map_err(CommandError::from).map(ListBooksCommandResponse::new)
    }
}
