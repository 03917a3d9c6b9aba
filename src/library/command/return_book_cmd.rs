use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::library::domain::LibraryService;
use crate::library::dto::LoanOutcome;

pub(crate) struct ReturnBookCommand {
    library_service: Arc<dyn LibraryService>,
}

impl ReturnBookCommand {
    pub(crate) fn new(library_service: Arc<dyn LibraryService>) -> Self {
        Self {
            library_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnBookCommandRequest {
    #[serde(alias = "patronId")]
    patron_id: String,
    isbn: String,
}

impl ReturnBookCommandRequest {
    pub fn new(patron_id: &str, isbn: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            isbn: isbn.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReturnBookCommandResponse {
    pub success: bool,
    pub message: String,
    pub outcome: LoanOutcome,
}

impl ReturnBookCommandResponse {
    pub fn new(outcome: LoanOutcome) -> Self {
        Self {
            success: outcome.is_success(),
            message: outcome.message(),
            outcome,
        }
    }
}

#[async_trait]
impl Command<ReturnBookCommandRequest, ReturnBookCommandResponse> for ReturnBookCommand {
    async fn execute(&self, req: ReturnBookCommandRequest) -> Result<ReturnBookCommandResponse, CommandError> {
        self.library_service.return_book(req.patron_id.as_str(), req.isbn.as_str())
            .await.map_err(CommandError::from).map(ReturnBookCommandResponse::new)
    }
}
