use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::library::domain::LibraryService;
use crate::library::dto::LoanOutcome;

pub(crate) struct CheckoutBookCommand {
    library_service: Arc<dyn LibraryService>,
}

impl CheckoutBookCommand {
    pub(crate) fn new(library_service: Arc<dyn LibraryService>) -> Self {
        Self {
            library_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutBookCommandRequest {
    #[serde(alias = "patronId")]
    patron_id: String,
    isbn: String,
}

impl CheckoutBookCommandRequest {
    pub fn new(patron_id: &str, isbn: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            isbn: isbn.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutBookCommandResponse {
    pub success: bool,
    pub message: String,
    pub outcome: LoanOutcome,
}

impl CheckoutBookCommandResponse {
    pub fn new(outcome: LoanOutcome) -> Self {
        Self {
            success: outcome.is_success(),
            message: outcome.message(),
            outcome,
        }
    }
}

#[async_trait]
impl Command<CheckoutBookCommandRequest, CheckoutBookCommandResponse> for CheckoutBookCommand {
    async fn execute(&self, req: CheckoutBookCommandRequest) -> Result<CheckoutBookCommandResponse, CommandError> {
        self.library_service.check_out_book(req.patron_id.as_str(), req.isbn.as_str())
            .await.map_err(CommandError::from).map(CheckoutBookCommandResponse::new)
    }
}
