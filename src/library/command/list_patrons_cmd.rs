use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::core::command::{Command, CommandError};
use crate::library::domain::LibraryService;
use crate::patrons::dto::PatronDto;

pub(crate) struct ListPatronsCommand {
    library_service: Arc<dyn LibraryService>,
}

impl ListPatronsCommand {
    pub(crate) fn new(library_service: Arc<dyn LibraryService>) -> Self {
        Self {
            library_service,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListPatronsCommandRequest {}

#[derive(Debug, Serialize)]
pub(crate) struct ListPatronsCommandResponse {
    pub patrons: Vec<PatronDto>,
}

impl ListPatronsCommandResponse {
    pub fn new(patrons: Vec<PatronDto>) -> Self {
        Self {
            patrons,
        }
    }
}

#[async_trait]
impl Command<ListPatronsCommandRequest, ListPatronsCommandResponse> for ListPatronsCommand {
    async fn execute(&self, _req: ListPatronsCommandRequest) -> Result<ListPatronsCommandResponse, CommandError> {
        self.library_service.list_all_patrons()
            .await.map_err(CommandError::from).map(ListPatronsCommandResponse::new)
    }
}
