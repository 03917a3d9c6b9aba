use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::library::domain::LibraryService;
use crate::patrons::dto::PatronDto;

pub(crate) struct AddPatronCommand {
    library_service: Arc<dyn LibraryService>,
}

impl AddPatronCommand {
    pub(crate) fn new(library_service: Arc<dyn LibraryService>) -> Self {
        Self {
            library_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddPatronCommandRequest {
    pub(crate) name: String,
    #[serde(alias = "patronId")]
    pub(crate) patron_id: String,
}

impl AddPatronCommandRequest {
    pub fn new(name: &str, patron_id: &str) -> Self {
        Self {
            name: name.to_string(),
            patron_id: patron_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddPatronCommandResponse {
    pub patron: PatronDto,
}

impl AddPatronCommandResponse {
    pub fn new(patron: PatronDto) -> Self {
        Self {
            patron,
        }
    }
}

#[async_trait]
impl Command<AddPatronCommandRequest, AddPatronCommandResponse> for AddPatronCommand {
    async fn execute(&self, req: AddPatronCommandRequest) -> Result<AddPatronCommandResponse, CommandError> {
        self.library_service.add_patron(req.name.as_str(), req.patron_id.as_str())
            .await.map_err(CommandError::from).map(AddPatronCommandResponse::new)
    }
}
