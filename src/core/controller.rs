use std::sync::Arc;
use axum::http::StatusCode;
use crate::core::command::CommandError;
use crate::library::domain::LibraryService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) service: Arc<dyn LibraryService>,
}

impl AppState {
    pub fn new(service: Arc<dyn LibraryService>) -> AppState {
        AppState {
            service,
        }
    }
}

pub(crate) type ServerError = (StatusCode, String);

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    (StatusCode::BAD_REQUEST, format!("{}", err))
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Conflict { .. } => {
                (StatusCode::CONFLICT, format!("{:?}", err))
            }
            CommandError::Database { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
            }
            CommandError::DuplicateKey { .. } => {
                (StatusCode::CONFLICT, format!("{:?}", err))
            }
            CommandError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, format!("{:?}", err))
            }
            CommandError::Runtime { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
            }
            CommandError::Serialization { .. } => {
                (StatusCode::BAD_REQUEST, format!("{:?}", err))
            }
            CommandError::Validation { .. } => {
                (StatusCode::BAD_REQUEST, format!("{:?}", err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use crate::core::command::CommandError;
    use crate::core::controller::ServerError;

    #[tokio::test]
    async fn test_should_map_command_errors_to_status() {
        let (status, _) = ServerError::from(CommandError::NotFound { message: "missing".to_string() });
        assert_eq!(StatusCode::NOT_FOUND, status);
        let (status, _) = ServerError::from(CommandError::Conflict { message: "stale".to_string(), reason_code: None });
        assert_eq!(StatusCode::CONFLICT, status);
        let (status, _) = ServerError::from(CommandError::Validation { message: "blank".to_string(), reason_code: None });
        assert_eq!(StatusCode::BAD_REQUEST, status);
        let (status, _) = ServerError::from(CommandError::Database { message: "down".to_string(), reason_code: None, retryable: false });
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
    }
}
