use axum::{
    body::HttpBody,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    BoxError, Router,
};
use serde_json::Value;
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};
use crate::library::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest, AddBookCommandResponse};
use crate::library::command::add_patron_cmd::{AddPatronCommand, AddPatronCommandRequest, AddPatronCommandResponse};
use crate::library::command::checkout_book_cmd::{CheckoutBookCommand, CheckoutBookCommandRequest, CheckoutBookCommandResponse};
use crate::library::command::list_books_cmd::{ListBooksCommand, ListBooksCommandRequest, ListBooksCommandResponse};
use crate::library::command::list_patrons_cmd::{ListPatronsCommand, ListPatronsCommandRequest, ListPatronsCommandResponse};
use crate::library::command::return_book_cmd::{ReturnBookCommand, ReturnBookCommandRequest, ReturnBookCommandResponse};

// B is lambda_http::Body in the deployed binary
pub(crate) fn build_router<B>(state: AppState) -> Router<(), B>
    where B: HttpBody + Send + 'static, B::Data: Send, B::Error: Into<BoxError> {
    Router::new()
        .route("/api/books", post(add_book).get(list_books))
        .route("/api/books/available", get(list_available_books))
        .route("/api/patrons", post(add_patron).get(list_patrons))
        .route("/api/checkout", post(checkout_book))
        .route("/api/return", post(return_book))
        .with_state(state)
}

pub(crate) async fn add_book(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<AddBookCommandResponse>, ServerError> {
    let req: AddBookCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = AddBookCommand::new(state.service).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn list_books(
    State(state): State<AppState>) -> Result<Json<ListBooksCommandResponse>, ServerError> {
    let res = ListBooksCommand::new(state.service).execute(ListBooksCommandRequest::all()).await?;
    Ok(Json(res))
}

pub(crate) async fn list_available_books(
    State(state): State<AppState>) -> Result<Json<ListBooksCommandResponse>, ServerError> {
    let res = ListBooksCommand::new(state.service).execute(ListBooksCommandRequest::available()).await?;
    Ok(Json(res))
}

pub(crate) async fn add_patron(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<AddPatronCommandResponse>, ServerError> {
    let req: AddPatronCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = AddPatronCommand::new(state.service).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn list_patrons(
    State(state): State<AppState>) -> Result<Json<ListPatronsCommandResponse>, ServerError> {
    let res = ListPatronsCommand::new(state.service).execute(ListPatronsCommandRequest::default()).await?;
    Ok(Json(res))
}

// rejected loans answer 409 with the outcome message
pub(crate) async fn checkout_book(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<CheckoutBookCommandResponse>, ServerError> {
    let req: CheckoutBookCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = CheckoutBookCommand::new(state.service).execute(req).await?;
    if !res.success {
        return Err((StatusCode::CONFLICT, res.message));
    }
    Ok(Json(res))
}

pub(crate) async fn return_book(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<ReturnBookCommandResponse>, ServerError> {
    let req: ReturnBookCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let res = ReturnBookCommand::new(state.service).execute(req).await?;
    if !res.success {
        return Err((StatusCode::CONFLICT, res.message));
    }
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use axum::body::HttpBody;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::Json;
    use axum::Router;
    use lambda_http::http::Request;
    use lambda_http::tower::ServiceExt;
    use serde_json::{json, Value};
    use crate::core::controller::AppState;
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::library::controller::{add_book, add_patron, build_router, checkout_book, list_available_books, list_books, list_patrons, return_book};
    use crate::library::factory::create_library_service;

    async fn new_state() -> AppState {
        let svc = create_library_service(&Configuration::new("test"), RepositoryStore::Memory).await;
        AppState::new(Arc::from(svc))
    }

    // sends one request through the router with the body type the lambda runtime delivers
    async fn send(app: &Router<(), lambda_http::Body>, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let body = match body {
            Some(json) => lambda_http::Body::from(json.to_string()),
            None => lambda_http::Body::Empty,
        };
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .expect("should build request");
        let res = app.clone().oneshot(req).await.expect("should route request");
        let status = res.status();
        let mut body = res.into_body();
        let mut text = String::new();
        while let Some(chunk) = body.data().await {
            text.push_str(String::from_utf8_lossy(&chunk.expect("should read body")).as_ref());
        }
        (status, text)
    }

    #[tokio::test]
    async fn test_should_route_lambda_requests() {
        let app = build_router::<lambda_http::Body>(new_state().await);
        let (status, _) = send(&app, "POST", "/api/books",
                               Some(json!({"title": "Dune", "author": "Herbert", "isbn": "111"}))).await;
        assert_eq!(StatusCode::OK, status);
        let (status, _) = send(&app, "POST", "/api/patrons", Some(json!({"name": "Alice", "patronId": "P1"}))).await;
        assert_eq!(StatusCode::OK, status);

        let (status, body) = send(&app, "POST", "/api/checkout", Some(json!({"patronId": "P1", "isbn": "111"}))).await;
        assert_eq!(StatusCode::OK, status);
        assert!(body.contains("Alice checked out"));
        let (status, body) = send(&app, "POST", "/api/checkout", Some(json!({"patronId": "P1", "isbn": "111"}))).await;
        assert_eq!(StatusCode::CONFLICT, status);
        assert_eq!("Error: Book is already checked out.", body.as_str());

        let (status, body) = send(&app, "GET", "/api/books/available", None).await;
        assert_eq!(StatusCode::OK, status);
        let available: Value = serde_json::from_str(body.as_str()).expect("should parse books");
        assert_eq!(Some(0), available["books"].as_array().map(Vec::len));

        let (status, _) = send(&app, "POST", "/api/return", Some(json!({"patronId": "P1", "isbn": "111"}))).await;
        assert_eq!(StatusCode::OK, status);
        let (status, body) = send(&app, "GET", "/api/patrons", None).await;
        assert_eq!(StatusCode::OK, status);
        let patrons: Value = serde_json::from_str(body.as_str()).expect("should parse patrons");
        assert_eq!(Some(0), patrons["patrons"][0]["borrowed_books"].as_array().map(Vec::len));

        let (status, _) = send(&app, "POST", "/api/return", Some(json!({"patronId": "UNKNOWN", "isbn": "111"}))).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        let (status, _) = send(&app, "GET", "/api/loans", None).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
    }

    #[tokio::test]
    async fn test_should_serve_lending_flow() {
        let state = new_state().await;
        add_book(State(state.clone()), Json(json!({"title": "Dune", "author": "Herbert", "isbn": "111"})))
            .await.expect("should add book");
        add_patron(State(state.clone()), Json(json!({"name": "Alice", "patronId": "P1"})))
            .await.expect("should add patron");

        let res = checkout_book(State(state.clone()), Json(json!({"patronId": "P1", "isbn": "111"})))
            .await.expect("should checkout");
        assert_eq!("Success: Alice checked out \"Dune\".", res.0.message.as_str());
        assert!(list_available_books(State(state.clone())).await.expect("should list").0.books.is_empty());

        let (status, message) = checkout_book(State(state.clone()), Json(json!({"patron_id": "P1", "isbn": "111"})))
            .await.expect_err("should reject");
        assert_eq!(StatusCode::CONFLICT, status);
        assert_eq!("Error: Book is already checked out.", message.as_str());

        let patrons = list_patrons(State(state.clone())).await.expect("should list patrons").0.patrons;
        assert_eq!(1, patrons[0].borrowed_books.len());

        let res = return_book(State(state.clone()), Json(json!({"patronId": "P1", "isbn": "111"})))
            .await.expect("should return");
        assert_eq!("Success: Alice returned \"Dune\".", res.0.message.as_str());
        assert_eq!(1, list_books(State(state)).await.expect("should list").0.books.len());
    }
    #[tokio::test]
    async fn test_should_map_failures_to_status() {
        let state = new_state().await;
        let (status, _) = add_book(State(state.clone()), Json(json!({"title": "Dune"})))
            .await.expect_err("should reject body");
        assert_eq!(StatusCode::BAD_REQUEST, status);
        let (status, _) = add_patron(State(state.clone()), Json(json!({"name": "", "patron_id": "P1"})))
            .await.expect_err("should reject blank name");
        assert_eq!(StatusCode::BAD_REQUEST, status);
        let (status, message) = return_book(State(state.clone()), Json(json!({"patronId": "UNKNOWN", "isbn": "111"})))
            .await.expect_err("should not find patron");
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert!(message.contains("Patron not found with ID: UNKNOWN"));
    }
}
