use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::core::domain::Identifiable;
use crate::patrons::domain::Patron;
use crate::patrons::domain::model::PatronEntity;
use crate::utils::date::serializer;


// PatronDto is a library member together with the books it currently holds.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct PatronDto {
    pub id: String,
    pub version: i64,
    pub patron_id: String,
    pub name: String,
    pub borrowed_books: Vec<BookDto>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PatronDto {
    pub(crate) fn new(name: &str, patron_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version: 0,
            patron_id: patron_id.to_string(),
            name: name.to_string(),
            borrowed_books: vec![],
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    // rebuilds the borrowed set from the books that point back at this patron
    pub(crate) fn from_entity(entity: &PatronEntity, books: &[BookEntity]) -> Self {
        Self {
            id: entity.id.to_string(),
            version: entity.version,
            patron_id: entity.patron_id.to_string(),
            name: entity.name.to_string(),
            borrowed_books: books.iter()
                .filter(|b| b.borrowed_by.as_deref() == Some(entity.id.as_str()))
                .map(BookDto::from).collect(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    /// Hands `book` to this patron. The caller checks `book.available` first.
    pub(crate) fn borrow(&mut self, book: &mut BookDto) {
        book.borrowed_by = Some(self.id.to_string());
        book.available = false;
        self.borrowed_books.retain(|b| b.id != book.id);
        self.borrowed_books.push(book.clone());
    }

    /// Takes `book` back from this patron. The caller checks `has_borrowed` first.
    pub(crate) fn unborrow(&mut self, book: &mut BookDto) {
        self.borrowed_books.retain(|b| b.id != book.id);
        book.borrowed_by = None;
        book.available = true;
    }

    pub(crate) fn has_borrowed(&self, book: &BookDto) -> bool {
        self.borrowed_books.iter().any(|b| b.id == book.id)
    }
}

impl Identifiable for PatronDto {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Patron for PatronDto {
    fn patron_id(&self) -> &str {
        self.patron_id.as_str()
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
