use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::books::domain::model::BookEntity;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// BookDto is the book as seen by callers of the library service. `available` is derived
// from `borrowed_by` when loaded and only changes through `PatronDto::borrow`/`unborrow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BookDto {
    pub id: String,
    pub version: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub available: bool,
    pub borrowed_by: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookDto {
    pub fn new(title: &str, author: &str, isbn: &str) -> BookDto {
        BookDto {
            id: Uuid::new_v4().to_string(),
            version: 0,
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            available: true,
            borrowed_by: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Book for BookDto {
    fn isbn(&self) -> &str {
        self.isbn.as_str()
    }

    fn title(&self) -> &str {
        self.title.as_str()
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn borrowed_by(&self) -> Option<&str> {
        self.borrowed_by.as_deref()
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            id: other.id.to_string(),
            version: other.version,
            isbn: other.isbn.to_string(),
            title: other.title.to_string(),
            author: other.author.to_string(),
            available: other.is_available(),
            borrowed_by: other.borrowed_by.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            id: other.id.to_string(),
            version: other.version,
            isbn: other.isbn.to_string(),
            title: other.title.to_string(),
            author: other.author.to_string(),
            borrowed_by: other.borrowed_by.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::books::domain::model::BookEntity;
    use crate::books::dto::BookDto;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookDto::new("Dune", "Herbert", "111");
        assert_eq!("111", book.isbn.as_str());
        assert_eq!("Dune", book.title.as_str());
        assert!(book.available);
        assert_eq!(None, book.borrowed_by);
    }

    #[tokio::test]
    async fn test_should_derive_availability_from_entity() {
        let mut entity = BookEntity::new("Dune", "Herbert", "111");
        assert!(BookDto::from(&entity).available);

        entity.borrowed_by = Some("patron-key".to_string());
        let book = BookDto::from(&entity);
        assert!(!book.available);
        assert_eq!(Some("patron-key".to_string()), book.borrowed_by);
        assert_eq!(entity, BookEntity::from(&book));
    }
}
