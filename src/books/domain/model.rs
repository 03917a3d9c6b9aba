use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::books::domain::Book;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// BookEntity is the persisted book record. `borrowed_by` holds the internal id of the
// patron currently holding the book and is the only place the loan relationship is stored.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct BookEntity {
    pub id: String,
    pub version: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub borrowed_by: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookEntity {
    pub fn new(title: &str, author: &str, isbn: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version: 0,
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            borrowed_by: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Book for BookEntity {
    fn isbn(&self) -> &str {
        self.isbn.as_str()
    }

    fn title(&self) -> &str {
        self.title.as_str()
    }

    fn is_available(&self) -> bool {
        self.borrowed_by.is_none()
    }

    fn borrowed_by(&self) -> Option<&str> {
        self.borrowed_by.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use crate::books::domain::Book;
    use crate::books::domain::model::BookEntity;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookEntity::new("Dune", "Herbert", "111");
        assert_eq!("111", book.isbn.as_str());
        assert_eq!("Dune", book.title.as_str());
        assert_eq!("Herbert", book.author.as_str());
        assert_eq!(0, book.version);
        assert!(book.is_available());
        assert_eq!(None, book.borrowed_by());
    }

    #[tokio::test]
    async fn test_should_not_be_available_when_borrowed() {
        let mut book = BookEntity::new("Dune", "Herbert", "111");
        book.borrowed_by = Some("patron-key".to_string());
        assert!(!book.is_available());
    }
}
