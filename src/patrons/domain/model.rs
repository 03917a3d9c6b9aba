use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::patrons::domain::Patron;
use crate::utils::date::serializer;

// PatronEntity is the persisted patron record. Loans are not stored here, they are
// recovered from the books whose `borrowed_by` equals this patron's `id`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct PatronEntity {
    pub id: String,
    pub version: i64,
    pub patron_id: String,
    pub name: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PatronEntity {
    pub fn new(name: &str, patron_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version: 0,
            patron_id: patron_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for PatronEntity {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Patron for PatronEntity {
    fn patron_id(&self) -> &str {
        self.patron_id.as_str()
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
