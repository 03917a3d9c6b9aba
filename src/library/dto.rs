use serde::{Deserialize, Serialize};

// LoanOutcome is the result of a checkout or return that reached the domain rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub(crate) enum LoanOutcome {
    CheckedOut {
        patron_id: String,
        patron_name: String,
        isbn: String,
        title: String,
    },
    Returned {
        patron_id: String,
        patron_name: String,
        isbn: String,
        title: String,
    },
    AlreadyCheckedOut,
    NotBorrowedByThisPatron,
}

impl LoanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoanOutcome::CheckedOut { .. } | LoanOutcome::Returned { .. })
    }

    pub fn message(&self) -> String {
        match self {
            LoanOutcome::CheckedOut { patron_name, title, .. } => {
                format!("Success: {} checked out \"{}\".", patron_name, title)
            }
            LoanOutcome::Returned { patron_name, title, .. } => {
                format!("Success: {} returned \"{}\".", patron_name, title)
            }
            LoanOutcome::AlreadyCheckedOut => {
                "Error: Book is already checked out.".to_string()
            }
            LoanOutcome::NotBorrowedByThisPatron => {
                "Error: Patron does not have this book checked out.".to_string()
            }
        }
    }
}
