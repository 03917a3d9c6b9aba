use std::cmp;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use crate::books::domain::model::BookEntity;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::patrons::domain::model::PatronEntity;

// Row is a record kept in one of the in-memory tables.
pub(crate) trait Row: Identifiable + Clone {
    // the copy written back by a successful versioned update
    fn bumped(&self) -> Self;
}

impl Row for BookEntity {
    fn bumped(&self) -> Self {
        let mut next = self.clone();
        next.version = self.version + 1;
        next.updated_at = Utc::now().naive_utc();
        next
    }
}

impl Row for PatronEntity {
    fn bumped(&self) -> Self {
        let mut next = self.clone();
        next.version = self.version + 1;
        next.updated_at = Utc::now().naive_utc();
        next
    }
}

// Rows are kept in insertion order.
#[derive(Debug, Default)]
pub(crate) struct MemoryTables {
    pub books: Vec<BookEntity>,
    pub patrons: Vec<PatronEntity>,
}

/// MemoryDatabase is a process-local store shared by the memory repositories and the
/// memory unit of work. Clones share the same tables; one lock guards both tables so a
/// commit touching books and patrons is applied as a single step.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryDatabase {
    tables: Arc<RwLock<MemoryTables>>,
}

impl MemoryDatabase {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&MemoryTables) -> R) -> LibraryResult<R> {
        let tables = self.tables.read()?;
        Ok(f(&tables))
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut MemoryTables) -> LibraryResult<R>) -> LibraryResult<R> {
        let mut tables = self.tables.write()?;
        f(&mut tables)
    }
}

pub(crate) fn find_row<T: Row>(rows: &[T], id: &str) -> Option<T> {
    rows.iter().find(|r| r.id() == id).cloned()
}

pub(crate) fn insert_row<T: Row>(rows: &mut Vec<T>, entity: &T, kind: &str) -> LibraryResult<usize> {
    if rows.iter().any(|r| r.id() == entity.id()) {
        return Err(LibraryError::duplicate_key(
            format!("{} {} already exists", kind, entity.id()).as_str()));
    }
    rows.push(entity.clone());
    Ok(1)
}

// position of the stored row, provided it still carries the version the entity was read with
pub(crate) fn check_version<T: Row>(rows: &[T], entity: &T, kind: &str) -> LibraryResult<usize> {
    let pos = rows.iter().position(|r| r.id() == entity.id())
        .ok_or_else(|| LibraryError::not_found(
            format!("{} not found for {}", kind, entity.id()).as_str()))?;
    let current = rows.get(pos).map(|r| r.version()).unwrap_or_default();
    if current != entity.version() {
        return Err(LibraryError::conflict(
            format!("{} {} was modified, expected version {} but found {}",
                    kind, entity.id(), entity.version(), current).as_str(), None));
    }
    Ok(pos)
}

// writes the entity over its stored row and returns what was stored
pub(crate) fn update_row<T: Row>(rows: &mut [T], entity: &T, kind: &str) -> LibraryResult<T> {
    let pos = check_version(rows, entity, kind)?;
    let next = entity.bumped();
    if let Some(row) = rows.get_mut(pos) {
        *row = next.clone();
    }
    Ok(next)
}

pub(crate) fn delete_row<T: Row>(rows: &mut Vec<T>, id: &str) -> usize {
    let before = rows.len();
    rows.retain(|r| r.id() != id);
    before - rows.len()
}

// a row matches when every predicate key names a string attribute holding the given value
pub(crate) fn matches_predicate<T: Serialize>(row: &T, predicate: &HashMap<String, String>) -> bool {
    match serde_json::to_value(row) {
        Ok(Value::Object(map)) => {
            predicate.iter().all(|(k, v)| {
                map.get(k).and_then(Value::as_str) == Some(v.as_str())
            })
        }
        _ => false,
    }
}

// at most one row may carry a business key
pub(crate) fn single_row<T>(mut rows: Vec<T>, kind: &str, key: &str) -> LibraryResult<Option<T>> {
    if rows.len() > 1 {
        return Err(LibraryError::database(
            format!("too many {} for {}", kind, key).as_str(), None, false));
    }
    Ok(rows.pop())
}

// page tokens are plain row offsets
pub(crate) fn page_rows<T>(rows: Vec<T>, page: Option<&str>, page_size: usize) -> PaginatedResult<T> {
    let offset = page.and_then(|p| p.parse::<usize>().ok()).unwrap_or(0);
    let size = cmp::max(page_size, 1);
    let total = rows.len();
    let records = rows.into_iter().skip(offset).take(size).collect();
    let next_page = if offset + size < total {
        Some((offset + size).to_string())
    } else {
        None
    };
    PaginatedResult::new(page, page_size, next_page, records)
}
