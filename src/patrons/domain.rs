use crate::core::domain::Identifiable;

pub mod model;

pub(crate) trait Patron: Identifiable {
    // the business key callers use to look the patron up
    fn patron_id(&self) -> &str;
    fn name(&self) -> &str;
}
