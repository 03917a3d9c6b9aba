use crate::core::domain::Identifiable;

pub mod model;

pub(crate) trait Book: Identifiable {
    fn isbn(&self) -> &str;
    fn title(&self) -> &str;
    // available iff nobody has borrowed the book
    fn is_available(&self) -> bool;
    fn borrowed_by(&self) -> Option<&str>;
}
