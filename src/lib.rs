pub mod core;
pub mod books;
pub mod patrons;
pub mod gateway;
pub mod library;
pub mod utils;
