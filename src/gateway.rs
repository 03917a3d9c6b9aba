//! Persistence plumbing shared by the book and patron repositories: store connections,
//! the in-memory database and the unit-of-work implementations behind
//! `core::repository::TransactionManager`.
pub mod ddb;
pub mod factory;
pub mod memory;
