//! Docvault persistence layer
//!
//! The provisional record store (pending uploads awaiting a decision) and the
//! repository of confirmed documents.

pub mod db;

pub use db::documents::{DocumentRepository, DocumentStore};
pub use db::records::memory::InMemoryProvisionalRecordStore;
pub use db::records::postgres::PgProvisionalRecordStore;
pub use db::records::ProvisionalRecordStore;
