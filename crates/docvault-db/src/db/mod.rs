//! Database repositories
//
// Provisional records and their confirm/reject lifecycle
pub mod records;
//
// Confirmed documents (the permanent store)
pub mod documents;
//
// Row mappings shared by the repositories
pub(crate) mod rows;
