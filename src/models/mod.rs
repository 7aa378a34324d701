//! Defines the data structures used throughout the application.
//!
//! This includes the rows stored in the database and the records written by
//! export/import.

mod entry;

pub use entry::*;
