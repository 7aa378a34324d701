//! Provides database interaction functionalities.
//!
//! `store` defines the `EntryStore` interface the `bo` handlers are written
//! against; `postgres` implements it with `sqlx`.

#[cfg(test)]
pub(crate) mod mock;
mod postgres;
mod store;

pub use postgres::*;
pub use store::*;
