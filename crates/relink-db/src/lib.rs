//! Document store repositories
//!
//! The sweep talks to a document store through the `DocumentStore` trait:
//! a full collection snapshot and single-field overwrites. `PgDocumentStore`
//! keeps documents as JSONB rows; `InMemoryDocumentStore` backs tests and
//! local runs.

pub mod memory;
pub mod postgres;
pub mod setup;
pub mod store;

pub use memory::{FieldUpdate, InMemoryDocumentStore};
pub use postgres::PgDocumentStore;
pub use setup::setup_database;
pub use store::DocumentStore;
