//! Infrastructure layer: user persistence.

pub mod store;

pub use store::{InMemoryUserStore, PostgresUserStore, StoreError, UserStore};
