//! Cambio Store
//!
//! Persistence backends for the Cambio conversion core: PostgreSQL-backed
//! stores over sqlx, and in-memory stores for tests and local development.
//! Both implement the store traits declared in `cambio-fx`.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryRateStore, MemoryTransactionStore};
pub use postgres::{PgRateStore, PgTransactionStore, MIGRATOR};
