// [libs/infra/db/src/lib.rs]
//! Sharded libSQL store for the device pool.

mod client;
mod errors;
mod repository;
mod schema;

pub use client::DevicePoolClient;
pub use errors::DbError;
pub use repository::{checkout, count, evict, upsert, DeviceRow};
