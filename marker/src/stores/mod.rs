//! # Result Stores
//!
//! [`ResultStore`](crate::traits::store::ResultStore) implementations shipped with the engine.
//!
//! - [`memory_store`]: records held in process memory.
//! - [`file_store`]: one JSON file per record under the storage root.

pub mod file_store;
pub mod memory_store;
