//!
//! Traits Module
//!
//! Seams of the grading engine that collaborators implement.
//!
//! - [`store`]: the [`ResultStore`](store::ResultStore) persistence boundary.

pub mod store;
