//! # Exam Marker Library
//!
//! This crate provides the grading and result-aggregation engine for written exams.
//! A grader assesses each question either with a qualitative label, turned into a mark
//! by a configurable policy table, or with a directly typed mark. The engine keeps the
//! per-student total and percentage consistent as entries are edited, reloaded or left
//! ungraded, and persists complete results through a pluggable store.
//!
//! ## Key Concepts
//! - **AssessmentPolicy**: label → fraction table, loaded as data ([`policy`]).
//! - **GradingSession**: the Draft/Saved lifecycle of one student's result ([`session`]).
//! - **Aggregation**: pure recomputation of totals after every edit ([`scorer`]).
//! - **ResultStore**: async persistence boundary with full-replace saves
//!   ([`traits::store`], [`stores`]).
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use exam_marker::policy::AssessmentPolicy;
//! use exam_marker::session::GradingSession;
//! use exam_marker::stores::memory_store::InMemoryResultStore;
//! use exam_marker::types::{Question, QuestionCatalog};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), exam_marker::error::MarkerError> {
//! let policy = AssessmentPolicy::new([("not_attempted", 0.0), ("attempted_fully", 1.0)])?;
//! let catalog = QuestionCatalog::new(1, vec![
//!     Question::new("q1", "Define ownership", 1, 10.0),
//!     Question::new("q2", "Define borrowing", 2, 10.0),
//! ])?;
//!
//! let mut session = GradingSession::new(Arc::new(InMemoryResultStore::new()), policy);
//! session.open(catalog, 42).await?;
//! session.select_label("q1", "attempted_fully")?;
//!
//! assert_eq!(session.draft().unwrap().percentage(), 50.0);
//! session.save().await?;
//! # Ok(())
//! # }
//! ```

pub mod bounds;
pub mod error;
pub mod policy;
pub mod report;
pub mod scorer;
pub mod session;
pub mod stores;
pub mod traits;
pub mod types;

pub use error::{MarkerError, StoreError};
pub use policy::AssessmentPolicy;
pub use session::{GradingSession, SessionState};
pub use traits::store::{ResultStore, SaveConfirmation};
pub use types::{ExamResult, Question, QuestionCatalog, QuestionResult};
