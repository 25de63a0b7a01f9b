//! examprep-core — exam session engine, answer matching, and remediation.
//!
//! This crate defines the question/paper data model, the per-session state
//! machine, and the trait seams that paper sources plug into.

pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod registry;
pub mod remediation;
pub mod session;
pub mod traits;
pub mod trigger;

pub use engine::{EngineConfig, ExamEngine};
pub use error::EngineError;
pub use model::{Mode, PaperSet, Question};
