//! examprep-sources — past-paper acquisition.
//!
//! Implements the tiered acquisition chain behind the `PaperAcquirer`
//! trait: a TTL cache, a best-effort remote scraper for past-paper sites,
//! and a synthetic generator that always succeeds.

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod html;
pub mod mock;
pub mod parse;
pub mod pipeline;
pub mod remote;
pub mod synthetic;

pub use cache::{cache_key, PaperCache, TtlCache};
pub use config::{create_pipeline, load_config_from, ExamprepConfig, RemoteConfig};
pub use document::{paper_set_from_document, read_document, DocumentTextExtractor, PdfTextExtractor};
pub use error::SourceError;
pub use pipeline::AcquisitionPipeline;
pub use remote::RemotePaperSource;
pub use synthetic::SyntheticSource;
