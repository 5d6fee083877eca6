//! Content sources: catalog types, subscription fetching, and merging.

pub mod fetcher;
pub mod merge;
pub mod types;

pub use fetcher::{parse_source_payload, validate_url, HttpSourceFetcher, SourceFetcher};
pub use merge::merge_sources;
pub use types::{FetchedSources, Source, SourceGroup};
