//! Feed clients and extractors used by Postwatch.
//!
//! Submodules provide the candidate source list for a tracked handle, the
//! first-success fetch loop over those sources, and the conversion from raw
//! RSS items into [`postwatch_common::Post`] records.
pub mod fetch;
pub mod parse;
pub mod sources;

pub use fetch::FeedFetcher;
pub use sources::FeedSource;
