//! lexitrans: resolve word and phrase translations via Wikidata, with a
//! Meilisearch cache-aside index and durable SQLite records.

pub mod config;
pub mod connectivity;
pub mod db;
pub mod error;
pub mod language;
pub mod resolver;
pub mod search_index;
pub mod wikidata;

pub use error::ResolveError;
pub use language::Language;
pub use resolver::{Resolution, Resolver, TranslationRequest};
