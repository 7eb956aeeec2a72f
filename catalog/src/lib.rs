//! Jukebox catalog: song storage plus the structured filter engine.
//!
//! The filter engine turns a flat, form-generated key namespace into a
//! validated expression tree, compiles it into a predicate and applies it
//! to the catalog's visible songs.

pub mod config;
pub mod error;
pub mod filter;
pub mod init;
pub mod schema;
pub mod search;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use filter::{
    build, compile, run_filter, Built, Catalog, Combinator, FilterOutcome, Leaf, Namespace, Node,
    Predicate, SchemaFault, ValidationError, ValueError,
};
pub use schema::SongRecord;
pub use search::{keyword_predicate, search};
pub use store::Store;
