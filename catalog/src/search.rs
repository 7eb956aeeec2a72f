//! Free-text keyword search over title, album and artist.

use tracing::debug;

use crate::filter::{Catalog, Predicate, TextField, TextOp};
use crate::schema::SongRecord;
use crate::Result;

const SEARCH_FIELDS: [TextField; 3] = [TextField::Title, TextField::Album, TextField::Artist];

/// Predicate requiring every word to appear in at least one searchable field.
///
/// Returns `None` for a query with no words.
pub fn keyword_predicate(query: &str) -> Option<Predicate> {
    let words: Vec<Predicate> = query
        .split_whitespace()
        .map(|word| {
            Predicate::Any(
                SEARCH_FIELDS
                    .iter()
                    .map(|field| Predicate::text(*field, TextOp::Contains, word))
                    .collect(),
            )
        })
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(Predicate::All(words))
    }
}

/// Visible songs matching every word of `query`. An empty query matches nothing.
pub fn search<C: Catalog + ?Sized>(catalog: &C, query: &str) -> Result<Vec<SongRecord>> {
    let Some(predicate) = keyword_predicate(query) else {
        return Ok(Vec::new());
    };
    let songs: Vec<SongRecord> = catalog
        .visible_songs()?
        .into_iter()
        .filter(|song| predicate.matches(song))
        .collect();
    debug!(query, matched = songs.len(), "keyword search");
    Ok(songs)
}
