//! Applying a compiled filter to the catalog.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::builder::build;
use super::compiler::{compile, Predicate};
use super::error::ValidationError;
use super::Namespace;
use crate::schema::SongRecord;
use crate::Result;

/// Source of the songs a filter runs over.
pub trait Catalog {
    /// Songs eligible for searching, in the catalog's natural order.
    fn visible_songs(&self) -> Result<Vec<SongRecord>>;
}

impl Catalog for [SongRecord] {
    fn visible_songs(&self) -> Result<Vec<SongRecord>> {
        Ok(self.iter().filter(|song| song.visible).cloned().collect())
    }
}

impl Catalog for Vec<SongRecord> {
    fn visible_songs(&self) -> Result<Vec<SongRecord>> {
        self.as_slice().visible_songs()
    }
}

/// Outcome of one filter request.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// The filter ran; `criteria` leaves took part.
    Filtered {
        songs: Vec<SongRecord>,
        criteria: usize,
    },
    /// No criteria were supplied; every visible song.
    Unfiltered(Vec<SongRecord>),
    /// Some operands failed to parse. The catalog was not queried.
    Rejected(Vec<ValidationError>),
}

impl FilterOutcome {
    /// Songs to display, empty when rejected.
    pub fn songs(&self) -> &[SongRecord] {
        match self {
            FilterOutcome::Filtered { songs, .. } | FilterOutcome::Unfiltered(songs) => songs,
            FilterOutcome::Rejected(_) => &[],
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, FilterOutcome::Rejected(_))
    }
}

/// Run `predicate` over the visible songs, keeping the catalog's order.
///
/// With zero criteria nothing is evaluated and every visible song is returned.
pub fn apply<C: Catalog + ?Sized>(catalog: &C, predicate: &Predicate, criteria: usize) -> Result<Vec<SongRecord>> {
    let songs = catalog.visible_songs()?;
    if criteria == 0 {
        return Ok(songs);
    }
    let total = songs.len();
    let matched: Vec<SongRecord> = songs.into_iter().filter(|song| predicate.matches(song)).collect();
    debug!(total, matched = matched.len(), "applied filter");
    Ok(matched)
}

/// Build, compile and apply the filter rooted at `prefix`.
///
/// A malformed namespace is returned as [`crate::Error::Schema`]; operand
/// parse failures come back as [`FilterOutcome::Rejected`].
pub fn run_filter<C: Catalog + ?Sized>(
    ns: &Namespace,
    prefix: &str,
    catalog: &C,
    now: DateTime<Utc>,
) -> Result<FilterOutcome> {
    let built = build(ns, prefix, now.date_naive())?;

    if !built.is_valid() {
        return Ok(FilterOutcome::Rejected(built.errors));
    }

    match built.node {
        Some(node) if built.count > 0 => {
            let predicate = compile(&node, now);
            let songs = apply(catalog, &predicate, built.count)?;
            Ok(FilterOutcome::Filtered {
                songs,
                criteria: built.count,
            })
        }
        _ => Ok(FilterOutcome::Unfiltered(catalog.visible_songs()?)),
    }
}
