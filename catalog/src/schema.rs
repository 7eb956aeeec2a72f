//! Schema definitions for catalog tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{DateField, NumberField, TextField};

/// A song in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    /// Unique identifier (UUIDv7 for time-ordering).
    #[serde(default = "Uuid::now_v7")]
    pub id: Uuid,

    pub title: String,

    pub album: String,

    pub artist: String,

    /// Track number on the album (0 when unknown).
    #[serde(default)]
    pub track: i64,

    /// Duration in seconds.
    #[serde(default)]
    pub time: i64,

    /// Number of times the song has been queued.
    #[serde(default)]
    pub play_count: i64,

    /// When the song entered the catalog.
    #[serde(default = "Utc::now")]
    pub date_added: DateTime<Utc>,

    /// When the song was last queued, if ever.
    #[serde(default)]
    pub last_queued: Option<DateTime<Utc>>,

    /// Hidden songs never appear in search results.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl SongRecord {
    /// Create a new visible song added now.
    pub fn new(title: impl Into<String>, album: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            album: album.into(),
            artist: artist.into(),
            track: 0,
            time: 0,
            play_count: 0,
            date_added: Utc::now(),
            last_queued: None,
            visible: true,
        }
    }

    pub fn with_track(mut self, track: i64) -> Self {
        self.track = track;
        self
    }

    /// Set the duration in seconds.
    pub fn with_time(mut self, seconds: i64) -> Self {
        self.time = seconds;
        self
    }

    pub fn with_play_count(mut self, play_count: i64) -> Self {
        self.play_count = play_count;
        self
    }

    pub fn with_date_added(mut self, date_added: DateTime<Utc>) -> Self {
        self.date_added = date_added;
        self
    }

    pub fn with_last_queued(mut self, last_queued: DateTime<Utc>) -> Self {
        self.last_queued = Some(last_queued);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Value of a text field.
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Title => &self.title,
            TextField::Album => &self.album,
            TextField::Artist => &self.artist,
        }
    }

    /// Value of an integer field.
    pub fn number(&self, field: NumberField) -> i64 {
        match field {
            NumberField::Time => self.time,
            NumberField::Track => self.track,
            NumberField::PlayCount => self.play_count,
        }
    }

    /// Value of a timestamp field.
    pub fn timestamp(&self, field: DateField) -> Option<DateTime<Utc>> {
        match field {
            DateField::DateAdded => Some(self.date_added),
            DateField::LastQueued => self.last_queued,
        }
    }

    /// Duration formatted as `m:ss`, or `h:mm:ss` past an hour.
    pub fn time_string(&self) -> String {
        let (h, m, s) = (self.time / 3600, (self.time % 3600) / 60, self.time % 60);
        if h > 0 {
            format!("{}:{:02}:{:02}", h, m, s)
        } else {
            format!("{}:{:02}", m, s)
        }
    }
}
