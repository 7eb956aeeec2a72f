//! Song storage operations.

use chrono::{DateTime, Utc};
use duckdb::{params, Connection, ToSql};
use uuid::Uuid;

use super::Store;
use crate::filter::Catalog;
use crate::schema::SongRecord;
use crate::{Error, Result};

const SELECT_SONGS: &str = r#"
    SELECT id::VARCHAR, title, album, artist, track, time, play_count,
           epoch_us(date_added), epoch_us(last_queued), visible
    FROM songs
"#;

// Natural catalog order.
const ORDER_SONGS: &str = "ORDER BY artist, album, track, title, id";

type SongRow = (String, String, String, String, i64, i64, i64, i64, Option<i64>, bool);

impl Store {
    /// Add one song.
    pub fn add_song(&self, song: &SongRecord) -> Result<()> {
        let conn = self.connection()?;
        insert_song(&conn, song)
    }

    /// Add several songs in one transaction. Nothing is written if any insert fails.
    pub fn add_songs(&self, songs: &[SongRecord]) -> Result<usize> {
        let conn = self.connection()?;

        conn.execute("BEGIN TRANSACTION", [])?;

        let result = songs.iter().try_for_each(|song| insert_song(&conn, song));

        match result {
            Ok(()) => {
                conn.execute("COMMIT", [])?;
                Ok(songs.len())
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    /// Look up one song by id, hidden or not.
    pub fn song(&self, id: Uuid) -> Result<Option<SongRecord>> {
        let sql = format!("{} WHERE id = ?::UUID", SELECT_SONGS);
        let mut songs = self.select(&sql, params![id.to_string()])?;
        Ok(songs.pop())
    }

    /// Every song, hidden ones included.
    pub fn all_songs(&self) -> Result<Vec<SongRecord>> {
        let sql = format!("{} {}", SELECT_SONGS, ORDER_SONGS);
        self.select(&sql, params![])
    }

    /// Show or hide a song from searches.
    pub fn set_visible(&self, id: Uuid, visible: bool) -> Result<()> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE songs SET visible = ? WHERE id = ?::UUID",
            params![visible, id.to_string()],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("song {}", id)));
        }
        Ok(())
    }

    /// Record that a song was queued at `at`.
    pub fn mark_queued(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE songs SET last_queued = ?::TIMESTAMP, play_count = play_count + 1 WHERE id = ?::UUID",
            params![timestamp_literal(&at), id.to_string()],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("song {}", id)));
        }
        Ok(())
    }

    fn select(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<SongRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                    row.get(9)?,
                ))
            })?
            .collect::<std::result::Result<Vec<SongRow>, _>>()?;

        rows.into_iter().map(song_from_row).collect()
    }
}

impl Catalog for Store {
    fn visible_songs(&self) -> Result<Vec<SongRecord>> {
        let sql = format!("{} WHERE visible {}", SELECT_SONGS, ORDER_SONGS);
        self.select(&sql, params![])
    }
}

fn insert_song(conn: &Connection, song: &SongRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO songs VALUES (
            ?::UUID, ?, ?, ?, ?, ?, ?, ?::TIMESTAMP, ?::TIMESTAMP, ?
        )
        "#,
        params![
            song.id.to_string(),
            song.title,
            song.album,
            song.artist,
            song.track,
            song.time,
            song.play_count,
            timestamp_literal(&song.date_added),
            song.last_queued.as_ref().map(timestamp_literal),
            song.visible,
        ],
    )?;
    Ok(())
}

/// Naive UTC literal DuckDB parses into TIMESTAMP.
fn timestamp_literal(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or_else(|| Error::Storage(format!("invalid timestamp {}", micros)))
}

fn song_from_row(row: SongRow) -> Result<SongRecord> {
    let (id, title, album, artist, track, time, play_count, date_added, last_queued, visible) = row;
    Ok(SongRecord {
        id: Uuid::parse_str(&id).map_err(|e| Error::Storage(format!("invalid song id {}: {}", id, e)))?,
        title,
        album,
        artist,
        track,
        time,
        play_count,
        date_added: from_micros(date_added)?,
        last_queued: last_queued.map(from_micros).transpose()?,
        visible,
    })
}
