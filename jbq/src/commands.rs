//! CLI command implementations.

use chrono::Utc;
use clap::ValueEnum;
use tracing::debug;
use uuid::Uuid;

use catalog::filter::{build, parse_duration};
use catalog::{init, run_filter, Config, FilterOutcome, Namespace, SongRecord, Store, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] catalog::Error),

    #[error("invalid criterion {0:?} (expected key=value)")]
    BadCriterion(String),

    #[error("invalid song id {0:?}")]
    BadId(String),

    #[error("invalid duration {0:?}")]
    BadDuration(String),

    #[error("filter rejected: {} invalid value(s)", .0.len())]
    Rejected(Vec<ValidationError>),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// How songs are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Titles,
}

fn open_store() -> Result<Store> {
    let config = Config::load()?;
    debug!(root = %config.root.display(), "opening catalog");
    Ok(Store::open(config)?)
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| CliError::BadId(id.to_string()))
}

pub fn init() -> Result<()> {
    let config = Config::load()?;

    if init::is_initialized(&config) {
        println!("Catalog already initialized at {}", config.root.display());
        return Ok(());
    }

    init::initialize(&config)?;
    println!("Catalog initialized at {}", config.root.display());
    Ok(())
}

pub fn import(path: &str, quiet: bool) -> Result<()> {
    let store = open_store()?;
    let contents = std::fs::read_to_string(path).map_err(catalog::Error::from)?;
    let songs: Vec<SongRecord> = serde_json::from_str(&contents).map_err(catalog::Error::from)?;

    let count = store.add_songs(&songs)?;
    if !quiet {
        println!("Imported {} songs", count);
    }
    Ok(())
}

pub fn add(title: &str, album: &str, artist: &str, track: i64, time: Option<&str>) -> Result<()> {
    let store = open_store()?;

    let seconds = match time {
        Some(text) => parse_duration(text).map_err(|_| CliError::BadDuration(text.to_string()))?,
        None => 0,
    };

    let song = SongRecord::new(title, album, artist)
        .with_track(track)
        .with_time(seconds);
    store.add_song(&song)?;
    println!("{}", song.id);
    Ok(())
}

pub fn list(format: OutputFormat) -> Result<()> {
    let store = open_store()?;
    let songs = store.all_songs()?;
    if songs.is_empty() && format != OutputFormat::Json {
        println!("No songs in the catalog yet.");
        return Ok(());
    }
    print_songs(&songs, format, store.config().result_limit)
}

/// Build a namespace from an optional query string plus `key=value` pairs.
/// Pairs override query-string entries with the same key.
fn criteria_namespace(criteria: &[String], query: Option<&str>) -> Result<Namespace> {
    let mut ns = query.map(Namespace::from_query_string).unwrap_or_default();
    for criterion in criteria {
        let (key, value) = criterion
            .split_once('=')
            .ok_or_else(|| CliError::BadCriterion(criterion.clone()))?;
        ns.insert(key, value);
    }
    Ok(ns)
}

pub fn filter(
    criteria: &[String],
    query: Option<&str>,
    prefix: Option<&str>,
    explain: bool,
    format: OutputFormat,
) -> Result<()> {
    let ns = criteria_namespace(criteria, query)?;
    let store = open_store()?;
    let prefix = prefix.unwrap_or(&store.config().filter_prefix).to_string();
    let now = Utc::now();
    debug!(prefix = %prefix, keys = ns.len(), "running filter");

    if explain {
        let built = build(&ns, &prefix, now.date_naive()).map_err(catalog::Error::from)?;
        match &built.node {
            Some(node) => eprintln!("Filter: {}", node),
            None => eprintln!("Filter: (none)"),
        }
    }

    match run_filter(&ns, &prefix, &store, now)? {
        FilterOutcome::Rejected(errors) => Err(CliError::Rejected(errors)),
        FilterOutcome::Filtered { songs, criteria } => {
            eprintln!("{} criteria, {} matching songs", criteria, songs.len());
            print_songs(&songs, format, store.config().result_limit)
        }
        FilterOutcome::Unfiltered(songs) => {
            eprintln!("No criteria given; showing all songs");
            print_songs(&songs, format, store.config().result_limit)
        }
    }
}

pub fn search(words: &[String], format: OutputFormat) -> Result<()> {
    let store = open_store()?;
    let query = words.join(" ");
    let songs = catalog::search(&store, &query)?;
    if songs.is_empty() && format != OutputFormat::Json {
        println!("No matching songs.");
        return Ok(());
    }
    print_songs(&songs, format, store.config().result_limit)
}

pub fn show(id: &str) -> Result<()> {
    let store = open_store()?;
    let id = parse_id(id)?;
    let song = store
        .song(id)?
        .ok_or_else(|| catalog::Error::NotFound(format!("song {}", id)))?;

    println!("ID:          {}", song.id);
    println!("Title:       {}", song.title);
    println!("Album:       {}", song.album);
    println!("Artist:      {}", song.artist);
    println!("Track:       {}", song.track);
    println!("Time:        {}", song.time_string());
    println!("Play count:  {}", song.play_count);
    println!("Date added:  {}", song.date_added.format("%Y-%m-%d %H:%M:%S"));
    match song.last_queued {
        Some(ts) => println!("Last queued: {}", ts.format("%Y-%m-%d %H:%M:%S")),
        None => println!("Last queued: never"),
    }
    println!("Visible:     {}", song.visible);
    Ok(())
}

pub fn set_visible(id: &str, visible: bool) -> Result<()> {
    let store = open_store()?;
    store.set_visible(parse_id(id)?, visible)?;
    Ok(())
}

pub fn queued(id: &str) -> Result<()> {
    let store = open_store()?;
    store.mark_queued(parse_id(id)?, Utc::now())?;
    Ok(())
}

fn print_songs(songs: &[SongRecord], format: OutputFormat, limit: Option<usize>) -> Result<()> {
    let shown = &songs[..limit.unwrap_or(songs.len()).min(songs.len())];

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(shown).map_err(catalog::Error::from)?;
            println!("{}", json);
        }
        OutputFormat::Titles => {
            for song in shown {
                println!("{}", song.title);
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<36} {:<28} {:<24} {:<24} {:>5} {:>8} {:>6}",
                "ID", "TITLE", "ARTIST", "ALBUM", "TRACK", "TIME", "PLAYS"
            );
            println!("{}", "-".repeat(137));
            for song in shown {
                let hidden = if song.visible { "" } else { " (hidden)" };
                println!(
                    "{:<36} {:<28} {:<24} {:<24} {:>5} {:>8} {:>6}{}",
                    song.id,
                    truncate(&song.title, 28),
                    truncate(&song.artist, 24),
                    truncate(&song.album, 24),
                    song.track,
                    song.time_string(),
                    song.play_count,
                    hidden
                );
            }
        }
    }

    if shown.len() < songs.len() {
        eprintln!("({} more not shown)", songs.len() - shown.len());
    }
    Ok(())
}

/// Truncate to `width` characters, marking the cut with "...".
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
