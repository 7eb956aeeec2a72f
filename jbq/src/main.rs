//! jbq: Jukebox Query - CLI for importing songs and filtering the catalog.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "jbq")]
#[command(about = "Jukebox Query - import songs and filter the catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the catalog database
    Init,

    /// Import songs from a JSON array of song records
    Import {
        /// Path to the JSON file
        file: String,

        /// Suppress informational output
        #[arg(short = 'q', long = "quiet")]
        quiet: bool,
    },

    /// Add a single song
    Add {
        /// Song title
        title: String,

        /// Album name
        #[arg(short = 'a', long = "album", default_value = "")]
        album: String,

        /// Artist name
        #[arg(short = 'r', long = "artist", default_value = "")]
        artist: String,

        /// Track number
        #[arg(short = 'n', long = "track", default_value = "0")]
        track: i64,

        /// Duration as [[h:]m:]s (e.g., 3:05)
        #[arg(short = 't', long = "time")]
        time: Option<String>,
    },

    /// List every song, hidden ones included
    #[command(visible_alias = "ls")]
    List {
        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Run a structured filter (e.g., k=and k_0=title k_0_r=in k_0_f0=love)
    #[command(visible_alias = "f")]
    Filter {
        /// Criteria as key=value pairs
        criteria: Vec<String>,

        /// Criteria as a URL query string (e.g., "k=title&k_r=is&k_f0=Foo")
        #[arg(short = 'Q', long = "query")]
        query: Option<String>,

        /// Root address of the filter (default from config, usually "k")
        #[arg(short = 'p', long = "prefix")]
        prefix: Option<String>,

        /// Print the parsed filter expression to stderr
        #[arg(short = 'e', long = "explain")]
        explain: bool,

        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Keyword search over title, album and artist
    #[command(visible_alias = "s")]
    Search {
        /// Words that must all appear
        words: Vec<String>,

        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one song
    Show {
        /// Song id
        id: String,
    },

    /// Hide a song from searches
    Hide {
        /// Song id
        id: String,
    },

    /// Make a hidden song searchable again
    Unhide {
        /// Song id
        id: String,
    },

    /// Record that a song was queued just now
    Queued {
        /// Song id
        id: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("JUKEBOX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init(),
        Commands::Import { file, quiet } => commands::import(&file, quiet),
        Commands::Add { title, album, artist, track, time } => {
            commands::add(&title, &album, &artist, track, time.as_deref())
        }
        Commands::List { format } => commands::list(format),
        Commands::Filter { criteria, query, prefix, explain, format } => {
            commands::filter(&criteria, query.as_deref(), prefix.as_deref(), explain, format)
        }
        Commands::Search { words, format } => commands::search(&words, format),
        Commands::Show { id } => commands::show(&id),
        Commands::Hide { id } => commands::set_visible(&id, false),
        Commands::Unhide { id } => commands::set_visible(&id, true),
        Commands::Queued { id } => commands::queued(&id),
    };

    match result {
        Ok(()) => {}
        Err(commands::CliError::Rejected(errors)) => {
            for error in &errors {
                eprintln!("Invalid value: {}", error);
            }
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
