//! Integration tests for jbq CLI.

use std::process::Command;
use tempfile::TempDir;

fn jbq_cmd(root: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jbq"));
    cmd.env("JUKEBOX_ROOT", root);
    cmd.env_remove("JUKEBOX_LOG");
    cmd
}

fn init_catalog(root: &std::path::Path) {
    let output = jbq_cmd(root)
        .args(["init"])
        .output()
        .expect("failed to run jbq init");
    assert!(output.status.success(), "jbq init failed: {:?}", output);
}

const SONGS: &str = r#"[
    {"title": "Love Story", "album": "Fearless", "artist": "Taylor Swift", "track": 2, "time": 235},
    {"title": "Lovesick", "album": "Blue", "artist": "Mura Masa", "track": 5, "time": 190},
    {"title": "Other", "album": "Blue", "artist": "Mura Masa", "track": 9, "time": 301},
    {"title": "Hidden Love", "album": "Blue", "artist": "Mura Masa", "track": 7, "visible": false}
]"#;

fn seeded_catalog() -> TempDir {
    let tmp = TempDir::new().unwrap();
    init_catalog(tmp.path());

    let songs_path = tmp.path().join("songs.json");
    std::fs::write(&songs_path, SONGS).unwrap();

    let output = jbq_cmd(tmp.path())
        .args(["import", songs_path.to_str().unwrap()])
        .output()
        .expect("failed to run jbq import");
    assert!(output.status.success(), "jbq import failed: {:?}", output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Imported 4 songs"));
    tmp
}

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn test_init() {
    let tmp = TempDir::new().unwrap();
    init_catalog(tmp.path());

    assert!(tmp.path().join("db/catalog.duckdb").exists());
    assert!(tmp.path().join("config.toml").exists());
}

#[test]
fn test_init_twice_is_harmless() {
    let tmp = TempDir::new().unwrap();
    init_catalog(tmp.path());

    let output = jbq_cmd(tmp.path()).args(["init"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("already initialized"));
}

#[test]
fn test_commands_require_init() {
    let tmp = TempDir::new().unwrap();
    let output = jbq_cmd(tmp.path()).args(["list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not initialized"));
}

#[test]
fn test_filter_and_scenario() {
    let tmp = seeded_catalog();

    let output = jbq_cmd(tmp.path())
        .args([
            "filter", "-f", "titles", "k=and", "k_0=title", "k_0_r=in", "k_0_f0=love", "k_1=track",
            "k_1_r=gte", "k_1_f0=3",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout_lines(&output), vec!["Lovesick"]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("2 criteria, 1 matching songs"));
}

#[test]
fn test_filter_from_query_string() {
    let tmp = seeded_catalog();

    let output = jbq_cmd(tmp.path())
        .args(["filter", "-f", "titles", "-Q", "k=title&k_r=is&k_f0=LOVE+STORY"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout_lines(&output), vec!["Love Story"]);
}

#[test]
fn test_filter_without_criteria_lists_visible_songs() {
    let tmp = seeded_catalog();

    let output = jbq_cmd(tmp.path())
        .args(["filter", "-f", "titles", "k=title", "k_r=in", "k_f0="])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    // Natural order: artist, album, track.
    assert_eq!(stdout_lines(&output), vec!["Lovesick", "Other", "Love Story"]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("No criteria given"));
}

#[test]
fn test_filter_rejects_bad_values() {
    let tmp = seeded_catalog();

    let output = jbq_cmd(tmp.path())
        .args(["filter", "k=track", "k_r=inside", "k_f0=one", "k_f1=two"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("k_f0: invalid integer: 'one'"), "{}", stderr);
    assert!(stderr.contains("k_f1: invalid integer: 'two'"), "{}", stderr);
}

#[test]
fn test_filter_schema_fault() {
    let tmp = seeded_catalog();

    let output = jbq_cmd(tmp.path())
        .args(["filter", "k=genre", "k_r=is", "k_f0=pop"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Malformed filter"));
}

#[test]
fn test_filter_explain() {
    let tmp = seeded_catalog();

    let output = jbq_cmd(tmp.path())
        .args(["filter", "-e", "-f", "titles", "k=nor", "k_0=track", "k_0_r=lte", "k_0_f0=5"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Filter: not (track <= 5)"));
    assert_eq!(stdout_lines(&output), vec!["Other"]);
}

#[test]
fn test_filter_json_output() {
    let tmp = seeded_catalog();

    let output = jbq_cmd(tmp.path())
        .args(["filter", "-f", "json", "k=time", "k_r=gte", "k_f0=5:00"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    let songs: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["title"], "Other");
}

#[test]
fn test_search() {
    let tmp = seeded_catalog();

    let output = jbq_cmd(tmp.path())
        .args(["search", "-f", "titles", "love", "mura"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout_lines(&output), vec!["Lovesick"]);
}

#[test]
fn test_hide_removes_from_filters() {
    let tmp = seeded_catalog();

    let add = jbq_cmd(tmp.path())
        .args(["add", "Fresh", "--artist", "New", "--time", "2:30"])
        .output()
        .unwrap();
    assert!(add.status.success(), "{:?}", add);
    let id = String::from_utf8_lossy(&add.stdout).trim().to_string();

    let titles = |root: &std::path::Path| {
        let output = jbq_cmd(root)
            .args(["filter", "-f", "titles", "k=time", "k_r=is", "k_f0=150"])
            .output()
            .unwrap();
        stdout_lines(&output)
    };
    assert_eq!(titles(tmp.path()), vec!["Fresh"]);

    let hide = jbq_cmd(tmp.path()).args(["hide", &id]).output().unwrap();
    assert!(hide.status.success(), "{:?}", hide);
    assert!(titles(tmp.path()).is_empty());
}

#[test]
fn test_queued_feeds_last_queued_filter() {
    let tmp = seeded_catalog();

    let add = jbq_cmd(tmp.path()).args(["add", "Played"]).output().unwrap();
    let id = String::from_utf8_lossy(&add.stdout).trim().to_string();

    let queued = jbq_cmd(tmp.path()).args(["queued", &id]).output().unwrap();
    assert!(queued.status.success(), "{:?}", queued);

    let output = jbq_cmd(tmp.path())
        .args(["filter", "-f", "titles", "k=last_queued", "k_r=last", "k_f0=1", "k_f1=hour"])
        .output()
        .unwrap();
    assert_eq!(stdout_lines(&output), vec!["Played"]);

    let show = jbq_cmd(tmp.path()).args(["show", &id]).output().unwrap();
    assert!(String::from_utf8_lossy(&show.stdout).contains("Play count:  1"));
}

#[test]
fn test_unknown_format_fails_on_empty_catalog() {
    let tmp = TempDir::new().unwrap();
    init_catalog(tmp.path());

    for command in ["list", "search"] {
        let output = jbq_cmd(tmp.path())
            .args([command, "-f", "bogus"])
            .output()
            .unwrap();
        assert!(!output.status.success(), "{} accepted a bad format", command);
        assert!(output.stdout.is_empty());
        assert!(String::from_utf8_lossy(&output.stderr).contains("bogus"));
    }
}

#[test]
fn test_bad_song_id() {
    let tmp = seeded_catalog();

    let output = jbq_cmd(tmp.path()).args(["hide", "not-a-uuid"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid song id"));
}
