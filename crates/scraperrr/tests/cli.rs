use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn scraperrr(config_dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scraperrr"))
        .env("SCRAPERRR_CONFIG_DIR", config_dir)
        .env_remove("SCRAPERRR_SUPABASE_URL")
        .env_remove("SCRAPERRR_SUPABASE_KEY")
        .env_remove("WAYLAND_DISPLAY")
        .env_remove("DISPLAY")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run scraperrr")
}

#[test]
fn config_where_reports_directories() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");

    let output = scraperrr(&config_dir, &["config", "where"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&config_dir.display().to_string()));
    assert!(stdout.contains("config.toml (missing)"));

    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "").unwrap();
    let output = scraperrr(&config_dir, &["config", "where"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("(missing)"));
}

#[test]
fn headless_run_without_backend_shows_empty_feed() {
    let root = TempDir::new().unwrap();
    let output = scraperrr(root.path(), &["--no-gradient"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("SCRAPERRR\nDaily Intelligence Feed\n"));
    assert!(stdout.contains("No articles found. Run the scraper!"));
    assert!(stdout.contains("Scraperrr Systems."));
}

#[cfg(all(unix, not(target_os = "macos")))]
#[test]
fn gradient_without_display_prints_page_once() {
    let root = TempDir::new().unwrap();
    let output = scraperrr(root.path(), &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("SCRAPERRR\nDaily Intelligence Feed\n").count(), 1);
    assert!(stdout.contains("No articles found. Run the scraper!"));
    assert!(!stdout.contains("Initializing Feed..."));
}

#[test]
fn unreachable_backend_falls_back_to_empty_feed() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("config.toml"),
        "[backend]\nurl = \"http://127.0.0.1:9\"\nanon_key = \"anon\"\n\n[gradient]\nenabled = false\n",
    )
    .unwrap();

    let output = scraperrr(root.path(), &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No articles found. Run the scraper!"));
}

#[test]
fn digest_requires_backend() {
    let root = TempDir::new().unwrap();
    let output = scraperrr(root.path(), &["digest", "--format", "slack"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no backend configured"));
}

#[test]
fn invalid_config_is_reported() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("config.toml"), "[gradient]\nfps = -5\n").unwrap();
    let output = scraperrr(root.path(), &["--no-gradient"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("gradient.fps"));
}

#[test]
fn explicit_missing_config_file_is_an_error() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("nope.toml");
    let output = scraperrr(
        root.path(),
        &["--config", missing.to_str().unwrap(), "--no-gradient"],
    );
    assert!(!output.status.success());
}
