use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use articles::{Article, ArticleClient, BackendConfig, FeedError, FeedLoad, FeedLoader};
use chrono::{Datelike, Local};
use crossbeam_channel::{never, select};
use feedconfig::FeedConfig;
use gradient::GradientRuntime;
use tracing_subscriber::EnvFilter;

use crate::cli::{BackendArgs, RunArgs};
use crate::paths::AppPaths;
use crate::settings::Settings;
use crate::view::{Reaction, RootView};

/// Upper bound on how long the root loop sleeps with nothing scheduled.
const IDLE_WAIT: Duration = Duration::from_secs(60);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file and layers the command line over it.
pub fn load_settings(backend: &BackendArgs, run: &RunArgs) -> Result<Settings> {
    let paths = AppPaths::discover()?;
    let config_file = backend
        .config
        .clone()
        .unwrap_or_else(|| paths.config_file());
    let config = load_config(&config_file, backend.config.is_some())?;
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        config_file = %config_file.display(),
        "resolved scraperrr paths"
    );
    Settings::resolve(&config, backend, run)
}

fn load_config(path: &Path, explicit: bool) -> Result<FeedConfig> {
    if explicit && !path.exists() {
        anyhow::bail!("config file {} does not exist", path.display());
    }
    FeedConfig::load(path).with_context(|| format!("failed to load {}", path.display()))
}

pub fn run(backend: BackendArgs, args: RunArgs) -> Result<()> {
    let settings = load_settings(&backend, &args)?;
    let client = build_client(settings.backend.as_ref())?;
    let mut view = RootView::new(&settings, Local::now().year(), Instant::now());

    let surface = match GradientRuntime::attach(settings.gradient.clone()) {
        Ok(surface) => surface,
        Err(err) => {
            tracing::warn!(error = %err, "gradient surface unavailable; printing feed instead");
            None
        }
    };

    match surface {
        Some(surface) => run_with_surface(&mut view, surface, client),
        None => {
            run_headless(&mut view, client);
            Ok(())
        }
    }
}

pub fn build_client(backend: Option<&BackendConfig>) -> Result<Option<ArticleClient>> {
    match backend {
        Some(config) => {
            tracing::info!(
                url = %config.base_url,
                table = %config.table,
                "reading articles from backend"
            );
            Ok(Some(
                ArticleClient::new(config.clone()).context("failed to construct article client")?,
            ))
        }
        None => Ok(None),
    }
}

fn missing_backend() -> FeedError {
    FeedError::Config("no backend url/key configured".into())
}

/// Fetches once, prints the page, and returns.
fn run_headless(view: &mut RootView, client: Option<ArticleClient>) {
    let now = Instant::now();
    match client {
        Some(client) => view.fetch(&client, now),
        None => view.apply_feed(Err(missing_backend()), now),
    }
    print!("{}", view.page());
}

fn run_with_surface(
    view: &mut RootView,
    surface: GradientRuntime,
    client: Option<ArticleClient>,
) -> Result<()> {
    print!("{}", view.page());

    let mut load: Option<FeedLoad> = match client {
        Some(client) => Some(FeedLoader::spawn(client).context("failed to start feed loader")?),
        None => {
            view.apply_feed(Err(missing_backend()), Instant::now());
            print!("{}", view.page());
            None
        }
    };

    loop {
        let feed_rx = load
            .as_ref()
            .map(|load| load.receiver().clone())
            .unwrap_or_else(never::<Result<Vec<Article>, FeedError>>);
        let wait = view
            .autoplay_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_WAIT);

        select! {
            recv(feed_rx) -> message => {
                load = None;
                let result = message.unwrap_or(Err(FeedError::Disconnected));
                view.apply_feed(result, Instant::now());
                print!("{}", view.page());
                refresh_title(view, &surface);
            }
            recv(surface.signals()) -> signal => {
                let Ok(signal) = signal else {
                    tracing::debug!("gradient surface stopped sending signals");
                    break;
                };
                match view.handle_signal(signal, Instant::now()) {
                    Reaction::Nothing => {}
                    Reaction::FocusChanged => announce_focus(view, &surface),
                    Reaction::Activated(href) => {
                        tracing::info!(%href, "opening article");
                        println!("{href}");
                    }
                    Reaction::Exit => break,
                }
            }
            default(wait) => {
                if view.tick(Instant::now()) {
                    announce_focus(view, &surface);
                }
            }
        }
    }

    if let Some(load) = load.take() {
        tracing::debug!("root view closed before the feed arrived; cancelling load");
        load.cancel();
    }
    surface.shutdown()
}

fn announce_focus(view: &RootView, surface: &GradientRuntime) {
    if let Some(line) = view.focus_line() {
        println!("{line}");
    }
    refresh_title(view, surface);
}

fn refresh_title(view: &RootView, surface: &GradientRuntime) {
    if let Err(err) = surface.set_title(view.title()) {
        tracing::debug!(error = %err, "failed to update window title");
    }
}
