mod cli;
mod paths;
mod present;
mod rail;
mod run;
mod settings;
mod view;

use anyhow::{Context, Result};
use articles::{
    email_html, html_report, notion_properties, slack_blocks, ArticleSource, ARTICLE_LIMIT,
};
use chrono::{Datelike, Local};
use cli::{BackendArgs, Command, ConfigAction, DigestArgs, DigestFormat};
use paths::AppPaths;
use serde_json::Value;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Digest(args)) => run_digest(&cli.backend, args),
        Some(Command::Config(config_cmd)) => handle_config_command(&cli.backend, config_cmd.action),
        None => run::run(cli.backend, cli.run),
    }
}

fn run_digest(backend: &BackendArgs, args: DigestArgs) -> Result<()> {
    let settings = run::load_settings(backend, &Default::default())?;
    let config = settings.require_backend()?;
    let client = run::build_client(Some(config))?.context("article client unavailable")?;
    let articles = client
        .fetch_recent(ARTICLE_LIMIT)
        .context("failed to fetch articles")?;
    tracing::info!(count = articles.len(), format = ?args.format, "building digest");

    let now = Local::now();
    let payload = match args.format {
        DigestFormat::Slack => slack_blocks(&articles, now.date_naive()),
        DigestFormat::Notion => Value::Array(articles.iter().map(notion_properties).collect()),
        DigestFormat::Email => {
            print!("{}", email_html(&articles, now.year()));
            return Ok(());
        }
        DigestFormat::Report => {
            print!("{}", html_report(&articles, now));
            return Ok(());
        }
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn handle_config_command(backend: &BackendArgs, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Where => {
            let paths = AppPaths::discover()?;
            let file = backend
                .config
                .clone()
                .unwrap_or_else(|| paths.config_file());
            println!("Configuration:");
            println!("  config dir:  {}", paths.config_dir().display());
            println!(
                "  config file: {}{}",
                file.display(),
                if file.exists() { "" } else { " (missing)" }
            );
            Ok(())
        }
    }
}
