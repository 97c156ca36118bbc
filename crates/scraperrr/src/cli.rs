use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use gradient::Antialiasing;

use crate::settings::antialiasing_from;

#[derive(Parser, Debug)]
#[command(
    name = "scraperrr",
    author,
    version,
    about = "Daily intelligence feed over an animated gradient",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub backend: BackendArgs,
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by the feed view and every subcommand.
#[derive(Parser, Debug, Default)]
pub struct BackendArgs {
    /// Configuration file (defaults to `config.toml` in the config directory).
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the Supabase project serving the article table.
    #[arg(
        long,
        value_name = "URL",
        env = "SCRAPERRR_SUPABASE_URL",
        global = true
    )]
    pub supabase_url: Option<String>,

    /// Anonymous API key; can also be supplied via `SCRAPERRR_SUPABASE_KEY`.
    #[arg(
        long,
        value_name = "KEY",
        env = "SCRAPERRR_SUPABASE_KEY",
        hide_env_values = true,
        global = true
    )]
    pub supabase_key: Option<String>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Skip the gradient window and print the feed to the terminal.
    #[arg(long)]
    pub no_gradient: bool,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap for the gradient (0=vsync).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the feed and print it as a chat, notes, email or report payload.
    Digest(DigestArgs),
    /// Inspect configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct DigestArgs {
    #[arg(long, value_enum, default_value_t = DigestFormat::Slack)]
    pub format: DigestFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestFormat {
    /// Block Kit message with the first ten articles.
    Slack,
    /// One page-properties object per article.
    Notion,
    /// HTML email body with the first five articles.
    Email,
    /// Standalone HTML report with every article.
    Report,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration directory and file.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    feedconfig::parse_antialias(value).map(antialiasing_from)
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid fps '{value}'"))?;
    feedconfig::check_fps(fps)
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    feedconfig::parse_surface_size(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "scraperrr",
            "--no-gradient",
            "--size",
            "800x600",
            "--fps",
            "30",
            "--antialias",
            "off",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert!(cli.run.no_gradient);
        assert_eq!(cli.run.size, Some((800, 600)));
        assert_eq!(cli.run.fps, Some(30.0));
        assert_eq!(cli.run.antialias, Some(Antialiasing::Off));
    }

    #[test]
    fn backend_flags_reach_subcommands() {
        let cli = Cli::try_parse_from([
            "scraperrr",
            "digest",
            "--format",
            "notion",
            "--supabase-url",
            "https://demo.supabase.co",
            "--supabase-key",
            "anon",
        ])
        .unwrap();
        let Some(Command::Digest(args)) = cli.command else {
            panic!("expected digest command");
        };
        assert_eq!(args.format, DigestFormat::Notion);
        assert_eq!(
            cli.backend.supabase_url.as_deref(),
            Some("https://demo.supabase.co")
        );
        assert_eq!(cli.backend.supabase_key.as_deref(), Some("anon"));
    }

    #[test]
    fn digest_accepts_html_formats() {
        for (flag, format) in [("email", DigestFormat::Email), ("report", DigestFormat::Report)] {
            let cli = Cli::try_parse_from(["scraperrr", "digest", "--format", flag]).unwrap();
            let Some(Command::Digest(args)) = cli.command else {
                panic!("expected digest command");
            };
            assert_eq!(args.format, format);
        }
    }

    #[test]
    fn antialias_parser_accepts_modes() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("4").unwrap(), Antialiasing::Samples(4));
        assert_eq!(parse_antialias("0").unwrap(), Antialiasing::Off);
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn fps_flag_rejects_tiny_or_infinite_caps() {
        assert_eq!(parse_fps("0").unwrap(), 0.0);
        assert_eq!(parse_fps("60").unwrap(), 60.0);
        assert!(parse_fps("1e-20").is_err());
        assert!(parse_fps("inf").is_err());
        assert!(parse_fps("fast").is_err());
        assert!(Cli::try_parse_from(["scraperrr", "--fps", "0.001"]).is_err());
    }

    #[test]
    fn rejects_bad_size() {
        assert!(Cli::try_parse_from(["scraperrr", "--size", "wide"]).is_err());
    }
}
