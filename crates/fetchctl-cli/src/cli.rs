//! Argument parsing and command dispatch.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use fetchctl_config::{ConfigLoader, PanelConfig, UrlValidation};
use fetchctl_telemetry::{LogFormat, LoggingConfig, init_logging};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult, build_client, parse_url};
use crate::commands::health::{handle_health, handle_links, handle_ready};
use crate::commands::torrents::{handle_add, handle_list};
use crate::commands::watch::handle_watch;

const DEFAULT_LOG_LEVEL: &str = "warn";
const BUILD_SHA: &str = match option_env!("FETCHCTL_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Parses CLI arguments, executes the requested command and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli);

    let request_id = Uuid::new_v4().to_string();
    debug!(command = command_label(&cli.command), %request_id, "dispatching");

    match dispatch(cli, &request_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn install_logging(cli: &Cli) {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
        build_sha: BUILD_SHA,
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err}");
    }
}

async fn dispatch(cli: Cli, request_id: &str) -> CliResult<()> {
    let loaded = load_config(cli.config.as_deref())?;
    let config = apply_overrides(loaded, &cli);
    let base_url = config
        .api
        .base_url()
        .map_err(|err| CliError::validation(err.to_string()))?;
    let client = build_client(request_id, config.api.request_timeout())?;

    let ctx = AppContext {
        client,
        base_url,
        config,
    };

    match cli.command {
        Command::Add(args) => handle_add(&ctx, args, cli.output).await,
        Command::Ls => handle_list(&ctx, cli.output).await,
        Command::Watch(args) => handle_watch(&ctx, args).await,
        Command::Health => handle_health(&ctx).await,
        Command::Ready => handle_ready(&ctx).await,
        Command::Links => handle_links(&ctx, cli.output),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<PanelConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = path {
        loader = loader.with_file(path);
    }
    loader
        .with_process_env()
        .load()
        .map_err(|err| CliError::validation(err.to_string()))
}

/// Flags win over the file and the environment.
fn apply_overrides(mut config: PanelConfig, cli: &Cli) -> PanelConfig {
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.to_string();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.api.request_timeout_ms = (timeout_ms > 0).then_some(timeout_ms);
    }
    config
}

#[derive(Parser)]
#[command(
    name = "fetchctl",
    version,
    about = "Control panel for the fetch-api downloader connector"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "FETCHCTL_CONFIG",
        help = "JSON configuration file"
    )]
    pub(crate) config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_parser = parse_url,
        help = "Backend base URL (overrides FETCHCTL_API_URL)"
    )]
    pub(crate) api_url: Option<Url>,
    #[arg(
        long = "timeout-ms",
        global = true,
        help = "Per-request timeout in milliseconds; 0 waits indefinitely"
    )]
    pub(crate) timeout_ms: Option<u64>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "FETCHCTL_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL
    )]
    pub(crate) log_level: String,
    #[arg(
        long,
        global = true,
        value_parser = parse_log_format,
        default_value = "pretty"
    )]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Submit a torrent URL or magnet link.
    Add(AddArgs),
    /// Print the current torrent list.
    Ls,
    /// Follow the torrent list, marking entering (+) and exiting (-) items.
    Watch(WatchArgs),
    /// Query the liveness endpoint.
    Health,
    /// Query the readiness endpoint.
    Ready,
    /// Print the media server and download manager links.
    Links,
}

#[derive(Args, Default)]
pub(crate) struct AddArgs {
    #[arg(help = "Torrent URL or magnet link")]
    pub(crate) url: String,
    #[arg(long, help = "Download directory (defaults to the configured save path)")]
    pub(crate) save_path: Option<String>,
    #[arg(long, help = "Download manager category")]
    pub(crate) category: Option<String>,
    #[arg(long, help = "Comma-separated tags")]
    pub(crate) tags: Option<String>,
    #[arg(long, help = "Do not hand the finished download to the media server")]
    pub(crate) no_manage: bool,
    #[arg(long, help = "Skip the completion notification")]
    pub(crate) no_notify: bool,
    #[arg(long, help = "Look up subtitles after completion")]
    pub(crate) find_subs: bool,
    #[arg(
        long,
        value_parser = parse_url_validation,
        help = "URL check: lenient (any non-blank value) or strict (http/https only)"
    )]
    pub(crate) url_validation: Option<UrlValidation>,
}

#[derive(Args, Default)]
pub(crate) struct WatchArgs {
    #[arg(long, help = "Exit after this many list updates")]
    pub(crate) updates: Option<usize>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse::<LogFormat>().map_err(|err| err.to_string())
}

fn parse_url_validation(value: &str) -> Result<UrlValidation, String> {
    value
        .parse::<UrlValidation>()
        .map_err(|err| err.to_string())
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Add(_) => "add",
        Command::Ls => "ls",
        Command::Watch(_) => "watch",
        Command::Health => "health",
        Command::Ready => "ready",
        Command::Links => "links",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fetchctl").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn add_arguments_parse() {
        let cli = parse(&[
            "add",
            "magnet:?xt=urn:btih:abc",
            "--tags",
            "movies,4k",
            "--no-notify",
            "--find-subs",
            "--url-validation",
            "strict",
            "--output",
            "json",
        ]);
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Add(args) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(args.url, "magnet:?xt=urn:btih:abc");
        assert_eq!(args.tags.as_deref(), Some("movies,4k"));
        assert!(args.no_notify);
        assert!(!args.no_manage);
        assert!(args.find_subs);
        assert_eq!(args.url_validation, Some(UrlValidation::Strict));
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let argv = ["fetchctl", "--api-url", "ftp://files.example", "ls"];
        assert!(Cli::try_parse_from(argv).is_err());
        let argv = ["fetchctl", "--log-format", "xml", "ls"];
        assert!(Cli::try_parse_from(argv).is_err());
        let argv = ["fetchctl", "add", "x", "--url-validation", "paranoid"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn flags_override_loaded_config() {
        let cli = parse(&["--api-url", "http://10.0.0.2:9000/", "--timeout-ms", "0", "ls"]);
        let mut loaded = PanelConfig::default();
        loaded.api.request_timeout_ms = Some(5_000);

        let config = apply_overrides(loaded, &cli);
        assert_eq!(config.api.base_url, "http://10.0.0.2:9000/");
        assert!(config.api.request_timeout().is_none());

        let cli = parse(&["--timeout-ms", "2500", "health"]);
        let config = apply_overrides(PanelConfig::default(), &cli);
        assert_eq!(config.api.request_timeout_ms, Some(2_500));
        assert_eq!(config.api.base_url, PanelConfig::default().api.base_url);
    }

    #[test]
    fn command_labels_match_variants() {
        assert_eq!(command_label(&Command::Ls), "ls");
        assert_eq!(command_label(&Command::Add(AddArgs::default())), "add");
        assert_eq!(command_label(&Command::Watch(WatchArgs::default())), "watch");
        assert_eq!(command_label(&Command::Links), "links");
    }

    #[test]
    fn config_file_is_loaded_before_flags() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        std::io::Write::write_all(
            &mut file,
            br#"{"api": {"base_url": "http://nas.local:9000/"}, "polling": {"active_interval_ms": 2000}}"#,
        )
        .expect("write config");

        let config = load_config(Some(file.path())).expect("config loads");
        assert_eq!(config.polling.active_interval_ms, 2_000);

        let cli = parse(&["--timeout-ms", "750", "ls"]);
        let config = apply_overrides(config, &cli);
        assert_eq!(config.api.request_timeout_ms, Some(750));
    }

    #[test]
    fn config_file_errors_are_validation_failures() {
        let missing = Path::new("/definitely/missing/fetchctl.json");
        let err = load_config(Some(missing)).expect_err("missing file");
        assert_eq!(err.exit_code(), 2);
    }
}
