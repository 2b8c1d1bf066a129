mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use shinchoku_api::anilist::{load_token, AniListClient, ClientOptions};
use shinchoku_core::cache::ProgressCache;
use shinchoku_core::config::{AppConfig, UpdatePolicy};
use shinchoku_core::error::CoreError;
use shinchoku_core::orchestrator::{Action, Invocation, OutputLine, Updater};

/// Update AniList progress for a played file.
///
/// Prints `OSD: <text>` lines for the player's on-screen display and
/// `OPEN: <url>` when a page should be opened. Logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "shinchoku", version)]
struct Args {
    /// Path or URL of the played file.
    path: String,

    #[arg(value_enum, default_value_t = ActionArg::Update)]
    action: ActionArg,

    /// Player options as a JSON object, e.g. '{"ADD_ENTRY_IF_MISSING": true}'.
    options: Option<String>,

    /// Media title to use instead of parsing the path (streams).
    #[arg(long)]
    title: Option<String>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    token_file: Option<PathBuf>,

    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Also write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ActionArg {
    Update,
    Launch,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Update => Action::Update,
            ActionArg::Launch => Action::Launch,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = logging::init(args.verbose, args.log_file.as_deref());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            println!("{}", OutputLine::Osd(format!("Failed to start: {e}")));
            return ExitCode::FAILURE;
        }
    };

    let lines = runtime.block_on(run(&args));
    for line in lines {
        println!("{line}");
    }
    ExitCode::SUCCESS
}

async fn run(args: &Args) -> Vec<OutputLine> {
    match setup(args) {
        Ok((mut updater, invocation)) => updater.run(&invocation).await,
        Err(e) => {
            tracing::warn!(error = %e, "Setup failed");
            vec![OutputLine::Osd(e.to_string())]
        }
    }
}

fn setup(args: &Args) -> Result<(Updater<AniListClient>, Invocation), CoreError> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(path) = &args.token_file {
        config.paths.token_file = Some(path.clone());
    }
    if let Some(path) = &args.cache_file {
        config.paths.cache_file = Some(path.clone());
    }

    let policy = UpdatePolicy::from_json(args.options.as_deref().unwrap_or_default())?;

    let token_path = config.token_path();
    let token = load_token(&token_path).map_err(|e| CoreError::Config(e.to_string()))?;
    if token.is_none() {
        tracing::warn!(
            path = %token_path.display(),
            "No AniList token, list state and updates are unavailable"
        );
    }

    let client = AniListClient::new(
        token,
        ClientOptions {
            api_url: config.anilist.api_url.clone(),
            timeout: config.request_timeout(),
            min_episode_duration: config.resolver.min_episode_duration,
        },
    )
    .map_err(|e| CoreError::api(&e))?;

    let cache = ProgressCache::load(
        &config.cache_path(),
        config.cache.ttl_hours,
        config.cache.max_entries,
    )?;

    let invocation = Invocation {
        path: args.path.clone(),
        action: args.action.into(),
        title_override: args.title.clone(),
        policy,
    };
    Ok((Updater::new(client, cache, &config), invocation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::try_parse_from(["shinchoku", "/anime/Frieren - 01.mkv"]).unwrap();
        assert_eq!(args.path, "/anime/Frieren - 01.mkv");
        assert_eq!(args.action, ActionArg::Update);
        assert!(args.options.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_player_invocation() {
        let args = Args::try_parse_from([
            "shinchoku",
            "https://example.com/watch",
            "launch",
            r#"{"ADD_ENTRY_IF_MISSING": true}"#,
            "--title",
            "Sousou no Frieren",
            "-v",
        ])
        .unwrap();
        assert_eq!(Action::from(args.action), Action::Launch);
        assert_eq!(args.options.as_deref(), Some(r#"{"ADD_ENTRY_IF_MISSING": true}"#));
        assert_eq!(args.title.as_deref(), Some("Sousou no Frieren"));
        assert!(args.verbose);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(Args::try_parse_from(["shinchoku", "a.mkv", "delete"]).is_err());
    }
}
