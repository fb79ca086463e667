use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use config::{Config, Environment, File, FileFormat};
use log::{LevelFilter, error, info};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use jobboard::api;
use jobboard::auth::{AuthConfig, PasswordHasher, TokenIssuer};
use jobboard::db::Database;

const APP_NAME: &str = "jobboard";

/// Environment overrides look like `JOBBOARD__SERVER__PORT=8080`.
const ENV_PREFIX: &str = "JOBBOARD";

const REDACTED: &str = "<redacted>";

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let config_file = resolve_config_file(cli.global.config.as_deref())?;
    let existed = config_file.exists();
    // Only `serve` needs a usable secret on first run; the other commands
    // must not leave files behind.
    let create_missing = !cli.global.dry_run && matches!(cli.command, Command::Serve(_));
    let config = load_config(&config_file, create_missing)?;

    init_logging(&cli.global, &config.logging);
    if !existed && create_missing {
        info!("Wrote default config to {}", config_file.display());
    }

    let data_dir = match &config.paths.data_dir {
        Some(dir) => expand_path(dir)?,
        None => xdg_dir("XDG_DATA_HOME", dirs::data_dir(), &[".local", "share"])?,
    };

    let ctx = RuntimeContext {
        global: cli.global,
        config_file,
        data_dir,
        config,
    };

    match cli.command {
        Command::Serve(cmd) => serve(ctx, cmd),
        Command::Init(cmd) => handle_init(&ctx, cmd),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), APP_NAME, &mut io::stdout());
            Ok(())
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Jobboard - job postings, applications and favourites API server.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct GlobalOpts {
    /// Config file (or directory holding config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// More logging: -v debug, -vv trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// JSON log lines; `config show` prints JSON
    #[arg(long, global = true, conflicts_with = "yaml")]
    json: bool,
    /// `config show` prints YAML
    #[arg(long, global = true)]
    yaml: bool,
    /// Disable ANSI colors in log output
    #[arg(long = "no-color", global = true)]
    no_color: bool,
    /// Report file writes instead of performing them
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP API server
    Serve(ServeCommand),
    /// Write a default config file with a fresh signing secret
    Init(InitCommand),
    /// Inspect and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Args)]
struct ServeCommand {
    /// Host address to bind to (overrides server.host)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Debug, Clone, Args)]
struct InitCommand {
    /// Overwrite an existing config file
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration, secret masked
    Show,
    /// Print the resolved config file path
    Path,
    /// Regenerate the default configuration file
    Reset,
}

struct RuntimeContext {
    global: GlobalOpts,
    config_file: PathBuf,
    data_dir: PathBuf,
    config: AppConfig,
}

impl RuntimeContext {
    fn database_path(&self) -> Result<PathBuf> {
        match &self.config.database.path {
            Some(path) => expand_path(path),
            None => Ok(self.data_dir.join(format!("{APP_NAME}.db"))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct AppConfig {
    logging: LoggingConfig,
    paths: PathsConfig,
    server: ServerConfig,
    database: DatabaseConfig,
    auth: AuthConfig,
}

impl AppConfig {
    /// Copy that is safe to print. An inline signing secret is masked;
    /// `env:VAR` references are kept since they name the secret's source.
    fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(secret) = config.auth.jwt_secret.as_mut() {
            if !secret.starts_with("env:") {
                *secret = REDACTED.to_string();
            }
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct LoggingConfig {
    /// Used when no -q/-v flag is given and RUST_LOG is unset.
    level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
struct PathsConfig {
    data_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ServerConfig {
    host: String,
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct DatabaseConfig {
    /// Defaults to `<data_dir>/jobboard.db`.
    path: Option<String>,
    max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

fn log_level(global: &GlobalOpts, logging: &LoggingConfig) -> LevelFilter {
    if global.quiet {
        return LevelFilter::Error;
    }
    match global.verbose {
        0 => logging.level.parse().unwrap_or(LevelFilter::Info),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the tracing subscriber. Its `try_init` also forwards records
/// emitted through the `log` facade.
fn init_logging(global: &GlobalOpts, logging: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let level = log_level(global, logging).to_string().to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{APP_NAME}={level},tower_http={level}")));
    let fmt = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    let installed = if global.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt.json())
            .try_init()
    } else {
        let ansi =
            !global.no_color && env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal();
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt.with_ansi(ansi))
            .try_init()
    };

    if let Err(e) = installed {
        eprintln!("logging not initialised: {e}");
    }
}

fn handle_init(ctx: &RuntimeContext, cmd: InitCommand) -> Result<()> {
    if ctx.config_file.exists() && !cmd.force {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            ctx.config_file.display()
        );
    }
    write_config_unless_dry_run(ctx)
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let shown = ctx.config.redacted();
            let text = if ctx.global.json {
                serde_json::to_string_pretty(&shown).context("serializing config to JSON")?
            } else if ctx.global.yaml {
                serde_yaml::to_string(&shown).context("serializing config to YAML")?
            } else {
                toml::to_string_pretty(&shown).context("serializing config to TOML")?
            };
            println!("{text}");
        }
        ConfigCommand::Path => println!("{}", ctx.config_file.display()),
        ConfigCommand::Reset => write_config_unless_dry_run(ctx)?,
    }
    Ok(())
}

fn write_config_unless_dry_run(ctx: &RuntimeContext) -> Result<()> {
    if ctx.global.dry_run {
        info!(
            "dry-run: would write default config to {}",
            ctx.config_file.display()
        );
        return Ok(());
    }
    write_default_config(&ctx.config_file)?;
    info!("Wrote default config to {}", ctx.config_file.display());
    Ok(())
}

#[tokio::main]
async fn serve(ctx: RuntimeContext, cmd: ServeCommand) -> Result<()> {
    info!("Starting {} server...", APP_NAME);

    let auth_config = &ctx.config.auth;
    let tokens = TokenIssuer::from_config(auth_config).context("Invalid auth configuration")?;
    info!(
        "Token TTL: {}s, bcrypt cost: {}",
        tokens.ttl_secs(),
        auth_config.bcrypt_cost
    );

    let db_path = ctx.database_path()?;
    info!("Database path: {}", db_path.display());
    let database = Database::new(&db_path, ctx.config.database.max_connections).await?;

    let state = api::AppState::new(
        &database,
        PasswordHasher::new(auth_config.bcrypt_cost),
        tokens,
        auth_config.allowed_origins.clone(),
    );
    let app = api::create_router(state);

    let host = cmd.host.unwrap_or_else(|| ctx.config.server.host.clone());
    let port = cmd.port.unwrap_or(ctx.config.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running server")?;

    database.pool().close().await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

/// Layer the TOML file (optional) under `JOBBOARD__*` environment variables.
fn load_config(path: &Path, create_missing: bool) -> Result<AppConfig> {
    if create_missing && !path.exists() {
        write_default_config(path)?;
    }

    Config::builder()
        .add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .and_then(|built| built.try_deserialize::<AppConfig>())
        .with_context(|| format!("loading config from {}", path.display()))
}

/// Write a default config with a freshly generated signing secret.
fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }

    let config = AppConfig {
        auth: AuthConfig {
            jwt_secret: Some(AuthConfig::generate_jwt_secret()),
            ..AuthConfig::default()
        },
        ..AppConfig::default()
    };
    let body = format!(
        "# {APP_NAME} configuration\n\
         # Any key can be overridden as {ENV_PREFIX}__SECTION__KEY.\n\
         # auth.jwt_secret also accepts \"env:VAR_NAME\".\n\n{}",
        toml::to_string_pretty(&config).context("serializing default config to TOML")?
    );
    fs::write(path, body).with_context(|| format!("writing config file {}", path.display()))
}

fn resolve_config_file(override_path: Option<&Path>) -> Result<PathBuf> {
    let Some(path) = override_path else {
        return Ok(xdg_dir("XDG_CONFIG_HOME", dirs::config_dir(), &[".config"])?.join("config.toml"));
    };

    let path = match path.to_str() {
        Some(text) => expand_path(text)?,
        None => path.to_path_buf(),
    };
    Ok(if path.is_dir() {
        path.join("config.toml")
    } else {
        path
    })
}

/// `$var/jobboard`, else the platform directory, else `~/<home_relative>/jobboard`.
fn xdg_dir(var: &str, platform: Option<PathBuf>, home_relative: &[&str]) -> Result<PathBuf> {
    let base = env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or(platform)
        .or_else(|| {
            dirs::home_dir().map(|home| home_relative.iter().fold(home, |dir, seg| dir.join(seg)))
        })
        .ok_or_else(|| anyhow!("unable to determine a directory for ${var}"))?;
    Ok(base.join(APP_NAME))
}

/// Expand `~` and `$VAR` in a configured path.
fn expand_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).with_context(|| format!("expanding path {text}"))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(quiet: bool, verbose: u8) -> GlobalOpts {
        GlobalOpts {
            config: None,
            quiet,
            verbose,
            json: false,
            yaml: false,
            no_color: true,
            dry_run: false,
        }
    }

    #[test]
    fn test_default_config_is_servable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = load_config(&path, true).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_ttl, "24h");
        assert!(config.auth.validate().is_ok());

        // Loading again keeps the generated secret.
        let again = load_config(&path, true).unwrap();
        assert_eq!(again.auth.jwt_secret, config.auth.jwt_secret);
    }

    #[test]
    fn test_missing_config_is_not_created_unless_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_config(&path, false).unwrap();
        assert!(!path.exists());
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
port = 9100

[auth]
jwt_secret = "file-secret-that-is-definitely-32-characters"
token_ttl = "2h"
"#,
        )
        .unwrap();

        let config = load_config(&path, false).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.token_ttl, "2h");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_config_file(Some(dir.path())).unwrap(),
            dir.path().join("config.toml")
        );

        let file = dir.path().join("custom.toml");
        assert_eq!(resolve_config_file(Some(file.as_path())).unwrap(), file);
    }

    #[test]
    fn test_redacted_masks_inline_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("inline-secret-that-is-at-least-32-characters".to_string());

        let shown = config.redacted();
        assert_eq!(shown.auth.jwt_secret.as_deref(), Some(REDACTED));
        for text in [
            serde_json::to_string(&shown).unwrap(),
            serde_yaml::to_string(&shown).unwrap(),
            toml::to_string(&shown).unwrap(),
        ] {
            assert!(!text.contains("inline-secret"), "{text}");
        }

        config.auth.jwt_secret = Some("env:JOBBOARD_SECRET".to_string());
        assert_eq!(
            config.redacted().auth.jwt_secret.as_deref(),
            Some("env:JOBBOARD_SECRET")
        );
        assert!(AppConfig::default().redacted().auth.jwt_secret.is_none());
    }

    #[test]
    fn test_log_level_precedence() {
        let mut logging = LoggingConfig::default();
        assert_eq!(log_level(&global(false, 0), &logging), LevelFilter::Info);

        logging.level = "warn".to_string();
        assert_eq!(log_level(&global(false, 0), &logging), LevelFilter::Warn);
        assert_eq!(log_level(&global(false, 1), &logging), LevelFilter::Debug);
        assert_eq!(log_level(&global(false, 3), &logging), LevelFilter::Trace);
        assert_eq!(log_level(&global(true, 0), &logging), LevelFilter::Error);

        logging.level = "loud".to_string();
        assert_eq!(log_level(&global(false, 0), &logging), LevelFilter::Info);
    }
}
