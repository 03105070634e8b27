use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use dormitory::{Dormitory, DormitoryConfig};

mod http;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MODULE_NAME: &str = "dormitory";
const MEMORY_DSN: &str = "sqlite::memory:";

/// Dormitory administration server
#[derive(Parser)]
#[command(name = "dormitory-server")]
#[command(about = "Dormitory administration server: students, rooms, assignments and repairs")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Apply database migrations and exit
    Migrate,
    /// Load demo data into an empty database and exit
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Dormitory server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
        Commands::Migrate => {
            let db = connect(&config, &args).await?;
            dormitory::migrate(&db).await?;
            println!("Migrations applied");
            Ok(())
        }
        Commands::Seed => seed(config, args).await,
    }
}

fn module_config(config: &AppConfig) -> Result<DormitoryConfig> {
    config.module_config::<DormitoryConfig>(MODULE_NAME)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let db = connect(&config, &args).await?;
    let module = Dormitory::init(db, module_config(&config)?).await?;
    let router = http::build_router(&module, &config.server)?;
    http::serve(router, &config.server).await?;
    tracing::info!("Dormitory server stopped");
    Ok(())
}

async fn seed(config: AppConfig, args: CliArgs) -> Result<()> {
    let db = connect(&config, &args).await?;
    let module = Dormitory::init(db, module_config(&config)?).await?;
    if module.seed().await? {
        println!("Demo data loaded");
    } else {
        println!("Database already has users; nothing seeded");
    }
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        detect_backend(db)?;
    }
    module_config(&config)?;

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

/// Which SeaORM backend a DSN selects.
fn detect_backend(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if raw.eq_ignore_ascii_case(MEMORY_DSN) {
        return Ok("sqlite");
    }
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Resolve a relative sqlite path against `base_dir` and ask sqlx to create
/// the file. In-memory DSNs pass through.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };
    if path_str.is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }

    let mut p = PathBuf::from(path_str);
    if p.is_relative() {
        p = base_dir.join(p);
    }
    if let Some(dir) = p.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create database directory {}", dir.display()))?;
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    out.push('?');
    out.push_str(query.unwrap_or("mode=rwc"));
    Ok(out)
}

async fn connect(config: &AppConfig, args: &CliArgs) -> Result<DatabaseConnection> {
    let db_config = match (&config.database, args.mock) {
        (_, true) => DatabaseConfig {
            url: MEMORY_DSN.to_string(),
            max_conns: Some(1),
            busy_timeout_ms: None,
        },
        (Some(db), false) => db.clone(),
        (None, false) => return Err(anyhow!("No database configured; pass --mock to use an in-memory one")),
    };

    let mut dsn = db_config.url.trim().to_owned();
    if detect_backend(&db_config)? == "sqlite" {
        dsn = absolutize_sqlite_dsn(&dsn, Path::new(&config.server.home_dir))?;
    }
    // Every pooled connection to `sqlite::memory:` would see its own database.
    let max_conns = if dsn == MEMORY_DSN { 1 } else { db_config.max_conns.unwrap_or(10) };

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.max_connections(max_conns)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if let Some(ms) = db_config.busy_timeout_ms {
        opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(Duration::from_millis(u64::from(ms))));
    }
    if dsn == MEMORY_DSN {
        opts.min_connections(1);
    }

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("cannot connect to {dsn}"))?;
    tracing::info!("Connected DB backend: {:?}", db.get_database_backend());
    Ok(db)
}
