//! Maintenance CLI
//!
//! Every command prints one JSON object per line so the output can be piped
//! into scripts and cron logs.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rollcall_core::config::Config;
use rollcall_core::domains::auth::JwtService;
use rollcall_core::domains::events::actions::clean_expired_events;
use rollcall_core::domains::notifications::actions::clean_notifications;
use rollcall_core::domains::profiles::models::Profile;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rollcall_cli")]
#[command(about = "Rocky Rollcall maintenance commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending database migrations
    Migrate,

    /// Delete events more than 90 days past their date
    CleanEvents {
        /// Count expired events without deleting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Purge notifications their recipients have deleted
    CleanNotifications {
        /// Count deleted notifications without purging them
        #[arg(long)]
        dry_run: bool,
    },

    /// Mint a bearer token for an existing account
    IssueToken { username: String },
}

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expired: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marked: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl Response {
    fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            expired: None,
            marked: None,
            deleted: None,
            token: None,
        }
    }
}

fn output(resp: &Response) -> Result<()> {
    println!("{}", serde_json::to_string(resp).context("Failed to encode output")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,rollcall_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let result = match cli.command {
        Commands::Migrate => cmd_migrate(&config).await,
        Commands::CleanEvents { dry_run } => cmd_clean_events(&config, dry_run).await,
        Commands::CleanNotifications { dry_run } => cmd_clean_notifications(&config, dry_run).await,
        Commands::IssueToken { username } => cmd_issue_token(&config, &username).await,
    };

    if let Err(e) = &result {
        let resp = Response {
            success: false,
            ..Response::message(format!("{:#}", e))
        };
        output(&resp)?;
    }
    result
}

async fn get_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn cmd_migrate(config: &Config) -> Result<()> {
    let pool = get_pool(config).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    output(&Response::message("Migrations complete"))
}

async fn cmd_clean_events(config: &Config, dry_run: bool) -> Result<()> {
    let pool = get_pool(config).await?;
    let report = clean_expired_events(Utc::now().date_naive(), dry_run, &pool)
        .await
        .context("Failed to clean expired events")?;

    let message = if dry_run {
        format!("{} expired events would be deleted", report.expired)
    } else {
        format!("Deleted {} expired events", report.deleted)
    };

    output(&Response {
        expired: Some(report.expired),
        deleted: Some(report.deleted),
        ..Response::message(message)
    })
}

async fn cmd_clean_notifications(config: &Config, dry_run: bool) -> Result<()> {
    let pool = get_pool(config).await?;
    let report = clean_notifications(dry_run, &pool)
        .await
        .context("Failed to clean notifications")?;

    let message = if dry_run {
        format!("{} deleted notifications would be purged", report.marked)
    } else {
        format!("Cleaned {} notifications", report.deleted)
    };

    output(&Response {
        marked: Some(report.marked),
        deleted: Some(report.deleted),
        ..Response::message(message)
    })
}

async fn cmd_issue_token(config: &Config, username: &str) -> Result<()> {
    let pool = get_pool(config).await?;
    let profile = Profile::find_by_username(username, &pool)
        .await?
        .with_context(|| format!("No account named \"{}\"", username))?;

    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_issuer.clone());
    let token = jwt_service.create_token(profile.user_id, profile.id, profile.username.clone())?;

    output(&Response {
        token: Some(token),
        ..Response::message(format!("Token issued for {}", profile.username))
    })
}
