use std::{error::Error, sync::Arc};

use clap::{Parser, Subcommand};
use engine::{Engine, MigrationProbe, Shards, SnowflakeIds};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;

use settings::Settings;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "fundbook_admin")]
#[command(about = "Admin utilities for Fundbook (fund data migration)")]
struct Cli {
    /// Settings file, without extension.
    #[arg(long, env = "FUNDBOOK_CONFIG", default_value = "fundbook")]
    config: String,

    /// Overrides `directory_url`.
    #[arg(long)]
    directory_url: Option<String>,

    /// Overrides `shard_urls`. Repeat once per shard, in shard order.
    #[arg(long = "shard-url")]
    shard_urls: Vec<String>,

    /// Overrides `node_id`.
    #[arg(long)]
    node_id: Option<u8>,

    /// Overrides `log_level`.
    #[arg(long)]
    log_level: Option<String>,

    /// Apply schema migrations before running the command.
    #[arg(long)]
    migrate_schema: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Give every user a personal fund and scope their records to it.
    Migrate,
    /// Check every user's migrated state without writing.
    Validate,
    /// Undo the migration. Deletes every fund.
    Rollback {
        /// Confirm the rollback.
        #[arg(long)]
        yes: bool,
    },
    /// Report how many users are migrated.
    Status,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    #[serde(flatten)]
    probe: MigrationProbe,
    complete: bool,
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(url) = &self.directory_url {
            settings.directory_url = url.clone();
        }
        if !self.shard_urls.is_empty() {
            settings.shard_urls = self.shard_urls.clone();
        }
        if let Some(node_id) = self.node_id {
            settings.node_id = node_id;
        }
        if let Some(level) = &self.log_level {
            settings.log_level = level.clone();
        }
        if self.migrate_schema {
            settings.run_schema_migrations = true;
        }
    }
}

async fn connect_db(
    url: &str,
    run_migrations: bool,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(url).await?;
    if run_migrations {
        migration::Migrator::up(&db, None).await?;
    }
    Ok(db)
}

async fn build_engine(settings: &Settings) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let directory = connect_db(&settings.directory_url, settings.run_schema_migrations).await?;

    let mut connections = Vec::with_capacity(settings.shard_urls.len());
    for url in &settings.shard_urls {
        connections.push(connect_db(url, settings.run_schema_migrations).await?);
    }
    let shards = Shards::new(connections).unwrap_or_else(|| Shards::single(directory.clone()));
    tracing::info!("using {} shard(s)", shards.len());

    let engine = Engine::builder()
        .directory(directory)
        .shards(shards)
        .id_generator(Arc::new(SnowflakeIds::new(settings.node_id)))
        .build()
        .await?;
    Ok(engine)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut settings = Settings::new(&cli.config)?;
    cli.apply_overrides(&mut settings);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "fundbook_admin={level},engine={level}",
            level = settings.log_level
        ))
        .init();

    if let Command::Rollback { yes: false } = cli.command {
        eprintln!("rollback deletes every fund; pass --yes to confirm");
        std::process::exit(2);
    }

    let engine = build_engine(&settings).await?;

    let ok = match cli.command {
        Command::Migrate => {
            let status = engine.migrate().await?;
            print_json(&status)?;
            status.is_success()
        }
        Command::Validate => {
            let result = engine.validate().await?;
            print_json(&result)?;
            result.is_valid
        }
        Command::Rollback { .. } => {
            let status = engine.rollback().await?;
            print_json(&status)?;
            status.is_success()
        }
        Command::Status => {
            let probe = engine.migration_probe().await?;
            let report = StatusReport {
                probe,
                complete: probe.is_complete(),
            };
            print_json(&report)?;
            report.complete
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
