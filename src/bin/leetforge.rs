//! leetforge CLI: run the generation pipeline and inspect its database.

use clap::{Args, Parser, Subcommand};
use leetforge::config::Config;
use leetforge::dictionary::load_words;
use leetforge::engine::Supervisor;
use leetforge::generate::Leetspeak;
use leetforge::store::Store;
use leetforge::telemetry::{TelemetryConfig, init_telemetry};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "leetforge", version, about = "Leetspeak password candidate generator")]
struct Cli {
    /// TOML configuration file (defaults plus environment when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate and store candidates until interrupted
    Run(RunArgs),
    /// Show how many candidates are stored and the most recent ones
    Stats {
        /// Database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Number of recent records to list
        #[arg(long, default_value_t = 10)]
        recent: u32,
    },
    /// Print the default configuration as TOML
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// Number of generator workers
    #[arg(long)]
    workers: Option<usize>,
    /// Candidates per database transaction
    #[arg(long)]
    batch_size: Option<usize>,
    /// Bound on candidates waiting for the writer
    #[arg(long)]
    channel_capacity: Option<usize>,
    /// Database file
    #[arg(long)]
    db: Option<PathBuf>,
    /// Seed word list
    #[arg(long)]
    dictionary: Option<PathBuf>,
    /// Stop after this many passes over the word list
    #[arg(long)]
    passes: Option<u64>,
    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

impl RunArgs {
    fn apply(self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.pipeline.workers = Some(workers);
        }
        if let Some(batch_size) = self.batch_size {
            config.pipeline.batch_size = batch_size;
        }
        if let Some(capacity) = self.channel_capacity {
            config.pipeline.channel_capacity = capacity;
        }
        if let Some(db) = self.db {
            config.storage.db_path = db;
        }
        if let Some(dictionary) = self.dictionary {
            config.dictionary.path = dictionary;
        }
        if self.passes.is_some() {
            config.pipeline.max_passes = self.passes;
        }
        if self.seed.is_some() {
            config.pipeline.seed = self.seed;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    match cli.command {
        Command::Run(args) => cmd_run(config, args).await,
        Command::Stats { db, recent } => cmd_stats(config, db, recent).await,
        Command::Config => {
            print!("{}", Config::default_toml()?);
            Ok(())
        }
    }
}

async fn cmd_run(mut config: Config, args: RunArgs) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let _guard = init_telemetry(TelemetryConfig::from_settings(&config.telemetry, "leetforge"))?;

    let words = load_words(&config.dictionary);
    let source = Leetspeak::from_config(&config.generation)
        .with_seed(config.pipeline.seed.unwrap_or_default());

    let supervisor = Supervisor::new(Arc::new(config), source);
    supervisor.install_signal_handlers()?;

    let summary = supervisor.run(words).await?;

    println!(
        "{} words, {} workers ({} failed)",
        summary.words, summary.workers, summary.failed_workers
    );
    println!(
        "generated {} | enqueued {} | inserted {} | skipped {} seen, {} stored",
        summary.generated,
        summary.enqueued,
        summary.writer.inserted,
        summary.skipped_seen,
        summary.skipped_stored
    );
    if summary.writer.failed_flushes > 0 {
        println!("{} flush attempts failed and were retried", summary.writer.failed_flushes);
    }
    Ok(())
}

async fn cmd_stats(config: Config, db: Option<PathBuf>, recent: u32) -> anyhow::Result<()> {
    let path = db.unwrap_or(config.storage.db_path);
    let store = Store::open(&path).await?;

    let count = store.count().await?;
    println!("Database:   {}", path.display());
    println!("Passwords:  {count}");

    let records = store.recent(recent).await?;
    if !records.is_empty() {
        println!();
        println!("{:<24}  CREATED", "PASSWORD");
        println!("{}", "-".repeat(48));
        for record in &records {
            println!(
                "{:<24}  {}",
                record.password,
                record.created.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    store.close().await;
    Ok(())
}
