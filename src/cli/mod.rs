// src/cli/mod.rs
//! C9: a `clap`-derived argument surface and per-command glue dispatching
//! to the repository, the retrieval service, or the ingestion
//! coordinator. Kept intentionally thin (§1, §4.9); every interesting
//! decision lives in the modules it calls into.

pub mod args;
pub mod completion;
pub mod display;
pub mod error;

use crate::application::RetrievalService;
use crate::config::{self, Settings};
use crate::domain::bookmark::Bookmark;
use crate::domain::repositories::bookmark_repository::BookmarkRepository;
use crate::exitcode;
use crate::export;
use crate::fetch::http::HttpMetadataFetcher;
use crate::fetch::{FetchConfig, MetadataFetcher};
use crate::infrastructure::repositories::sqlite::connection::init_pool;
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkRepository;
use crate::ingestion::{Coordinator, IngestionConfig, PublisherConfig};
use crate::parsers::{self, ImportFormat};
use crate::publish::mqtt::MqttPublisher;
use crate::publish::{EventPublisher, NullPublisher};
use args::{Cli, Commands};
use clap::Parser as _;
use error::{CliError, CliResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Maps a repeatable `-d` count to a log level (§4.10).
pub fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Parses arguments, wires up the repository, and dispatches to the
/// matched subcommand. Returns the process exit code (§6).
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            exitcode::OPERATIONAL_ERROR
        }
    }
}

async fn execute(cli: Cli) -> CliResult<i32> {
    let settings = config::load_settings(cli.config.as_deref());
    setup_logging(cli.debug.max(settings.verbosity));

    if cli.generate_config {
        println!("{}", config::generate_default_config());
        return Ok(exitcode::SUCCESS);
    }

    let Some(command) = cli.command else {
        return Ok(exitcode::SUCCESS);
    };

    if let Commands::Completion { shell } = &command {
        return completion::generate_completion(shell)
            .map(|_| exitcode::SUCCESS)
            .map_err(|e| CliError::CommandFailed(e.to_string()));
    }

    let db_url = cli.db_url.unwrap_or_else(|| settings.db_url.clone());
    let pool = init_pool(&db_url).map_err(|e| CliError::CommandFailed(e.to_string()))?;
    let repository: Arc<dyn BookmarkRepository> = Arc::new(SqliteBookmarkRepository::new(pool));

    match command {
        Commands::Import { .. } => run_import(repository, command, &settings).await,
        Commands::Add {
            url,
            title,
            description,
            tags,
        } => add(repository, url, title, description, tags),
        Commands::Delete { id } => delete(repository, id),
        Commands::Get { id } => get(repository, id),
        Commands::List { limit, offset } => list(repository, limit, offset),
        Commands::Search {
            query,
            limit,
            offset,
        } => search(repository, &query, limit, offset),
        Commands::Update {
            id,
            title,
            description,
            tags,
        } => update(repository, id, title, description, tags),
        Commands::Export { output } => export_cmd(repository, output),
        Commands::Purge { yes } => purge(repository, yes),
        Commands::Tags { remove_from, tag } => tags_cmd(repository, remove_from, tag),
        Commands::Stats => stats(repository),
        Commands::Completion { .. } => unreachable!("handled above"),
    }
}

fn add(
    repository: Arc<dyn BookmarkRepository>,
    url: String,
    title: String,
    description: String,
    tags: Vec<String>,
) -> CliResult<i32> {
    let mut bookmark = Bookmark::new(url, title, description, tags)?;
    repository.create(&mut bookmark)?;
    display::print_bookmark(&bookmark);
    Ok(exitcode::SUCCESS)
}

fn delete(repository: Arc<dyn BookmarkRepository>, id: i64) -> CliResult<i32> {
    let service = RetrievalService::new(repository);
    if service.delete(id)? {
        println!("deleted bookmark {}", id);
        Ok(exitcode::SUCCESS)
    } else {
        eprintln!("no bookmark with id {}", id);
        Ok(exitcode::OPERATIONAL_ERROR)
    }
}

fn get(repository: Arc<dyn BookmarkRepository>, id: i64) -> CliResult<i32> {
    let service = RetrievalService::new(repository);
    let bookmark = service.get(id)?;
    display::print_bookmark(&bookmark);
    Ok(exitcode::SUCCESS)
}

fn list(repository: Arc<dyn BookmarkRepository>, limit: i64, offset: i64) -> CliResult<i32> {
    let service = RetrievalService::new(repository);
    let bookmarks = service.list(limit, offset)?;
    display::print_bookmarks(&bookmarks);
    Ok(exitcode::SUCCESS)
}

fn search(
    repository: Arc<dyn BookmarkRepository>,
    query: &str,
    limit: i64,
    offset: i64,
) -> CliResult<i32> {
    let service = RetrievalService::new(repository);
    let bookmarks = service.search(query, limit, offset)?;
    display::print_bookmarks(&bookmarks);
    Ok(exitcode::SUCCESS)
}

fn update(
    repository: Arc<dyn BookmarkRepository>,
    id: i64,
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
) -> CliResult<i32> {
    let service = RetrievalService::new(repository);
    let changed = service.update(id, title, description, tags)?;
    println!(
        "{}",
        if changed {
            "bookmark updated"
        } else {
            "no changes applied"
        }
    );
    Ok(exitcode::SUCCESS)
}

fn export_cmd(repository: Arc<dyn BookmarkRepository>, output: Option<PathBuf>) -> CliResult<i32> {
    let total = repository.count()?;
    let bookmarks = repository.list(total.max(0), 0)?;
    let html = export::to_netscape_html(&bookmarks);

    match output {
        Some(path) => {
            std::fs::write(&path, html)?;
            println!("exported {} bookmark(s) to {}", bookmarks.len(), path.display());
        }
        None => print!("{}", html),
    }
    Ok(exitcode::SUCCESS)
}

fn purge(repository: Arc<dyn BookmarkRepository>, yes: bool) -> CliResult<i32> {
    if !yes {
        eprintln!("refusing to purge without --yes");
        return Ok(exitcode::USAGE_ERROR);
    }
    repository.purge()?;
    println!("all bookmarks purged");
    Ok(exitcode::SUCCESS)
}

fn tags_cmd(
    repository: Arc<dyn BookmarkRepository>,
    remove_from: Option<i64>,
    tag: Option<String>,
) -> CliResult<i32> {
    match (remove_from, tag) {
        (Some(id), Some(tag)) => {
            let service = RetrievalService::new(repository);
            if service.remove_tag(id, &tag)? {
                println!("removed tag '{}' from bookmark {}", tag, id);
            } else {
                println!("bookmark {} had no tag '{}'", id, tag);
            }
        }
        _ => {
            for tag in repository.list_all_tags()? {
                println!("{}", tag);
            }
        }
    }
    Ok(exitcode::SUCCESS)
}

fn stats(repository: Arc<dyn BookmarkRepository>) -> CliResult<i32> {
    let total = repository.count()?;
    let tags = repository.list_all_tags()?;
    println!("bookmarks: {}", total);
    println!("distinct tags: {}", tags.len());
    Ok(exitcode::SUCCESS)
}

/// Builds the typed `IngestionConfig`/`FetchConfig` pair from the parsed
/// `Import` arguments and drives one coordinator run (§4.6, §9 Design
/// Notes: never loaded implicitly, always explicit per invocation).
async fn run_import(
    repository: Arc<dyn BookmarkRepository>,
    command: Commands,
    settings: &Settings,
) -> CliResult<i32> {
    let Commands::Import {
        path,
        workers,
        fetch,
        bulk_mode,
        domain_delay_ms,
        fetch_timeout_secs,
        max_concurrent_domains,
        max_failures_per_domain,
        skip_domain_cooldown_secs,
        skip_internal,
        resume_file,
        broker_addr,
        broker_port,
        client_id,
        username,
        password,
        topic,
        qos,
    } = command
    else {
        unreachable!("run_import called with a non-Import command");
    };

    let format = parsers::detect_format(&path)?;
    let source = match format {
        ImportFormat::Html => "html-import",
        ImportFormat::Json => "json-import",
        ImportFormat::Text => "text-import",
    };

    let content = std::fs::read_to_string(&path)?;
    let candidates = parsers::parse(format, &content)?;
    info!(count = candidates.len(), path = %path.display(), "parsed import file");

    let defaults = IngestionConfig::default();
    let fetch_enabled = fetch || bulk_mode;

    let fetch_config = FetchConfig {
        timeout: fetch_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout),
        domain_delay: domain_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.domain_delay),
        max_concurrent_domains: max_concurrent_domains.unwrap_or(defaults.max_concurrent_domains),
        max_failures_per_domain: max_failures_per_domain.unwrap_or(defaults.max_failures_per_domain),
        skip_domain_cooldown: skip_domain_cooldown_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.skip_domain_cooldown),
        bulk_mode,
        skip_internal,
        ..FetchConfig::default()
    };

    let fetcher: Option<Arc<dyn MetadataFetcher>> = if fetch_enabled {
        Some(Arc::new(
            HttpMetadataFetcher::new(fetch_config.clone())
                .map_err(|e| CliError::CommandFailed(format!("failed to build fetcher: {}", e)))?,
        ))
    } else {
        None
    };

    let publisher: Arc<dyn EventPublisher> = match &broker_addr {
        Some(addr) => match MqttPublisher::connect(
            addr,
            broker_port,
            &client_id,
            &topic,
            username.as_deref(),
            password.as_deref(),
            qos,
            Duration::from_secs(5),
        )
        .await
        {
            Ok(publisher) => Arc::new(publisher),
            Err(e) => {
                warn!(error = %e, "failed to connect to broker, publishing disabled for this run");
                Arc::new(NullPublisher)
            }
        },
        None => Arc::new(NullPublisher),
    };

    let ingestion_config = IngestionConfig {
        workers: workers.unwrap_or(settings.workers),
        fetch: fetch_enabled,
        bulk_mode,
        domain_delay: fetch_config.domain_delay,
        fetch_timeout: fetch_config.timeout,
        max_concurrent_domains: fetch_config.max_concurrent_domains,
        max_failures_per_domain: fetch_config.max_failures_per_domain,
        skip_domain_cooldown: fetch_config.skip_domain_cooldown,
        skip_internal,
        resume_file,
        publisher: broker_addr.map(|broker_addr| PublisherConfig {
            broker_addr,
            broker_port,
            client_id,
            username,
            password,
            topic,
            qos,
        }),
        ..defaults
    };

    let cancel = CancellationToken::new();
    let ctrlc_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received ctrl-c, finishing in-flight work and shutting down");
            ctrlc_cancel.cancel();
        }
    });

    let coordinator = Coordinator::new(repository, fetcher, publisher, ingestion_config);
    let result = coordinator.run(candidates, source, cancel).await;

    println!(
        "parsed_unique={} created={} duplicates_skipped={} intra_batch_duplicates={} errors={} cancelled={}",
        result.parsed_unique,
        result.created,
        result.duplicates_skipped,
        result.intra_batch_duplicates,
        result.errors,
        result.cancelled
    );

    Ok(exitcode::SUCCESS)
}
