// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "A bookmark manager with a concurrent, resumable bulk-import pipeline", long_about = None)]
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured database path
    #[arg(long, value_name = "PATH", global = true)]
    pub db_url: Option<String>,

    /// Turn debugging information on (repeat for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[arg(
        long = "generate-config",
        help = "bkmr-ingest --generate-config > ~/.config/bkmr-ingest/config.toml"
    )]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bulk-imports a browser-export file (HTML, JSON or plain text)
    Import {
        /// Path to the export file; format is detected from its extension
        path: PathBuf,

        /// Worker pool size
        #[arg(short, long)]
        workers: Option<usize>,

        /// Enrich each bookmark by fetching its page metadata
        #[arg(long)]
        fetch: bool,

        /// Enables per-domain politeness and resume; implies --fetch
        #[arg(long)]
        bulk_mode: bool,

        /// Minimum delay between requests to the same host (milliseconds)
        #[arg(long, value_name = "MS")]
        domain_delay_ms: Option<u64>,

        /// HTTP timeout per request (seconds)
        #[arg(long, value_name = "SECS")]
        fetch_timeout_secs: Option<u64>,

        /// Cap on distinct in-flight hosts
        #[arg(long)]
        max_concurrent_domains: Option<usize>,

        /// Consecutive failures before a host enters cooldown
        #[arg(long)]
        max_failures_per_domain: Option<u32>,

        /// Cooldown duration once a host trips the failure threshold (seconds)
        #[arg(long, value_name = "SECS")]
        skip_domain_cooldown_secs: Option<u64>,

        /// Drop URLs whose host resolves to an RFC1918/loopback/link-local address
        #[arg(long)]
        skip_internal: bool,

        /// Path to the resume cursor file
        #[arg(long)]
        resume_file: Option<PathBuf>,

        /// MQTT broker address; enables the event publisher
        #[arg(long)]
        broker_addr: Option<String>,

        /// MQTT broker port
        #[arg(long, default_value_t = 1883)]
        broker_port: u16,

        /// MQTT client id
        #[arg(long, default_value = "bkmr-ingest")]
        client_id: String,

        /// MQTT username
        #[arg(long)]
        username: Option<String>,

        /// MQTT password
        #[arg(long)]
        password: Option<String>,

        /// MQTT topic events are published to
        #[arg(long, default_value = "bkmr/ingest")]
        topic: String,

        /// MQTT QoS level (0, 1 or 2)
        #[arg(long, default_value_t = 0)]
        qos: u8,
    },

    /// Adds a single bookmark
    Add {
        url: String,

        #[arg(short, long, default_value = "")]
        title: String,

        /// Conflicts with the global `-d`/`--debug` short flag; long form only
        #[arg(long, default_value = "")]
        description: String,

        /// Comma-separated tag list
        #[arg(short = 'T', long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Deletes a bookmark by id
    Delete { id: i64 },

    /// Prints a single bookmark by id
    Get { id: i64 },

    /// Lists bookmarks, paginated
    List {
        #[arg(short, long, default_value_t = 50)]
        limit: i64,

        #[arg(short, long, default_value_t = 0)]
        offset: i64,
    },

    /// Searches across url, title, description and tags
    Search {
        query: String,

        #[arg(short, long, default_value_t = 50)]
        limit: i64,

        #[arg(short, long, default_value_t = 0)]
        offset: i64,
    },

    /// Updates the title, description and/or tags of an existing bookmark
    Update {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(short = 'T', long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Exports all bookmarks as a Netscape Bookmark File
    Export {
        /// Destination file; prints to stdout when omitted
        output: Option<PathBuf>,
    },

    /// Irreversibly removes every stored bookmark
    Purge {
        /// Required acknowledgement; the command refuses to run without it
        #[arg(long)]
        yes: bool,
    },

    /// Lists all distinct tags, or removes one tag from one bookmark
    Tags {
        /// Bookmark id to remove a tag from
        #[arg(long, requires = "tag")]
        remove_from: Option<i64>,

        /// Tag to remove (used with --remove-from)
        #[arg(long)]
        tag: Option<String>,
    },

    /// Prints aggregate counts: total bookmarks and distinct tags
    Stats,

    /// Generates a shell completion script
    Completion {
        /// One of: bash, zsh, fish
        shell: String,
    },
}
