//! ariza - fault and downtime record store
//!
//! CLI entry point.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ariza::cli::clear::ClearOptions;
use ariza::cli::list::ListOptions;
use ariza::cli::records::{RecordOptions, RecordOutput};
use ariza::cli::search::SearchOptions;
use ariza::cli::status::StatusOptions;
use ariza::cli::{
    AddCommand, ClearCommand, DeleteCommand, GetCommand, ListCommand, RecordPatch, SearchCommand,
    StatusCommand, UpdateCommand,
};
use ariza::config::Config;
use ariza::error::exit_codes;
use ariza::{RecordDraft, RecordId, RecordStore, SearchQuery};

// =============================================================================
// CLI Definition
// =============================================================================

/// ariza - fault and downtime record store
#[derive(Parser)]
#[command(name = "ariza")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, short, global = true)]
    json: bool,

    /// Suppress output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Skip the database probe and use local storage
    #[arg(long, global = true)]
    local: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a record
    Add {
        #[command(flatten)]
        fields: DraftArgs,
    },

    /// Show one record
    Get {
        /// Record id
        id: String,
    },

    /// Change fields of a record
    Update {
        /// Record id
        id: String,
        #[command(flatten)]
        fields: PatchArgs,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: String,
    },

    /// List records, newest first
    List {
        /// Maximum number of records
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Search records
    Search {
        /// Text matched in work done, location, device and engineer
        term: Option<String>,
        /// Exact event kind (durumTipi)
        #[arg(long)]
        durum: Option<String>,
        /// Exact shift (vardiya)
        #[arg(long)]
        vardiya: Option<String>,
        /// Maximum number of results
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show the active backend
    Status,

    /// Delete every record
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct DraftArgs {
    /// Event kind (durumTipi)
    #[arg(long)]
    durum: String,
    /// Date (tarih)
    #[arg(long)]
    tarih: String,
    /// Start time (baslangicSaati)
    #[arg(long)]
    baslangic: String,
    /// End time (bitisSaati)
    #[arg(long)]
    bitis: String,
    /// Shift (vardiya)
    #[arg(long)]
    vardiya: String,
    /// Unit (birim)
    #[arg(long)]
    birim: String,
    /// Location (lokasyon)
    #[arg(long)]
    lokasyon: String,
    /// Device (cihazAdi)
    #[arg(long)]
    cihaz: String,
    /// Engineer (muhendisAdi)
    #[arg(long)]
    muhendis: String,
    /// Work performed (yapilanIs)
    #[arg(long = "is")]
    yapilan_is: String,
    /// Tonnage impact (tonaj)
    #[arg(long)]
    tonaj: i64,
}

impl From<DraftArgs> for RecordDraft {
    fn from(args: DraftArgs) -> Self {
        Self {
            durum_tipi: args.durum,
            tarih: args.tarih,
            baslangic_saati: args.baslangic,
            bitis_saati: args.bitis,
            vardiya: args.vardiya,
            birim: args.birim,
            lokasyon: args.lokasyon,
            cihaz_adi: args.cihaz,
            muhendis_adi: args.muhendis,
            yapilan_is: args.yapilan_is,
            tonaj: args.tonaj,
        }
    }
}

#[derive(Args)]
struct PatchArgs {
    #[arg(long)]
    durum: Option<String>,
    #[arg(long)]
    tarih: Option<String>,
    #[arg(long)]
    baslangic: Option<String>,
    #[arg(long)]
    bitis: Option<String>,
    #[arg(long)]
    vardiya: Option<String>,
    #[arg(long)]
    birim: Option<String>,
    #[arg(long)]
    lokasyon: Option<String>,
    #[arg(long)]
    cihaz: Option<String>,
    #[arg(long)]
    muhendis: Option<String>,
    #[arg(long = "is")]
    yapilan_is: Option<String>,
    #[arg(long)]
    tonaj: Option<i64>,
}

impl From<PatchArgs> for RecordPatch {
    fn from(args: PatchArgs) -> Self {
        Self {
            durum_tipi: args.durum,
            tarih: args.tarih,
            baslangic_saati: args.baslangic,
            bitis_saati: args.bitis,
            vardiya: args.vardiya,
            birim: args.birim,
            lokasyon: args.lokasyon,
            cihaz_adi: args.cihaz,
            muhendis_adi: args.muhendis,
            yapilan_is: args.yapilan_is,
            tonaj: args.tonaj,
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let mut config = Config::load();
    if cli.local {
        config.api.force_local = true;
    }

    let store = RecordStore::initialize(&config).await;

    // Ctrl-C aborts whatever call is in flight.
    let cancel = store.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            cancel.cancel();
        }
    });

    run(cli, &store).await
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print formatted command output, if any.
fn emit(formatted: String) {
    if !formatted.is_empty() {
        print!("{}", formatted);
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code as u8)
}

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        exit_code(exit_codes::SUCCESS)
    } else {
        exit_code(exit_codes::FAILURE)
    }
}

fn record_exit_code(output: &RecordOutput) -> ExitCode {
    if output.not_found {
        exit_code(exit_codes::NOT_FOUND)
    } else {
        success_to_exit_code(output.success)
    }
}

/// Run the CLI and return the exit code.
async fn run(cli: Cli, store: &RecordStore) -> ExitCode {
    let record_options = RecordOptions {
        json: cli.json,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Add { fields } => {
            let cmd = AddCommand::new(store);
            let draft = RecordDraft::from(fields);
            let output = cmd.run(&draft, &record_options).await;
            emit(cmd.format_output(&output, &record_options));
            record_exit_code(&output)
        }
        Commands::Get { id } => {
            let cmd = GetCommand::new(store);
            let output = cmd.run(&RecordId::parse(&id), &record_options).await;
            emit(cmd.format_output(&output, &record_options));
            record_exit_code(&output)
        }
        Commands::Update { id, fields } => {
            let cmd = UpdateCommand::new(store);
            let patch = RecordPatch::from(fields);
            let output = cmd
                .run(&RecordId::parse(&id), &patch, &record_options)
                .await;
            emit(cmd.format_output(&output, &record_options));
            record_exit_code(&output)
        }
        Commands::Delete { id } => {
            let cmd = DeleteCommand::new(store);
            let output = cmd.run(&RecordId::parse(&id), &record_options).await;
            emit(cmd.format_output(&output, &record_options));
            record_exit_code(&output)
        }
        Commands::List { limit } => {
            let cmd = ListCommand::new(store);
            let options = ListOptions {
                json: cli.json,
                quiet: cli.quiet,
                limit,
            };
            let output = cmd.run(&options).await;
            emit(cmd.format_output(&output, &options));
            success_to_exit_code(output.success)
        }
        Commands::Search {
            term,
            durum,
            vardiya,
            limit,
        } => {
            let cmd = SearchCommand::new(store);
            let query = SearchQuery {
                search_term: term,
                filter_durum: durum,
                filter_vardiya: vardiya,
            };
            let options = SearchOptions {
                json: cli.json,
                quiet: cli.quiet,
                limit,
            };
            let output = cmd.run(&query, &options).await;
            emit(cmd.format_output(&output, &options));
            success_to_exit_code(output.success)
        }
        Commands::Status => {
            let cmd = StatusCommand::new(store);
            let options = StatusOptions {
                json: cli.json,
                quiet: cli.quiet,
            };
            let output = cmd.run(&options);
            emit(cmd.format_output(&output, &options));
            success_to_exit_code(output.success)
        }
        Commands::Clear { yes } => {
            let cmd = ClearCommand::new(store);
            let options = ClearOptions {
                json: cli.json,
                quiet: cli.quiet,
                yes,
            };
            let output = cmd.run(&options).await;
            emit(cmd.format_output(&output, &options));
            success_to_exit_code(output.success)
        }
    }
}
