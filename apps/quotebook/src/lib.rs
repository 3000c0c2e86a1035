//! # Quotebook Application
//!
//! Command-line shell over `quotebook-core` and `quotebook-db`.
//!
//! ## Module Organization
//! ```text
//! quotebook_lib/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap definitions
//! ├── output.rs       ◄─── Human / JSON rendering
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── AppConfig (toml + env)
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── settings.rs ◄─── Cached business settings
//! ├── commands/       ◄─── One module per resource
//! └── error.rs        ◄─── ApiError for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments                                                     │
//! │  2. Initialize logging (stderr; RUST_LOG or --verbose)                  │
//! │  3. Load AppConfig: defaults → quotebook.toml → QUOTEBOOK_* env         │
//! │  4. `config` commands stop here (an existing database is only read)     │
//! │  5. Resolve database path: --db → config → platform data dir           │
//! │  6. Open SQLite (WAL), run migrations                                   │
//! │  7. Load SettingsState, dispatch the command, close the pool            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod state;

use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{CatalogCommand, Cli, ClientCommand, Command, ConfigCommand, QuoteCommand, SettingsCommand};
use commands::{backup, catalog, client, config, quote, settings};
use error::ApiResult;
use output::Printer;
use quotebook_db::{Database, DbConfig};
use state::{AppConfig, DbState, SettingsState};

/// Parses the command line, runs the command and maps the outcome to an
/// exit code.
pub async fn run() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let fallback = Printer::new(cli.json, "$");
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            fallback.error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Runs one parsed command to completion.
pub async fn execute(cli: Cli) -> ApiResult<()> {
    let app_config = AppConfig::load(cli.config.clone())?;
    let printer = Printer::new(cli.json, app_config.currency_symbol.clone());

    if let Command::Config { action } = cli.command {
        let db_path = cli.db.or_else(|| app_config.locate_database());
        return run_config(action, &app_config, cli.config, db_path, &printer).await;
    }

    let db_path = match cli.db {
        Some(path) => path,
        None => app_config.database_path()?,
    };
    info!(db_path = %db_path.display(), "Opening database");

    let db = DbState::new(Database::new(DbConfig::new(db_path)).await?);
    let settings = SettingsState::load(db.inner()).await?;

    let result = dispatch(cli.command, &db, &settings, &app_config, &printer).await;
    db.inner().close().await;
    result
}

async fn dispatch(
    command: Command,
    db: &DbState,
    settings_state: &SettingsState,
    app_config: &AppConfig,
    printer: &Printer,
) -> ApiResult<()> {
    debug!(?command, "Dispatching");

    match command {
        Command::Client { action } => match action {
            ClientCommand::Add(args) => {
                let added = client::add_client(db, args.into()).await?;
                printer.emit(&added, |p, c| p.client_table(std::slice::from_ref(c)))
            }
            ClientCommand::List => {
                let clients = client::list_clients(db).await?;
                printer.emit(&clients, |p, c| p.client_table(c))
            }
            ClientCommand::Show { id } => {
                let detail = client::get_client(db, &id).await?;
                printer.emit(&detail, |p, d| p.client_detail(d))
            }
            ClientCommand::Update(args) => {
                let updated = client::update_client(db, &args.id, args.patch()).await?;
                printer.emit(&updated, |p, c| p.client_table(std::slice::from_ref(c)))
            }
            ClientCommand::Delete { id } => {
                client::delete_client(db, &id).await?;
                printer.done(&format!("Deleted client {}", id))
            }
        },

        Command::Catalog { action } => match action {
            CatalogCommand::Add(args) => {
                let item = catalog::add_catalog_item(db, args.into()).await?;
                printer.emit(&item, |p, i| p.catalog_item(i))
            }
            CatalogCommand::List { all } => {
                let items = catalog::list_catalog(db, all).await?;
                printer.emit(&items, |p, i| p.catalog_table(i))
            }
            CatalogCommand::Update(args) => {
                let item = catalog::update_catalog_item(db, &args.id, args.patch()).await?;
                printer.emit(&item, |p, i| p.catalog_item(i))
            }
            CatalogCommand::Delete { id } => {
                catalog::delete_catalog_item(db, &id).await?;
                printer.done(&format!("Deleted service {}", id))
            }
        },

        Command::Quote { action } => match action {
            QuoteCommand::New(args) => {
                let created =
                    quote::create_quote(db, settings_state, app_config, args.into()).await?;
                printer.emit(&created, |p, q| p.quote_detail(q))
            }
            QuoteCommand::List { client, status } => {
                let quotes = quote::list_quotes(db, cli::quote_filter(client, status)).await?;
                printer.emit(&quotes, |p, q| p.quote_table(q))
            }
            QuoteCommand::Show { id } => {
                let found = quote::get_quote(db, &id).await?;
                printer.emit(&found, |p, q| p.quote_detail(q))
            }
            QuoteCommand::Status { id, status } => {
                let updated = quote::set_quote_status(db, &id, status).await?;
                printer.emit(&updated, |p, q| p.quote_table(std::slice::from_ref(q)))
            }
            QuoteCommand::Edit(args) => {
                let id = args.id.clone();
                let updated = quote::update_quote(db, &id, args.into()).await?;
                printer.emit(&updated, |p, q| p.quote_detail(q))
            }
            QuoteCommand::Delete { id } => {
                quote::delete_quote(db, &id).await?;
                printer.done(&format!("Deleted quote {}", id))
            }
        },

        Command::Settings { action } => match action {
            SettingsCommand::Show => {
                let current = settings::get_settings(settings_state);
                printer.emit(&current, |p, s| p.settings(s))
            }
            SettingsCommand::Set(args) => {
                let updated = settings::update_settings(db, settings_state, args.patch()).await?;
                printer.emit(&updated, |p, s| p.settings(s))
            }
            SettingsCommand::Reset => {
                let reset = settings::reset_settings(db, settings_state).await?;
                printer.emit(&reset, |p, s| p.settings(s))
            }
        },

        Command::Export { file } => {
            let report = backup::export_to_file(db, &file).await?;
            printer.emit(&report, |p, r| p.export_report(r))
        }

        Command::Import { file } => {
            let report = backup::import_from_file(db, settings_state, &file).await?;
            printer.emit(&report, |p, r| p.import_report(r))
        }

        // Handled before the database is opened
        Command::Config { .. } => Ok(()),
    }
}

async fn run_config(
    action: ConfigCommand,
    app_config: &AppConfig,
    config_path: Option<std::path::PathBuf>,
    db_path: Option<std::path::PathBuf>,
    printer: &Printer,
) -> ApiResult<()> {
    match action {
        ConfigCommand::Show => {
            let stored = config::stored_settings(db_path).await;
            let view = config::show_config(app_config, config_path, stored.as_ref());
            printer.emit(&view, |p, v| p.config(v))
        }
        ConfigCommand::Set(args) => {
            let path = config::update_config(args.into(), config_path)?;
            printer.done(&format!("Saved {}", AppConfig::display_path(&path)))
        }
        ConfigCommand::Reset => {
            let path = config::reset_config(config_path)?;
            printer.done(&format!("Reset {}", AppConfig::display_path(&path)))
        }
    }
}

/// Initializes the tracing subscriber. Logs go to stderr so `--json`
/// output on stdout stays parseable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=quotebook=trace` - Trace for quotebook crates only
/// - `--verbose` - `info,quotebook=debug,sqlx=warn`
/// - Default: warnings only
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,quotebook=debug,sqlx=warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
