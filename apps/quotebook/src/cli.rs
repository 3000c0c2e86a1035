//! # Command Line
//!
//! clap definitions and their conversion into command inputs.
//!
//! ```text
//! quotebook [--db PATH] [--config PATH] [--json] [-v] <COMMAND>
//!
//!   client   add | list | show | update | delete
//!   catalog  add | list | update | delete
//!   quote    new | list | show | status | edit | delete
//!   settings show | set | reset
//!   config   show | set | reset
//!   export   <FILE>
//!   import   <FILE>
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::catalog::NewCatalogItem;
use crate::commands::client::NewClient;
use crate::commands::quote::{ItemInput, NewQuote, QuoteEdit, QuoteFilter};
use crate::state::ConfigUpdate;
use quotebook_core::{CatalogItemPatch, ClientPatch, QuoteStatus, SettingsPatch, Theme};

#[derive(Debug, Parser)]
#[command(name = "quotebook")]
#[command(version, about = "Local-first quoting for small service businesses.")]
pub struct Cli {
    /// Database file (overrides the config file and QUOTEBOOK_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Config file (default: quotebook.toml in the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage clients
    Client {
        #[command(subcommand)]
        action: ClientCommand,
    },
    /// Manage the service catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogCommand,
    },
    /// Write and track quotes
    Quote {
        #[command(subcommand)]
        action: QuoteCommand,
    },
    /// Business profile and quote defaults (stored in the database)
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Local preferences (stored in the config file)
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Write every record to a JSON backup file
    Export { file: PathBuf },
    /// Replace every record with the contents of a JSON backup file
    Import { file: PathBuf },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

// =============================================================================
// Clients
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ClientCommand {
    /// Add a client
    Add(ClientAddArgs),
    /// List clients by name
    List,
    /// Show a client and their quotes
    Show { id: String },
    /// Change a client's details
    Update(ClientUpdateArgs),
    /// Delete a client without quotes
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct ClientAddArgs {
    pub name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<ClientAddArgs> for NewClient {
    fn from(args: ClientAddArgs) -> Self {
        NewClient {
            name: args.name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            notes: args.notes,
        }
    }
}

#[derive(Debug, Args)]
pub struct ClientUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "clear_email")]
    pub email: Option<String>,
    /// Remove the stored email
    #[arg(long)]
    pub clear_email: bool,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl ClientUpdateArgs {
    pub fn patch(&self) -> ClientPatch {
        let mut patch = ClientPatch {
            name: self.name.clone(),
            phone: self.phone.clone().map(Some),
            address: self.address.clone().map(Some),
            notes: self.notes.clone().map(Some),
            ..Default::default()
        };
        if self.clear_email {
            patch = patch.clear_email();
        } else if let Some(email) = &self.email {
            patch = patch.email(email.clone());
        }
        patch
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Add a service
    Add(CatalogAddArgs),
    /// List services
    List {
        /// Include services no longer offered
        #[arg(long)]
        all: bool,
    },
    /// Change a service
    Update(CatalogUpdateArgs),
    /// Delete a service (existing quotes keep their copy)
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct CatalogAddArgs {
    pub name: String,
    /// Price per unit
    #[arg(long)]
    pub price: f64,
    /// Unit label, e.g. "visit" or "sq ft"
    #[arg(long)]
    pub unit: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

impl From<CatalogAddArgs> for NewCatalogItem {
    fn from(args: CatalogAddArgs) -> Self {
        NewCatalogItem {
            name: args.name,
            unit_price: args.price,
            unit: args.unit,
            description: args.description,
        }
    }
}

#[derive(Debug, Args)]
pub struct CatalogUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub unit: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Whether the service is still offered
    #[arg(long, value_name = "true|false")]
    pub active: Option<bool>,
}

impl CatalogUpdateArgs {
    pub fn patch(&self) -> CatalogItemPatch {
        CatalogItemPatch {
            name: self.name.clone(),
            unit_price: self.price,
            unit: self.unit.clone().map(Some),
            description: self.description.clone().map(Some),
            active: self.active,
        }
    }
}

// =============================================================================
// Quotes
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum QuoteCommand {
    /// Write a new quote
    New(QuoteNewArgs),
    /// List quotes, oldest first
    List {
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        status: Option<QuoteStatus>,
    },
    /// Show a quote with its line items
    Show { id: String },
    /// Move a quote to another status
    Status { id: String, status: QuoteStatus },
    /// Change a quote's header or line items
    Edit(QuoteEditArgs),
    /// Delete a quote (its number is not reused)
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct QuoteNewArgs {
    pub client_id: String,

    /// Catalog service, repeatable
    #[arg(long = "service", value_name = "ID[:QTY]", value_parser = parse_service)]
    pub services: Vec<ItemInput>,

    /// Free-form line item, repeatable
    #[arg(long = "item", value_name = "DESC:QTY:PRICE", value_parser = parse_item)]
    pub items: Vec<ItemInput>,

    /// Tax rate as a fraction (0.0825 for 8.25%)
    #[arg(long)]
    pub tax_rate: Option<f64>,

    /// Flat amount taken off the total
    #[arg(long, default_value_t = 0.0)]
    pub discount: f64,

    #[arg(long)]
    pub status: Option<QuoteStatus>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl From<QuoteNewArgs> for NewQuote {
    /// Catalog services come first, then free-form items.
    fn from(args: QuoteNewArgs) -> Self {
        let mut items = args.services;
        items.extend(args.items);
        NewQuote {
            client_id: args.client_id,
            items,
            tax_rate: args.tax_rate,
            discount: args.discount,
            status: args.status,
            notes: args.notes,
        }
    }
}

#[derive(Debug, Args)]
pub struct QuoteEditArgs {
    pub id: String,

    /// Reassign to another client
    #[arg(long)]
    pub client: Option<String>,

    #[arg(long)]
    pub tax_rate: Option<f64>,

    #[arg(long)]
    pub discount: Option<f64>,

    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,

    #[arg(long)]
    pub clear_notes: bool,

    /// Add a catalog service
    #[arg(long = "add-service", value_name = "ID[:QTY]", value_parser = parse_service)]
    pub add_services: Vec<ItemInput>,

    /// Add a free-form line item
    #[arg(long = "add-item", value_name = "DESC:QTY:PRICE", value_parser = parse_item)]
    pub add_items: Vec<ItemInput>,

    /// Remove a line item by its number
    #[arg(long = "remove-item", value_name = "ITEM")]
    pub remove_items: Vec<String>,

    /// Change a line item's quantity
    #[arg(long = "set-qty", value_name = "ITEM:QTY", value_parser = parse_quantity)]
    pub set_quantities: Vec<(String, f64)>,
}

impl From<QuoteEditArgs> for QuoteEdit {
    fn from(args: QuoteEditArgs) -> Self {
        let mut add_items = args.add_services;
        add_items.extend(args.add_items);
        QuoteEdit {
            client_id: args.client,
            tax_rate: args.tax_rate,
            discount: args.discount,
            notes: args.notes,
            clear_notes: args.clear_notes,
            add_items,
            remove_items: args.remove_items,
            set_quantities: args.set_quantities,
        }
    }
}

pub fn quote_filter(client: Option<String>, status: Option<QuoteStatus>) -> QuoteFilter {
    QuoteFilter {
        client_id: client,
        status,
    }
}

/// `ID` or `ID:QTY`. Quantity defaults to 1.
fn parse_service(s: &str) -> Result<ItemInput, String> {
    let (id, qty) = match s.split_once(':') {
        Some((id, qty)) => (id, parse_number("quantity", qty)?),
        None => (s, 1.0),
    };

    if id.trim().is_empty() {
        return Err("catalog ID is empty".to_string());
    }

    Ok(ItemInput::Catalog {
        catalog_id: id.trim().to_string(),
        qty,
    })
}

/// `ITEM:QTY`, as taken by `quote edit --set-qty`.
fn parse_quantity(s: &str) -> Result<(String, f64), String> {
    let (item, qty) = s
        .split_once(':')
        .ok_or_else(|| format!("expected ITEM:QTY, got '{}'", s))?;
    Ok((item.trim().to_string(), parse_number("quantity", qty)?))
}

/// `DESC:QTY:PRICE`. The description may itself contain colons.
fn parse_item(s: &str) -> Result<ItemInput, String> {
    let mut parts = s.rsplitn(3, ':');
    let (Some(price), Some(qty), Some(description)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected DESC:QTY:PRICE, got '{}'", s));
    };

    Ok(ItemInput::Custom {
        description: description.trim().to_string(),
        qty: parse_number("quantity", qty)?,
        unit_price: parse_number("price", price)?,
    })
}

fn parse_number(what: &str, s: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| format!("{} '{}' is not a number", what, s))
}

// =============================================================================
// Settings & Config
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show business settings
    Show,
    /// Change business settings
    Set(SettingsSetArgs),
    /// Restore defaults (the quote counter is kept)
    Reset,
}

#[derive(Debug, Args)]
pub struct SettingsSetArgs {
    #[arg(long)]
    pub business_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Default tax rate for new quotes, as a fraction
    #[arg(long)]
    pub tax_rate: Option<f64>,
    #[arg(long)]
    pub theme: Option<Theme>,
}

impl SettingsSetArgs {
    pub fn patch(&self) -> SettingsPatch {
        SettingsPatch {
            business_name: self.business_name.clone(),
            business_email: self.email.clone().map(Some),
            business_phone: self.phone.clone().map(Some),
            business_address: self.address.clone().map(Some),
            default_tax_rate: self.tax_rate,
            theme: self.theme,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show local configuration
    Show,
    /// Change local configuration and save it
    Set(ConfigSetArgs),
    /// Restore default configuration and save it
    Reset,
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    /// Theme override
    #[arg(long)]
    pub theme: Option<Theme>,
    #[arg(long)]
    pub currency_symbol: Option<String>,
    /// Tax rate override for new quotes
    #[arg(long)]
    pub tax_rate: Option<f64>,
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

impl From<ConfigSetArgs> for ConfigUpdate {
    fn from(args: ConfigSetArgs) -> Self {
        ConfigUpdate {
            db_path: args.db_path,
            theme: args.theme,
            currency_symbol: args.currency_symbol,
            default_tax_rate: args.tax_rate,
        }
    }
}
