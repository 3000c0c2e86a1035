//! # Output
//!
//! Turns command results into text for the terminal, or JSON with `--json`.
//! Renderers return `String` so they can be tested without capturing stdout.

use serde::Serialize;
use std::fmt::Write;

use crate::commands::backup::{ExportReport, ImportReport};
use crate::commands::client::ClientDetail;
use crate::commands::config::ConfigView;
use crate::error::{ApiError, ApiResult};
use quotebook_core::pricing::round2;
use quotebook_core::{CatalogItem, Client, Money, Quote, Settings};

#[derive(Debug, Clone)]
pub struct Printer {
    json: bool,
    currency_symbol: String,
}

impl Printer {
    pub fn new(json: bool, currency_symbol: impl Into<String>) -> Self {
        Printer {
            json,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Prints `value` as JSON, or as whatever `human` renders.
    pub fn emit<T, F>(&self, value: &T, human: F) -> ApiResult<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&Self, &T) -> String,
    {
        if self.json {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| ApiError::unknown(format!("Could not serialize output: {}", e)))?;
            println!("{}", json);
        } else {
            print!("{}", human(self, value));
        }
        Ok(())
    }

    /// Prints a one-line confirmation (`{"ok":true}` in JSON mode).
    pub fn done(&self, message: &str) -> ApiResult<()> {
        #[derive(Serialize)]
        struct Done<'a> {
            ok: bool,
            message: &'a str,
        }

        self.emit(&Done { ok: true, message }, |_, d| format!("{}\n", d.message))
    }

    pub fn error(&self, err: &ApiError) {
        if self.json {
            match serde_json::to_string(err) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("error: {}", err),
            }
        } else {
            eprintln!("error: {}", err);
        }
    }

    pub fn money(&self, amount: f64) -> String {
        Money::from_amount(amount).format_with(&self.currency_symbol)
    }

    // =========================================================================
    // Renderers
    // =========================================================================

    pub fn client_table(&self, clients: &[Client]) -> String {
        if clients.is_empty() {
            return "No clients yet.\n".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(out, "{:<36}  {:<28}  {}", "ID", "NAME", "EMAIL");
        for c in clients {
            let _ = writeln!(
                out,
                "{:<36}  {:<28}  {}",
                c.id,
                truncate(&c.name, 28),
                c.email.as_deref().unwrap_or("-")
            );
        }
        out
    }

    pub fn client_detail(&self, detail: &ClientDetail) -> String {
        let c = &detail.client;
        let mut out = String::new();
        let _ = writeln!(out, "{}", c.name);
        let _ = writeln!(out, "  id:      {}", c.id);
        field(&mut out, "email", c.email.as_deref());
        field(&mut out, "phone", c.phone.as_deref());
        field(&mut out, "address", c.address.as_deref());
        field(&mut out, "notes", c.notes.as_deref());

        if detail.quotes.is_empty() {
            let _ = writeln!(out, "  no quotes");
        } else {
            let _ = writeln!(out, "  quotes:");
            for q in &detail.quotes {
                let _ = writeln!(
                    out,
                    "    {:<16}  {:<11}  {:>12}",
                    q.id,
                    q.status.as_str(),
                    self.money(q.total)
                );
            }
        }
        out
    }

    pub fn catalog_table(&self, items: &[CatalogItem]) -> String {
        if items.is_empty() {
            return "Catalog is empty.\n".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(out, "{:<36}  {:<28}  {:>12}  {}", "ID", "SERVICE", "PRICE", "UNIT");
        for item in items {
            let name = if item.active {
                truncate(&item.name, 28)
            } else {
                truncate(&format!("{} (inactive)", item.name), 28)
            };
            let _ = writeln!(
                out,
                "{:<36}  {:<28}  {:>12}  {}",
                item.id,
                name,
                self.money(item.unit_price),
                item.unit.as_deref().unwrap_or("-")
            );
        }
        out
    }

    pub fn catalog_item(&self, item: &CatalogItem) -> String {
        self.catalog_table(std::slice::from_ref(item))
    }

    pub fn quote_table(&self, quotes: &[Quote]) -> String {
        if quotes.is_empty() {
            return "No quotes.\n".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<16}  {:<36}  {:<11}  {:>5}  {:>12}",
            "ID", "CLIENT", "STATUS", "ITEMS", "TOTAL"
        );
        for q in quotes {
            let _ = writeln!(
                out,
                "{:<16}  {:<36}  {:<11}  {:>5}  {:>12}",
                q.id,
                q.client_id,
                q.status.as_str(),
                q.items.len(),
                self.money(q.total)
            );
        }
        out
    }

    pub fn quote_detail(&self, q: &Quote) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Quote {}  [{}]", q.id, q.status);
        let _ = writeln!(out, "  client:  {}", q.client_id);
        let _ = writeln!(out, "  created: {}", q.created_at.format("%Y-%m-%d %H:%M"));
        let _ = writeln!(out);

        for item in &q.items {
            let _ = writeln!(
                out,
                "  {:>3}  {:<30}  {:>8} x {:>10}  {:>12}",
                item.id,
                truncate(&item.description, 30),
                item.qty,
                self.money(item.unit_price),
                self.money(item.total)
            );
            if let Some(warning) = &item.warning {
                let _ = writeln!(out, "       ! {}", warning);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "  {:<24}{:>12}", "Subtotal", self.money(q.subtotal));
        let _ = writeln!(
            out,
            "  {:<24}{:>12}",
            format!("Tax ({})", percent(q.tax_rate)),
            self.money(q.tax)
        );
        if q.discount != 0.0 {
            let _ = writeln!(out, "  {:<24}{:>12}", "Discount", self.money(-q.discount));
        }
        let _ = writeln!(out, "  {:<24}{:>12}", "Total", self.money(q.total));

        if let Some(notes) = &q.notes {
            let _ = writeln!(out);
            let _ = writeln!(out, "  {}", notes);
        }
        out
    }

    pub fn settings(&self, s: &Settings) -> String {
        let mut out = String::new();
        let name = if s.business_name.is_empty() {
            "(not set)"
        } else {
            s.business_name.as_str()
        };
        let _ = writeln!(out, "business name:    {}", name);
        let _ = writeln!(out, "business email:   {}", s.business_email.as_deref().unwrap_or("-"));
        let _ = writeln!(out, "business phone:   {}", s.business_phone.as_deref().unwrap_or("-"));
        let _ = writeln!(out, "business address: {}", s.business_address.as_deref().unwrap_or("-"));
        let _ = writeln!(out, "default tax rate: {}", percent(s.default_tax_rate));
        let _ = writeln!(out, "theme:            {}", s.theme);
        let _ = writeln!(out, "next quote no.:   {}", s.next_sequence);
        out
    }

    pub fn config(&self, view: &ConfigView) -> String {
        let mut out = String::new();
        let path = |p: &Option<std::path::PathBuf>| match p {
            Some(p) => crate::state::AppConfig::display_path(p),
            None => "(default)".to_string(),
        };
        let _ = writeln!(out, "config file:      {}", path(&view.config_path));
        let _ = writeln!(out, "database:         {}", path(&view.db_path));
        let _ = writeln!(out, "currency symbol:  {}", view.currency_symbol);
        let _ = writeln!(
            out,
            "theme:            {}",
            overridden(view.theme_override.map(|t| t.to_string()), view.effective_theme.map(|t| t.to_string()))
        );
        let _ = writeln!(
            out,
            "default tax rate: {}",
            overridden(
                view.tax_rate_override.map(percent),
                view.effective_tax_rate.map(percent)
            )
        );
        out
    }

    pub fn export_report(&self, r: &ExportReport) -> String {
        format!(
            "Exported {} clients, {} services and {} quotes to {}\n",
            r.clients,
            r.catalog,
            r.quotes,
            r.path.display()
        )
    }

    pub fn import_report(&self, r: &ImportReport) -> String {
        format!(
            "Imported {} clients, {} services and {} quotes from {}\nNext quote number: {}\n",
            r.clients,
            r.catalog,
            r.quotes,
            r.path.display(),
            r.next_sequence
        )
    }
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = writeln!(out, "  {:<8} {}", format!("{}:", label), value);
    }
}

/// `0.0825` → `"8.25%"`.
fn percent(rate: f64) -> String {
    format!("{}%", round2(rate * 100.0))
}

fn overridden(local: Option<String>, effective: Option<String>) -> String {
    match (local, effective) {
        (Some(local), _) => format!("{} (local override)", local),
        (None, Some(effective)) => format!("{} (from settings)", effective),
        (None, None) => "(from settings)".to_string(),
    }
}

/// Cuts `s` to `max` chars, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
