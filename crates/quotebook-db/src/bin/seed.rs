//! # Seed Data Generator
//!
//! Populates a development database with a service catalog, a few clients
//! and some quotes.
//!
//! ## Usage
//! ```bash
//! cargo run -p quotebook-db --bin seed
//! cargo run -p quotebook-db --bin seed -- --db ./data/quotebook.db --quotes 50
//! ```

use chrono::Utc;
use quotebook_core::{CatalogItem, Client, QuoteDraft, SettingsPatch};
use quotebook_db::{Database, DbConfig};
use std::env;

/// (name, unit price, unit)
const SERVICES: &[(&str, f64, &str)] = &[
    ("Gutter cleaning", 120.0, "visit"),
    ("Downspout flush", 25.0, "each"),
    ("Window washing", 8.5, "pane"),
    ("Pressure washing", 0.35, "sq ft"),
    ("Lawn mowing", 45.0, "visit"),
    ("Hedge trimming", 60.0, "hour"),
    ("Leaf removal", 55.0, "hour"),
    ("Roof inspection", 150.0, "visit"),
    ("Deck staining", 2.75, "sq ft"),
    ("Haul away", 35.0, "load"),
];

const CLIENTS: &[(&str, &str)] = &[
    ("Ada Lovelace", "ada@example.com"),
    ("Grace Hopper", "grace@example.com"),
    ("Alan Turing", "alan@example.com"),
    ("Katherine Johnson", "katherine@example.com"),
    ("Edsger Dijkstra", "edsger@example.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut quote_count: usize = 20;
    let mut db_path = String::from("./quotebook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--quotes" | "-q" => {
                if i + 1 < args.len() {
                    quote_count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Quotebook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -q, --quotes <N>   Number of quotes to generate (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./quotebook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Quotebook Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    if db.catalog().count().await? > 0 {
        println!("⚠ Database already has a catalog, skipping seed.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    db.settings()
        .update(
            SettingsPatch::default()
                .business_name("Shipshape Home Services")
                .business_email("office@shipshape.example")
                .default_tax_rate(0.0825),
        )
        .await?;

    let mut catalog = Vec::with_capacity(SERVICES.len());
    for (name, price, unit) in SERVICES {
        let mut item = CatalogItem::new(*name, *price);
        item.unit = Some(unit.to_string());
        db.catalog().put(&item).await?;
        catalog.push(item);
    }
    println!("✓ {} catalog services", catalog.len());

    let mut clients = Vec::with_capacity(CLIENTS.len());
    for (name, email) in CLIENTS {
        let mut client = Client::new(*name);
        client.email = Some(email.to_string());
        db.clients().put(&client).await?;
        clients.push(client);
    }
    println!("✓ {} clients", clients.len());

    for n in 0..quote_count {
        let client = &clients[n % clients.len()];
        let mut draft = QuoteDraft::new(client.id.clone(), 0.0825);

        // 1-3 services per quote, deterministic so reruns look the same
        for k in 0..(n % 3 + 1) {
            let service = &catalog[(n * 7 + k * 3) % catalog.len()];
            let qty = ((n + k) % 4 + 1) as f64;
            draft.add_catalog_item(service, qty);
        }
        if n % 5 == 0 {
            draft.discount = 10.0;
        }

        let quote = db.quotes().create(draft, Utc::now()).await?;
        if n < 3 {
            println!("  {} for {}: {:.2}", quote.id, client.name, quote.total);
        }
    }
    println!("✓ {} quotes", quote_count);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
