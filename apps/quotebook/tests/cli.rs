//! Drives whole commands through `execute` against a temporary database and
//! config file.

use clap::Parser;
use quotebook_core::{ExportEnvelope, Theme};
use quotebook_db::{Database, DbConfig};
use quotebook_lib::cli::Cli;
use quotebook_lib::error::ErrorCode;
use quotebook_lib::execute;
use quotebook_lib::state::AppConfig;
use tempfile::TempDir;

fn cli(dir: &TempDir, args: &[&str]) -> Cli {
    let db = dir.path().join("quotebook.db");
    let config = dir.path().join("quotebook.toml");

    let mut argv = vec![
        "quotebook".to_string(),
        "--db".to_string(),
        db.display().to_string(),
        "--config".to_string(),
        config.display().to_string(),
    ];
    argv.extend(args.iter().map(|s| s.to_string()));

    Cli::try_parse_from(argv).unwrap()
}

async fn open(dir: &TempDir) -> Database {
    Database::new(DbConfig::new(dir.path().join("quotebook.db")))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_quote_lifecycle_and_export() {
    let dir = TempDir::new().unwrap();

    execute(cli(&dir, &["client", "add", "Ada Lovelace", "--email", "ada@example.com"]))
        .await
        .unwrap();
    execute(cli(&dir, &["catalog", "add", "Gutter cleaning", "--price", "120"]))
        .await
        .unwrap();

    let (client_id, service_id) = {
        let db = open(&dir).await;
        let client = db.clients().list().await.unwrap().remove(0);
        let service = db.catalog().list(false).await.unwrap().remove(0);
        db.close().await;
        (client.id, service.id)
    };

    let service_arg = format!("{}:2", service_id);
    execute(cli(
        &dir,
        &["quote", "new", &client_id, "--service", &service_arg, "--tax-rate", "0.08"],
    ))
    .await
    .unwrap();

    let quote_id = {
        let db = open(&dir).await;
        let quotes = db.quotes().list_ordered_by_creation().await.unwrap();
        db.close().await;
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].total, 259.2);
        quotes[0].id.clone()
    };

    execute(cli(&dir, &["quote", "status", &quote_id, "approved"]))
        .await
        .unwrap();

    let backup = dir.path().join("backup.json");
    execute(cli(&dir, &["--json", "export", backup.to_str().unwrap()]))
        .await
        .unwrap();

    let envelope = ExportEnvelope::from_json(&std::fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(envelope.clients.len(), 1);
    assert_eq!(envelope.catalog.len(), 1);
    assert_eq!(envelope.quotes[0].id, quote_id);
    assert_eq!(envelope.settings[0].next_sequence, 2);
}

#[tokio::test]
async fn test_missing_quote_is_not_found() {
    let dir = TempDir::new().unwrap();

    let err = execute(cli(&dir, &["quote", "show", "q-20250307-0001"]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_config_commands_do_not_open_database() {
    let dir = TempDir::new().unwrap();

    execute(cli(&dir, &["config", "set", "--currency-symbol", "€", "--theme", "dark"]))
        .await
        .unwrap();
    execute(cli(&dir, &["config", "show"])).await.unwrap();

    let saved = AppConfig::load(Some(dir.path().join("quotebook.toml"))).unwrap();
    assert_eq!(saved.currency_symbol, "€");
    assert_eq!(saved.theme, Some(Theme::Dark));
    assert!(!dir.path().join("quotebook.db").exists());
}

#[tokio::test]
async fn test_config_show_reads_existing_settings() {
    let dir = TempDir::new().unwrap();
    execute(cli(&dir, &["settings", "set", "--tax-rate", "0.07"]))
        .await
        .unwrap();
    execute(cli(&dir, &["--json", "config", "show"])).await.unwrap();

    let db_path = dir.path().join("quotebook.db");
    let settings = quotebook_lib::commands::config::stored_settings(Some(db_path))
        .await
        .unwrap();
    let view = quotebook_lib::commands::config::show_config(&AppConfig::default(), None, Some(&settings));
    assert_eq!(view.effective_tax_rate, Some(0.07));
    assert!(!dir.path().join("quotebook.toml").exists());
}

#[tokio::test]
async fn test_import_keeps_counter_ahead() {
    let source = TempDir::new().unwrap();
    execute(cli(&source, &["client", "add", "Grace Hopper"])).await.unwrap();
    let backup = source.path().join("backup.json");
    execute(cli(&source, &["export", backup.to_str().unwrap()]))
        .await
        .unwrap();

    let target = TempDir::new().unwrap();
    execute(cli(&target, &["client", "add", "Alan Turing"])).await.unwrap();
    let client_id = {
        let db = open(&target).await;
        let id = db.clients().list().await.unwrap().remove(0).id;
        db.close().await;
        id
    };
    for _ in 0..3 {
        execute(cli(&target, &["quote", "new", &client_id])).await.unwrap();
    }
    execute(cli(&target, &["import", backup.to_str().unwrap()]))
        .await
        .unwrap();

    let db = open(&target).await;
    assert_eq!(db.clients().count().await.unwrap(), 1);
    assert_eq!(db.quotes().count().await.unwrap(), 0);
    assert_eq!(db.settings().peek_next_sequence().await.unwrap(), 4);
    db.close().await;
}
