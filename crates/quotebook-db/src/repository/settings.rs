//! # Settings Repository
//!
//! The single settings record and the quote ID counter it carries.
//!
//! ## Quote ID Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  allocate_in(&mut tx, date)                             │
//! │                                                                         │
//! │  1. INSERT INTO settings (id) VALUES ('default')                       │
//! │     ON CONFLICT(id) DO NOTHING          ← first run: next_sequence = 1 │
//! │                                                                         │
//! │  2. UPDATE settings                                                    │
//! │        SET next_sequence = next_sequence + 1                           │
//! │      WHERE id = 'default'                                              │
//! │     RETURNING next_sequence - 1         ← the value we own             │
//! │                                                                         │
//! │  3. format_quote_id(date, seq)  →  "q-20250307-0042"                    │
//! │                                                                         │
//! │  Read and increment are ONE statement, so two writers can never get    │
//! │  the same number. The caller's transaction decides whether the bump    │
//! │  sticks: if the quote insert fails, the rollback un-does it too.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The counter is global: it is not reset at midnight.

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::to_millis;
use quotebook_core::sequence::format_quote_id;
use quotebook_core::validation::validate_settings;
use quotebook_core::{Settings, SettingsPatch, Theme, SETTINGS_ID};

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    id: String,
    business_name: String,
    business_email: Option<String>,
    business_phone: Option<String>,
    business_address: Option<String>,
    default_tax_rate: f64,
    theme: Theme,
    next_sequence: i64,
}

impl From<SettingsRow> for Settings {
    fn from(row: SettingsRow) -> Self {
        Settings {
            id: row.id,
            business_name: row.business_name,
            business_email: row.business_email,
            business_phone: row.business_phone,
            business_address: row.business_address,
            default_tax_rate: row.default_tax_rate,
            theme: row.theme,
            next_sequence: row.next_sequence,
        }
    }
}

/// Repository for the settings record.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Reads the settings record, `None` on a fresh database.
    pub async fn get(&self) -> DbResult<Option<Settings>> {
        let mut conn = self.pool.acquire().await?;
        get_in(&mut conn).await
    }

    /// Reads the settings record, creating the default one if missing.
    pub async fn get_or_init(&self) -> DbResult<Settings> {
        let mut conn = self.pool.acquire().await?;
        ensure_in(&mut conn).await?;
        load_in(&mut conn).await
    }

    /// Writes the settings record.
    ///
    /// `next_sequence` is merged as `MAX(stored, given)`: a stale copy of the
    /// settings can never move the counter backwards.
    pub async fn put(&self, settings: &Settings) -> DbResult<()> {
        validate_settings(settings)?;
        let mut conn = self.pool.acquire().await?;
        put_in(&mut conn, settings).await
    }

    /// Applies a patch to the stored settings (creating them if needed).
    pub async fn update(&self, patch: SettingsPatch) -> DbResult<Settings> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        ensure_in(&mut tx).await?;
        let mut settings = load_in(&mut tx).await?;
        patch.apply(&mut settings);
        validate_settings(&settings)?;
        put_in(&mut tx, &settings).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(settings)
    }

    /// Restores the business profile and preferences to their defaults.
    ///
    /// The quote counter is kept: resetting it would hand out IDs again.
    pub async fn reset(&self) -> DbResult<Settings> {
        info!("Resetting settings to defaults");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        ensure_in(&mut tx).await?;
        let current = load_in(&mut tx).await?;
        let settings = Settings {
            next_sequence: current.next_sequence,
            ..Settings::default()
        };
        put_in(&mut tx, &settings).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(settings)
    }

    /// Mints a quote ID on its own, committing the counter bump.
    ///
    /// Quote creation does not call this: it runs [`allocate_in`] inside the
    /// insert transaction instead.
    pub async fn allocate_quote_id(&self, date: NaiveDate) -> DbResult<String> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let id = allocate_in(&mut tx, date).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(id)
    }

    /// The sequence number the next quote will get, without consuming it.
    pub async fn peek_next_sequence(&self) -> DbResult<i64> {
        Ok(self.get().await?.map(|s| s.next_sequence).unwrap_or(1))
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

/// Creates the default settings row if it doesn't exist yet.
pub(crate) async fn ensure_in(conn: &mut SqliteConnection) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO settings (id, next_sequence, updated_at)
        VALUES (?1, 1, ?2)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(SETTINGS_ID)
    .bind(to_millis(Utc::now()))
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() > 0 {
        info!("Initialized settings record");
    }

    Ok(())
}

pub(crate) async fn get_in(conn: &mut SqliteConnection) -> DbResult<Option<Settings>> {
    let row: Option<SettingsRow> = sqlx::query_as(
        r#"
        SELECT id, business_name, business_email, business_phone, business_address,
               default_tax_rate, theme, next_sequence
        FROM settings
        WHERE id = ?1
        "#,
    )
    .bind(SETTINGS_ID)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Settings::from))
}

async fn load_in(conn: &mut SqliteConnection) -> DbResult<Settings> {
    get_in(conn)
        .await?
        .ok_or_else(|| DbError::not_found("Settings", SETTINGS_ID))
}

pub(crate) async fn put_in(conn: &mut SqliteConnection, settings: &Settings) -> DbResult<()> {
    debug!(
        business_name = %settings.business_name,
        theme = %settings.theme,
        next_sequence = settings.next_sequence,
        "Saving settings"
    );

    sqlx::query(
        r#"
        INSERT INTO settings (
            id, business_name, business_email, business_phone, business_address,
            default_tax_rate, theme, next_sequence, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(id) DO UPDATE SET
            business_name = excluded.business_name,
            business_email = excluded.business_email,
            business_phone = excluded.business_phone,
            business_address = excluded.business_address,
            default_tax_rate = excluded.default_tax_rate,
            theme = excluded.theme,
            next_sequence = MAX(settings.next_sequence, excluded.next_sequence),
            updated_at = excluded.updated_at
        "#,
    )
    .bind(SETTINGS_ID)
    .bind(&settings.business_name)
    .bind(&settings.business_email)
    .bind(&settings.business_phone)
    .bind(&settings.business_address)
    .bind(settings.default_tax_rate)
    .bind(settings.theme)
    .bind(settings.next_sequence.max(1))
    .bind(to_millis(Utc::now()))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Raises the counter to at least `min`. Never lowers it.
pub(crate) async fn raise_sequence_in(conn: &mut SqliteConnection, min: i64) -> DbResult<i64> {
    ensure_in(conn).await?;

    let next: i64 = sqlx::query_scalar(
        r#"
        UPDATE settings
        SET next_sequence = MAX(next_sequence, ?2)
        WHERE id = ?1
        RETURNING next_sequence
        "#,
    )
    .bind(SETTINGS_ID)
    .bind(min)
    .fetch_one(&mut *conn)
    .await?;

    Ok(next)
}

/// Takes the next sequence number and formats it as a quote ID.
///
/// Must run inside the transaction that also stores the quote.
pub(crate) async fn allocate_in(conn: &mut SqliteConnection, date: NaiveDate) -> DbResult<String> {
    ensure_in(conn).await?;

    let sequence: i64 = sqlx::query_scalar(
        r#"
        UPDATE settings
        SET next_sequence = next_sequence + 1,
            updated_at = ?2
        WHERE id = ?1
        RETURNING next_sequence - 1
        "#,
    )
    .bind(SETTINGS_ID)
    .bind(to_millis(Utc::now()))
    .fetch_one(&mut *conn)
    .await?;

    let id = format_quote_id(date, sequence);
    debug!(id = %id, sequence, "Allocated quote ID");
    Ok(id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use chrono::NaiveDate;
    use quotebook_core::sequence::parse_quote_id;
    use quotebook_core::{Settings, SettingsPatch, Theme};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn march_7() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[tokio::test]
    async fn test_fresh_database_has_no_settings() {
        let db = db().await;
        assert!(db.settings().get().await.unwrap().is_none());
        assert_eq!(db.settings().peek_next_sequence().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_or_init_creates_defaults() {
        let db = db().await;
        let settings = db.settings().get_or_init().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert!(db.settings().get().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_first_allocation_is_one() {
        let db = db().await;
        let id = db.settings().allocate_quote_id(march_7()).await.unwrap();
        assert_eq!(id, "q-20250307-0001");
        assert_eq!(db.settings().peek_next_sequence().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_allocations_strictly_increase() {
        let db = db().await;
        let mut last = 0;
        for _ in 0..5 {
            let id = db.settings().allocate_quote_id(march_7()).await.unwrap();
            let seq = parse_quote_id(&id).unwrap().sequence;
            assert!(seq > last);
            last = seq;
        }
        assert_eq!(last, 5);
    }

    #[tokio::test]
    async fn test_counter_is_not_reset_per_day() {
        let db = db().await;
        db.settings().allocate_quote_id(march_7()).await.unwrap();
        let next_day = march_7().succ_opt().unwrap();
        let id = db.settings().allocate_quote_id(next_day).await.unwrap();
        assert_eq!(id, "q-20250308-0002");
    }

    #[tokio::test]
    async fn test_put_never_lowers_counter() {
        let db = db().await;
        for _ in 0..3 {
            db.settings().allocate_quote_id(march_7()).await.unwrap();
        }

        let stale = Settings {
            business_name: "Shipshape".to_string(),
            next_sequence: 1,
            ..Default::default()
        };
        db.settings().put(&stale).await.unwrap();

        let stored = db.settings().get().await.unwrap().unwrap();
        assert_eq!(stored.business_name, "Shipshape");
        assert_eq!(stored.next_sequence, 4);
    }

    #[tokio::test]
    async fn test_put_can_raise_counter() {
        let db = db().await;
        let settings = Settings {
            next_sequence: 100,
            ..Default::default()
        };
        db.settings().put(&settings).await.unwrap();

        let id = db.settings().allocate_quote_id(march_7()).await.unwrap();
        assert_eq!(id, "q-20250307-0100");
    }

    #[tokio::test]
    async fn test_update_with_patch() {
        let db = db().await;
        let updated = db
            .settings()
            .update(SettingsPatch::default().theme(Theme::Dark).default_tax_rate(0.07))
            .await
            .unwrap();

        assert_eq!(updated.theme, Theme::Dark);
        assert_eq!(db.settings().get().await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_invalid_patch_is_not_saved() {
        let db = db().await;
        let result = db
            .settings()
            .update(SettingsPatch::default().default_tax_rate(7.0))
            .await;
        assert!(matches!(result, Err(DbError::Validation(_))));
        // rolled back, including the row the update would have created
        assert!(db.settings().get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_keeps_counter() {
        let db = db().await;
        db.settings()
            .update(SettingsPatch::default().business_name("Acme").theme(Theme::Light))
            .await
            .unwrap();
        db.settings().allocate_quote_id(march_7()).await.unwrap();

        let reset = db.settings().reset().await.unwrap();
        assert_eq!(reset.business_name, "");
        assert_eq!(reset.theme, Theme::System);
        assert_eq!(reset.next_sequence, 2);
    }
}
