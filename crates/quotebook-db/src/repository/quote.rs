//! # Quote Repository
//!
//! Database operations for quotes and their line items.
//!
//! ## Quote Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quote Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create(draft) ─┬─ allocate ID   ┐                              │
//! │                        └─ insert rows   ┘ one transaction              │
//! │                                                                         │
//! │  2. EDIT                                                               │
//! │     └── update(id, QuotePatch) → reprice → rewrite rows                │
//! │                                                                         │
//! │  3. PROGRESS                                                           │
//! │     └── set_status(id, approved | scheduled | in_progress | ...)       │
//! │                                                                         │
//! │  4. (OPTIONAL) DELETE                                                  │
//! │     └── delete(id) → items go with it (ON DELETE CASCADE)              │
//! │                                                                         │
//! │  Every write path reprices before storing: stored totals always        │
//! │  match the stored items.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{from_millis, settings, to_millis};
use quotebook_core::pricing::reprice;
use quotebook_core::sequence::{local_date, parse_quote_id};
use quotebook_core::validation::{validate_draft, validate_quote};
use quotebook_core::{LineItem, Money, Quote, QuoteDraft, QuotePatch, QuoteStatus};

#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: String,
    client_id: String,
    status: QuoteStatus,
    tax_rate: f64,
    discount: f64,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct QuoteItemRow {
    quote_id: String,
    id: String,
    description: String,
    qty: f64,
    unit_price: f64,
    total_cents: i64,
    warning: Option<String>,
}

impl From<QuoteItemRow> for LineItem {
    fn from(row: QuoteItemRow) -> Self {
        LineItem {
            id: row.id,
            description: row.description,
            qty: row.qty,
            unit_price: row.unit_price,
            total: Money::from_cents(row.total_cents).amount(),
            warning: row.warning,
        }
    }
}

impl QuoteRow {
    fn into_quote(self, items: Vec<LineItem>) -> DbResult<Quote> {
        Ok(Quote {
            id: self.id,
            client_id: self.client_id,
            status: self.status,
            items,
            tax_rate: self.tax_rate,
            discount: self.discount,
            subtotal: Money::from_cents(self.subtotal_cents).amount(),
            tax: Money::from_cents(self.tax_cents).amount(),
            total: Money::from_cents(self.total_cents).amount(),
            notes: self.notes,
            created_at: from_millis(self.created_at)?,
            updated_at: from_millis(self.updated_at)?,
        })
    }
}

const SELECT_QUOTE: &str = r#"
    SELECT id, client_id, status, tax_rate, discount,
           subtotal_cents, tax_cents, total_cents, notes, created_at, updated_at
    FROM quotes
"#;

const SELECT_ITEMS: &str = r#"
    SELECT quote_id, id, description, qty, unit_price, total_cents, warning
    FROM quote_items
"#;

/// Repository for quote database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
}

impl QuoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        QuoteRepository { pool }
    }

    /// Gets a quote with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Quote>> {
        let mut conn = self.pool.acquire().await?;
        get_in(&mut conn, id).await
    }

    /// All quotes, oldest first (ties broken by ID).
    pub async fn list_ordered_by_creation(&self) -> DbResult<Vec<Quote>> {
        let mut conn = self.pool.acquire().await?;
        list_in(&mut conn).await
    }

    /// Quotes for one client, oldest first.
    pub async fn list_for_client(&self, client_id: &str) -> DbResult<Vec<Quote>> {
        let quotes = self.list_ordered_by_creation().await?;
        Ok(quotes
            .into_iter()
            .filter(|q| q.client_id == client_id)
            .collect())
    }

    /// Creates a quote from a draft, minting its ID.
    ///
    /// ## What This Does
    /// 1. Validates the draft
    /// 2. Begins a transaction
    /// 3. Takes the next sequence number from settings
    /// 4. Prices the quote and inserts it with its items
    /// 5. Commits
    ///
    /// If step 4 fails (unknown client, constraint violation) nothing is
    /// committed: the sequence number is not consumed.
    pub async fn create(&self, draft: QuoteDraft, now: DateTime<Utc>) -> DbResult<Quote> {
        validate_draft(&draft)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let id = settings::allocate_in(&mut tx, local_date(now)).await?;
        let quote = draft.into_quote(id, now);
        insert_in(&mut tx, &quote).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %quote.id, client_id = %quote.client_id, total = quote.total, "Created quote");
        Ok(quote)
    }

    /// Inserts or replaces a quote and all its items.
    ///
    /// The quote is repriced first; the stored totals are the recomputed ones.
    /// When the ID is a quote number, the counter is raised past it in the
    /// same transaction so [`create`](Self::create) never allocates it again.
    pub async fn put(&self, quote: &Quote) -> DbResult<Quote> {
        let mut quote = quote.clone();
        validate_quote(&quote)?;
        reprice(&mut quote);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        put_in(&mut tx, &quote).await?;
        if let Ok(parsed) = parse_quote_id(&quote.id) {
            settings::raise_sequence_in(&mut tx, parsed.sequence.saturating_add(1)).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(quote)
    }

    /// Applies a patch to a stored quote, reprices it and saves it.
    pub async fn update(&self, id: &str, patch: QuotePatch, now: DateTime<Utc>) -> DbResult<Quote> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut quote = get_in(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Quote", id))?;

        patch.apply(&mut quote, now);
        validate_quote(&quote)?;
        put_in(&mut tx, &quote).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(quote)
    }

    /// Moves a quote to another status.
    pub async fn set_status(&self, id: &str, status: QuoteStatus, now: DateTime<Utc>) -> DbResult<Quote> {
        debug!(id = %id, status = %status, "Changing quote status");
        self.update(id, QuotePatch::default().status(status), now).await
    }

    /// Deletes a quote and its items. The sequence number is not reused.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting quote");

        let result = sqlx::query("DELETE FROM quotes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

pub(crate) async fn get_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Quote>> {
    let row: Option<QuoteRow> = sqlx::query_as(&format!("{SELECT_QUOTE} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items: Vec<QuoteItemRow> =
        sqlx::query_as(&format!("{SELECT_ITEMS} WHERE quote_id = ?1 ORDER BY position"))
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;

    row.into_quote(items.into_iter().map(LineItem::from).collect())
        .map(Some)
}

pub(crate) async fn list_in(conn: &mut SqliteConnection) -> DbResult<Vec<Quote>> {
    let rows: Vec<QuoteRow> = sqlx::query_as(&format!("{SELECT_QUOTE} ORDER BY created_at, id"))
        .fetch_all(&mut *conn)
        .await?;

    let item_rows: Vec<QuoteItemRow> =
        sqlx::query_as(&format!("{SELECT_ITEMS} ORDER BY quote_id, position"))
            .fetch_all(&mut *conn)
            .await?;

    let mut items_by_quote: HashMap<String, Vec<LineItem>> = HashMap::new();
    for row in item_rows {
        items_by_quote
            .entry(row.quote_id.clone())
            .or_default()
            .push(LineItem::from(row));
    }

    rows.into_iter()
        .map(|row| {
            let items = items_by_quote.remove(&row.id).unwrap_or_default();
            row.into_quote(items)
        })
        .collect()
}

/// Inserts a new quote. Fails with `UniqueViolation` if the ID is taken.
pub(crate) async fn insert_in(conn: &mut SqliteConnection, quote: &Quote) -> DbResult<()> {
    debug!(id = %quote.id, items = quote.items.len(), "Inserting quote");

    sqlx::query(
        r#"
        INSERT INTO quotes (
            id, client_id, status, tax_rate, discount,
            subtotal_cents, tax_cents, total_cents, notes, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&quote.id)
    .bind(&quote.client_id)
    .bind(quote.status)
    .bind(quote.tax_rate)
    .bind(quote.discount)
    .bind(Money::from_amount(quote.subtotal).cents())
    .bind(Money::from_amount(quote.tax).cents())
    .bind(Money::from_amount(quote.total).cents())
    .bind(&quote.notes)
    .bind(to_millis(quote.created_at))
    .bind(to_millis(quote.updated_at))
    .execute(&mut *conn)
    .await?;

    insert_items_in(conn, quote).await
}

/// Inserts or replaces a quote; its item rows are rewritten.
pub(crate) async fn put_in(conn: &mut SqliteConnection, quote: &Quote) -> DbResult<()> {
    debug!(id = %quote.id, status = %quote.status, "Saving quote");

    sqlx::query(
        r#"
        INSERT INTO quotes (
            id, client_id, status, tax_rate, discount,
            subtotal_cents, tax_cents, total_cents, notes, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(id) DO UPDATE SET
            client_id = excluded.client_id,
            status = excluded.status,
            tax_rate = excluded.tax_rate,
            discount = excluded.discount,
            subtotal_cents = excluded.subtotal_cents,
            tax_cents = excluded.tax_cents,
            total_cents = excluded.total_cents,
            notes = excluded.notes,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&quote.id)
    .bind(&quote.client_id)
    .bind(quote.status)
    .bind(quote.tax_rate)
    .bind(quote.discount)
    .bind(Money::from_amount(quote.subtotal).cents())
    .bind(Money::from_amount(quote.tax).cents())
    .bind(Money::from_amount(quote.total).cents())
    .bind(&quote.notes)
    .bind(to_millis(quote.created_at))
    .bind(to_millis(quote.updated_at))
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM quote_items WHERE quote_id = ?1")
        .bind(&quote.id)
        .execute(&mut *conn)
        .await?;

    insert_items_in(conn, quote).await
}

async fn insert_items_in(conn: &mut SqliteConnection, quote: &Quote) -> DbResult<()> {
    for (position, item) in quote.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO quote_items (
                quote_id, id, position, description, qty, unit_price, total_cents, warning
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&quote.id)
        .bind(&item.id)
        .bind(position as i64)
        .bind(&item.description)
        .bind(item.qty)
        .bind(item.unit_price)
        .bind(Money::from_amount(item.total).cents())
        .bind(&item.warning)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
