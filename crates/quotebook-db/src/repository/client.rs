//! # Client Repository
//!
//! Database operations for clients.
//!
//! A client with quotes cannot be deleted: the `quotes.client_id` foreign key
//! rejects it and the caller gets [`DbError::ForeignKeyViolation`].

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{from_millis, to_millis};
use quotebook_core::validation::validate_client;
use quotebook_core::{Client, ClientPatch};

/// Row shape of the `clients` table.
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ClientRow> for Client {
    type Error = DbError;

    fn try_from(row: ClientRow) -> DbResult<Self> {
        Ok(Client {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            notes: row.notes,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

const SELECT_CLIENT: &str = r#"
    SELECT id, name, email, phone, address, notes, created_at, updated_at
    FROM clients
"#;

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let row: Option<ClientRow> = sqlx::query_as(&format!("{SELECT_CLIENT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Client::try_from).transpose()
    }

    /// Lists all clients by name (case-insensitive).
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let mut conn = self.pool.acquire().await?;
        list_in(&mut conn).await
    }

    /// Inserts or replaces a client.
    ///
    /// ## Errors
    /// `DbError::Validation` when the name is missing or the email is malformed.
    pub async fn put(&self, client: &Client) -> DbResult<()> {
        validate_client(client)?;
        let mut conn = self.pool.acquire().await?;
        put_in(&mut conn, client).await
    }

    /// Applies a patch to a stored client and returns the result.
    pub async fn update(&self, id: &str, patch: ClientPatch, now: DateTime<Utc>) -> DbResult<Client> {
        let mut client = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))?;

        patch.apply(&mut client, now);
        self.put(&client).await?;
        Ok(client)
    }

    /// Deletes a client.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if no such client
    /// - `DbError::ForeignKeyViolation` if quotes still reference it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting client");

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

pub(crate) async fn list_in(conn: &mut SqliteConnection) -> DbResult<Vec<Client>> {
    let rows: Vec<ClientRow> =
        sqlx::query_as(&format!("{SELECT_CLIENT} ORDER BY name COLLATE NOCASE, id"))
            .fetch_all(&mut *conn)
            .await?;

    rows.into_iter().map(Client::try_from).collect()
}

pub(crate) async fn put_in(conn: &mut SqliteConnection, client: &Client) -> DbResult<()> {
    debug!(id = %client.id, name = %client.name, "Saving client");

    sqlx::query(
        r#"
        INSERT INTO clients (id, name, email, phone, address, notes, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            email = excluded.email,
            phone = excluded.phone,
            address = excluded.address,
            notes = excluded.notes,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&client.id)
    .bind(client.name.trim())
    .bind(&client.email)
    .bind(&client.phone)
    .bind(&client.address)
    .bind(&client.notes)
    .bind(to_millis(client.created_at))
    .bind(to_millis(client.updated_at))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use chrono::Utc;
    use quotebook_core::{Client, ClientPatch};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let db = db().await;
        let mut client = Client::new("Ada Lovelace");
        client.email = Some("ada@example.com".to_string());

        db.clients().put(&client).await.unwrap();

        let loaded = db.clients().get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(loaded, client);
        assert_eq!(db.clients().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = db().await;
        assert!(db.clients().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let db = db().await;
        for name in ["zed", "Bea", "amy"] {
            db.clients().put(&Client::new(name)).await.unwrap();
        }

        let names: Vec<String> = db
            .clients()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["amy", "Bea", "zed"]);
    }

    #[tokio::test]
    async fn test_invalid_client_is_rejected() {
        let db = db().await;
        let result = db.clients().put(&Client::new("  ")).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
        assert_eq!(db.clients().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_with_patch() {
        let db = db().await;
        let client = Client::new("Grace");
        db.clients().put(&client).await.unwrap();

        let updated = db
            .clients()
            .update(&client.id, ClientPatch::default().phone("555-0100"), Utc::now())
            .await
            .unwrap();

        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert_eq!(updated.created_at, client.created_at);

        let loaded = db.clients().get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(loaded, updated);
    }

    #[tokio::test]
    async fn test_update_missing_client() {
        let db = db().await;
        let result = db
            .clients()
            .update("missing", ClientPatch::default().name("X"), Utc::now())
            .await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let client = Client::new("Temp");
        db.clients().put(&client).await.unwrap();

        db.clients().delete(&client.id).await.unwrap();
        assert!(db.clients().get_by_id(&client.id).await.unwrap().is_none());
        assert!(db.clients().delete(&client.id).await.unwrap_err().is_not_found());
    }
}
